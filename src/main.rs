mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use docker_doctor::config::{Config, DEFAULT_CONFIG_FILE};
use docker_doctor::logging::{init_logging, LogConfig};
use docker_doctor::{output, scan};
use std::path::Path;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    init_logging(LogConfig::new().level(level).format(cli.log_format));

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(scan::EXIT_ERROR);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Scan { format, output_dir, schema, exit_code, api_version } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(v) = api_version {
                config.scan.version = v;
            }

            let doc = scan::run_scan(&config, schema).context("scan failed")?;
            if let Some(dir) = output_dir {
                let path = scan::save(&doc, &dir)
                    .with_context(|| format!("failed to save report under {}", dir.display()))?;
                eprintln!("Report saved to {}", path.display());
            }
            output::display(&doc, format)?;

            Ok(if exit_code { scan::exit_code(doc.severities()) } else { scan::EXIT_OK })
        }
        Commands::Report { input, format } => {
            let doc = scan::load(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            output::display(&doc, format)?;
            Ok(scan::EXIT_OK)
        }
    }
}

/// Explicit file, else `doctor.yml` when present, else defaults. Environment
/// overrides apply last and the result is validated.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(p) => Config::load(p).with_context(|| format!("invalid config {}", p.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::load(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("invalid config {}", DEFAULT_CONFIG_FILE))?,
        None => Config::default(),
    };
    let config = config.merge_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}
