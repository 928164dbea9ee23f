use clap::{Parser, Subcommand};
use docker_doctor::logging::LogFormat;
use docker_doctor::output::OutputFormat;
use docker_doctor::scan::SchemaKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docker-doctor")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Docker host diagnostics: disk, storage, restarts, health and daemon checks", long_about = None)]
pub struct Cli {
    /// Config file (default: ./doctor.yml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan this Docker host and print a report
    Scan {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also save <dir>/<scanId>/scan.json
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Report schema
        #[arg(long, value_enum, default_value_t = SchemaKind::V1)]
        schema: SchemaKind,

        /// Exit 2 on critical findings, 1 on warnings
        #[arg(long)]
        exit_code: bool,

        /// Docker API version (overrides config and DOCKER_API_VERSION)
        #[arg(long)]
        api_version: Option<String>,
    },

    /// Re-render a saved scan.json
    #[command(arg_required_else_help = true)]
    Report {
        /// Saved report, either schema
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
