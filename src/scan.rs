//! One scan end to end: collect, evaluate, build the chosen envelope.

use crate::collect::{self, Collection};
use crate::config::Config;
use crate::rules::{self, Issue};
use crate::schema::v1::{Collector, FindingSeverity};
use crate::schema::{LegacyReport, ReportBuilder, ReportDocument};
use crate::utils::{DoctorError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const EXIT_OK: i32 = 0;
pub const EXIT_WARNING: i32 = 1;
pub const EXIT_CRITICAL: i32 = 2;
pub const EXIT_ERROR: i32 = 3;

pub const SCAN_FILE: &str = "scan.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaKind {
    /// Versioned envelope with normalized findings
    #[default]
    V1,
    /// Raw snapshot plus issues
    Legacy,
}

pub fn run_scan(config: &Config, schema: SchemaKind) -> Result<ReportDocument> {
    let started_at = Utc::now();
    info!(mode = %config.scan.mode, timeout = config.scan.timeout, "scan started");

    let collection = collect::collect(&config.scan)?;
    let issues = rules::evaluate(&collection.snapshot, &config.rules);
    let finished_at = Utc::now();

    info!(issues = issues.len(), effective_mode = %collection.effective_mode, "scan finished");
    Ok(build_document(collection, issues, config, schema, started_at, finished_at))
}

/// Wrap an evaluated collection in the requested envelope.
pub fn build_document(
    collection: Collection,
    issues: Vec<Issue>,
    config: &Config,
    schema: SchemaKind,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> ReportDocument {
    match schema {
        SchemaKind::Legacy => {
            ReportDocument::Legacy(Box::new(LegacyReport::new(collection.snapshot, issues)))
        }
        SchemaKind::V1 => {
            let collectors = collection.runs.iter().map(Collector::from).collect();
            let report = ReportBuilder::new(&collection.snapshot, &issues, started_at, finished_at)
                .mode(config.scan.mode, collection.effective_mode)
                .timeout_seconds(config.scan.timeout)
                .api_version(config.scan.version.clone())
                .capabilities(collection.capabilities)
                .collectors(collectors)
                .build();
            ReportDocument::V1(Box::new(report))
        }
    }
}

/// Write `<dir>/<scanId>/scan.json` and return its path.
pub fn save(doc: &ReportDocument, dir: &Path) -> Result<PathBuf> {
    let scan_dir = dir.join(doc.scan_id());
    fs::create_dir_all(&scan_dir)?;
    let path = scan_dir.join(SCAN_FILE);
    fs::write(&path, doc.to_json_pretty()?)?;
    info!(path = %path.display(), "report saved");
    Ok(path)
}

pub fn load(path: &Path) -> Result<ReportDocument> {
    let content = fs::read_to_string(path).map_err(|e| {
        DoctorError::System(format!("failed to read report {}: {}", path.display(), e))
    })?;
    ReportDocument::from_json(&content)
}

/// Worst severity decides: critical → 2, warning → 1, otherwise 0.
pub fn exit_code(severities: impl IntoIterator<Item = FindingSeverity>) -> i32 {
    severities
        .into_iter()
        .map(|s| match s {
            FindingSeverity::Critical => EXIT_CRITICAL,
            FindingSeverity::Warning => EXIT_WARNING,
            FindingSeverity::Info => EXIT_OK,
        })
        .max()
        .unwrap_or(EXIT_OK)
}
