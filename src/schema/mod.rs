//! Exported report formats.
//!
//! Everything in here is a pure transformation of already-evaluated issues;
//! reading and writing files is left to the caller.

pub mod build;
pub mod finding;
pub mod legacy;
pub mod normalize;
pub mod v1;

use crate::utils::{DoctorError, Result};
use serde_json::Value;

pub use build::ReportBuilder;
pub use finding::{finding_from_issue, fingerprint, Fingerprint};
pub use legacy::LegacyReport;

pub const SCHEMA_VERSION: &str = "1.0";

/// `schemaVersion` of a parsed document, `None` for the legacy format.
pub fn detect_schema_version(doc: &Value) -> Option<&str> {
    doc.get("schemaVersion").and_then(Value::as_str)
}

/// A saved report of either generation.
#[derive(Debug, Clone)]
pub enum ReportDocument {
    V1(Box<v1::Report>),
    Legacy(Box<LegacyReport>),
}

impl ReportDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content)
            .map_err(|e| DoctorError::Parse(format!("report is not valid JSON: {}", e)))?;

        match detect_schema_version(&doc).map(str::to_owned) {
            Some(v) if v.starts_with("1.") => serde_json::from_value(doc)
                .map(|r| ReportDocument::V1(Box::new(r)))
                .map_err(|e| DoctorError::Parse(format!("invalid v{} report: {}", v, e))),
            Some(v) => Err(DoctorError::Parse(format!("unsupported schemaVersion {:?}", v))),
            None => serde_json::from_value(doc)
                .map(|r| ReportDocument::Legacy(Box::new(r)))
                .map_err(|e| DoctorError::Parse(format!("invalid legacy report: {}", e))),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let out = match self {
            ReportDocument::V1(r) => serde_json::to_string_pretty(r),
            ReportDocument::Legacy(r) => serde_json::to_string_pretty(r),
        };
        out.map_err(|e| DoctorError::Parse(e.to_string()))
    }

    /// Exported severities of every finding, for the exit-code policy.
    pub fn severities(&self) -> Vec<v1::FindingSeverity> {
        match self {
            ReportDocument::V1(r) => r.findings.iter().map(|f| f.severity).collect(),
            ReportDocument::Legacy(r) => r.severities().collect(),
        }
    }

    pub fn scan_id(&self) -> String {
        match self {
            ReportDocument::V1(r) => r.scan.scan_id.clone(),
            ReportDocument::Legacy(r) => r.timestamp.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}
