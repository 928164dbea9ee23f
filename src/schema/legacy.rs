//! Pre-versioned envelope: the raw snapshot plus its issues. Has no
//! `schemaVersion` field, which is how readers tell it apart from v1.

use super::normalize::export_severity;
use super::v1::FindingSeverity;
use crate::facts::FactSnapshot;
use crate::rules::Issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyReport {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: FactSnapshot,
    pub issues: Vec<Issue>,
}

impl LegacyReport {
    pub fn new(snapshot: FactSnapshot, issues: Vec<Issue>) -> Self {
        Self { timestamp: snapshot.collected_at, snapshot, issues }
    }

    pub fn severities(&self) -> impl Iterator<Item = FindingSeverity> + '_ {
        self.issues.iter().map(|i| export_severity(i.severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;

    #[test]
    fn test_legacy_has_no_schema_version() {
        let snapshot = FactSnapshot::empty(Utc::now());
        let report = LegacyReport::new(
            snapshot,
            vec![Issue::new("OOM_KILLED", "container=a", Severity::High, "oom", "d")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("schemaVersion").is_none());
        assert!(json.get("containers").is_some());
        assert_eq!(json["issues"][0]["ruleId"], "OOM_KILLED");

        let back: LegacyReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.issues, report.issues);
        assert_eq!(back.severities().collect::<Vec<_>>(), vec![FindingSeverity::Critical]);
    }
}
