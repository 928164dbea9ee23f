//! Diagnostic rule engine.
//!
//! Every rule is a plain function `(snapshot, config) -> Vec<Issue>`
//! registered in [`RULES`]. Rules never see each other's output; after all
//! of them have run the combined list is put into one total order
//! (severity rank, rule id, subject) so repeated scans diff cleanly.

pub mod containers;
pub mod daemon;
pub mod disk;
pub mod network;
pub mod offenders;
pub mod storage;
pub mod subject;
pub mod volumes;

use crate::config::RuleConfig;
use crate::facts::FactSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

pub use network::cidrs_overlap;
pub use offenders::{top_offenders, Offender};

/// Stable rule identifiers. These are part of the fingerprint contract.
pub mod ids {
    pub const DISK_USAGE_HIGH: &str = "DISK_USAGE_HIGH";
    pub const DOCKER_STORAGE_BLOAT: &str = "DOCKER_STORAGE_BLOAT";
    pub const RESTART_LOOP: &str = "RESTART_LOOP";
    pub const OOM_KILLED: &str = "OOM_KILLED";
    pub const HEALTHCHECK_UNHEALTHY: &str = "HEALTHCHECK_UNHEALTHY";
    pub const LOG_BLOAT: &str = "LOG_BLOAT";
    pub const VOLUME_BLOAT: &str = "VOLUME_BLOAT";
    pub const VOLUME_SIZE_HIGH: &str = "VOLUME_SIZE_HIGH";
    pub const NETWORK_OVERLAP: &str = "NETWORK_OVERLAP";
    pub const DAEMON_RISKY_SETTINGS: &str = "DAEMON_RISKY_SETTINGS";
}

// ── Severity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Sort rank, 0 is most severe.
    pub fn rank(&self) -> u8 {
        severity_rank(self.as_str())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank shared by the internal (`high/medium/low`) and exported
/// (`critical/warning/info`) vocabularies. Anything else ranks last.
pub fn severity_rank(label: &str) -> u8 {
    match label.trim().to_ascii_lowercase().as_str() {
        "high" | "critical" => 0,
        "medium" | "warning" => 1,
        "low" | "info" => 2,
        _ => 3,
    }
}

// ── Issue ───────────────────────────────────────────────────────────────────

/// One diagnostic produced by one rule. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    /// Scope key: `path=<path>`, `container=<id>` or empty for aggregates.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    pub severity: Severity,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub facts: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub solutions: Vec<String>,
}

impl Issue {
    pub fn new(
        rule_id: &str,
        subject: impl Into<String>,
        severity: Severity,
        category: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            subject: subject.into(),
            severity,
            category: category.to_string(),
            description: description.into(),
            facts: BTreeMap::new(),
            solutions: Vec::new(),
        }
    }

    pub fn fact(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.facts.insert(key.to_string(), value.into());
        self
    }

    pub fn solutions<I, S>(mut self, solutions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solutions.extend(solutions.into_iter().map(Into::into));
        self
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

pub type CheckFn = fn(&FactSnapshot, &RuleConfig) -> Vec<Issue>;

#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: CheckFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// Registration order. New checks are appended here.
pub const RULES: &[Rule] = &[
    Rule { id: ids::DISK_USAGE_HIGH, check: disk::check_disk_usage },
    Rule { id: ids::DOCKER_STORAGE_BLOAT, check: storage::check_storage_bloat },
    Rule { id: ids::RESTART_LOOP, check: containers::check_restart_loop },
    Rule { id: ids::OOM_KILLED, check: containers::check_oom_killed },
    Rule { id: ids::HEALTHCHECK_UNHEALTHY, check: containers::check_healthcheck },
    Rule { id: ids::LOG_BLOAT, check: containers::check_log_bloat },
    Rule { id: ids::VOLUME_BLOAT, check: volumes::check_volume_bloat },
    Rule { id: ids::VOLUME_SIZE_HIGH, check: volumes::check_volume_size },
    Rule { id: ids::NETWORK_OVERLAP, check: network::check_network_overlap },
    Rule { id: ids::DAEMON_RISKY_SETTINGS, check: daemon::check_daemon_risky },
];

/// Run every registered rule and return the issues in their total order.
pub fn evaluate(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    evaluate_rules(RULES, snapshot, config)
}

pub fn evaluate_rules(rules: &[Rule], snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    let mut issues = Vec::new();
    for rule in rules {
        let produced = (rule.check)(snapshot, config);
        debug!(rule = rule.id, issues = produced.len(), "rule evaluated");
        issues.extend(produced);
    }
    sort_issues(&mut issues);
    issues
}

pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(compare_issues);
}

/// Severity rank, then rule id, then subject.
pub fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| a.rule_id.cmp(&b.rule_id))
        .then_with(|| a.subject.cmp(&b.subject))
}
