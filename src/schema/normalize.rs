//! Fixed lookup tables from internal rule vocabulary to the exported one.
//! Nothing here is derived from data.

use super::v1::{Confidence, FindingSeverity};
use crate::rules::{ids, Severity};

pub fn export_severity(severity: Severity) -> FindingSeverity {
    match severity {
        Severity::High => FindingSeverity::Critical,
        Severity::Medium => FindingSeverity::Warning,
        Severity::Low => FindingSeverity::Info,
    }
}

/// Rules that read the host filesystem are trusted more than API-only ones.
pub fn confidence_for(rule_id: &str) -> Confidence {
    match rule_id {
        ids::DISK_USAGE_HIGH | ids::VOLUME_SIZE_HIGH | ids::LOG_BLOAT => Confidence::High,
        ids::DOCKER_STORAGE_BLOAT
        | ids::RESTART_LOOP
        | ids::OOM_KILLED
        | ids::HEALTHCHECK_UNHEALTHY
        | ids::VOLUME_BLOAT
        | ids::NETWORK_OVERLAP
        | ids::DAEMON_RISKY_SETTINGS => Confidence::Medium,
        _ => Confidence::Low,
    }
}

pub fn category_for(rule_id: &str) -> &'static str {
    match rule_id {
        ids::DISK_USAGE_HIGH => "host",
        ids::DOCKER_STORAGE_BLOAT | ids::LOG_BLOAT | ids::VOLUME_BLOAT | ids::VOLUME_SIZE_HIGH => {
            "storage"
        }
        ids::RESTART_LOOP | ids::OOM_KILLED | ids::HEALTHCHECK_UNHEALTHY => "stability",
        ids::NETWORK_OVERLAP => "networking",
        ids::DAEMON_RISKY_SETTINGS => "configuration",
        _ => "general",
    }
}

/// Human title; unknown rules fall back to their id.
pub fn title_for(rule_id: &str) -> String {
    let title = match rule_id {
        ids::DISK_USAGE_HIGH => "Disk usage is above threshold",
        ids::DOCKER_STORAGE_BLOAT => "Docker storage usage is high",
        ids::RESTART_LOOP => "Container is restarting frequently",
        ids::OOM_KILLED => "Container was killed by OOM",
        ids::HEALTHCHECK_UNHEALTHY => "Container healthcheck is unhealthy",
        ids::LOG_BLOAT => "Container logs are bloated",
        ids::VOLUME_BLOAT => "Unused Docker volumes detected",
        ids::VOLUME_SIZE_HIGH => "Large Docker volumes detected",
        ids::NETWORK_OVERLAP => "Docker network CIDRs overlap",
        ids::DAEMON_RISKY_SETTINGS => "Docker daemon has risky settings",
        other => other,
    };
    title.to_string()
}
