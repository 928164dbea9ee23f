use super::{ids, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::FactSnapshot;
use serde_json::Value;

/// DAEMON_RISKY_SETTINGS: always evaluated, config has no switch for it.
pub fn check_daemon_risky(snapshot: &FactSnapshot, _config: &RuleConfig) -> Vec<Issue> {
    let info = &snapshot.daemon.info;
    let mut risky = Vec::new();

    if info.get("experimental").and_then(Value::as_bool) == Some(true) {
        risky.push("experimental features enabled".to_string());
    }

    let insecure = info
        .get("registry_config")
        .and_then(|rc| rc.get("InsecureRegistryCIDRs"))
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    if insecure > 0 {
        risky.push(format!("insecure registries configured: {} entries", insecure));
    }

    if info.get("logging_driver").and_then(Value::as_str) == Some("none") {
        risky.push("logging driver set to 'none'".to_string());
    }

    if risky.is_empty() {
        return Vec::new();
    }

    let severity = if risky.len() > 2 { Severity::High } else { Severity::Medium };

    vec![Issue::new(
        ids::DAEMON_RISKY_SETTINGS,
        "",
        severity,
        "configuration",
        format!("Docker daemon has {} potentially risky settings configured", risky.len()),
    )
    .fact("risky_settings", risky)
    .solutions([
        "Review Docker daemon configuration for security implications",
        "Disable experimental features in production",
        "Avoid insecure registries unless absolutely necessary",
        "Configure appropriate logging drivers",
        "Check /etc/docker/daemon.json for configuration details",
        "Restart Docker daemon after configuration changes",
    ])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn snapshot_with(bag: Value) -> FactSnapshot {
        let mut snapshot = FactSnapshot::empty(Utc::now());
        if let Value::Object(map) = bag {
            snapshot.daemon.info = map.into_iter().collect();
        }
        snapshot
    }

    #[test]
    fn test_clean_daemon() {
        let snapshot = snapshot_with(json!({
            "experimental": false,
            "logging_driver": "json-file",
            "registry_config": { "InsecureRegistryCIDRs": [] }
        }));
        assert!(check_daemon_risky(&snapshot, &RuleConfig::default()).is_empty());
    }

    #[test]
    fn test_two_settings_is_medium() {
        let snapshot = snapshot_with(json!({
            "experimental": true,
            "logging_driver": "none"
        }));
        let issues = check_daemon_risky(&snapshot, &RuleConfig::default());
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].subject, "");
    }

    #[test]
    fn test_all_three_is_high() {
        let snapshot = snapshot_with(json!({
            "experimental": true,
            "logging_driver": "none",
            "registry_config": { "InsecureRegistryCIDRs": ["127.0.0.0/8", "10.0.0.0/8"] }
        }));
        let issues = check_daemon_risky(&snapshot, &RuleConfig::default());
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(
            issues[0].facts["risky_settings"][1],
            "insecure registries configured: 2 entries"
        );
    }

    #[test]
    fn test_wrong_types_are_ignored() {
        let snapshot = snapshot_with(json!({
            "experimental": "true",
            "registry_config": "oops"
        }));
        assert!(check_daemon_risky(&snapshot, &RuleConfig::default()).is_empty());
    }
}
