//! Per-container rules: restart loops, OOM kills, failing healthchecks, log bloat.

use super::{ids, subject, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::{ContainerFacts, FactSnapshot, HealthStatus};
use crate::utils::format::format_duration;
use serde_json::Value;

const UNHEALTHY_ESCALATION_SECS: i64 = 3600;

fn container_issue(
    rule_id: &str,
    c: &ContainerFacts,
    severity: Severity,
    category: &str,
    description: String,
) -> Issue {
    Issue::new(rule_id, subject::container(&c.id), severity, category, description)
        .fact("container_id", c.id.as_str())
        .fact("container_name", c.name.as_str())
}

/// RESTART_LOOP: restarting right now, or restarted more often than allowed.
pub fn check_restart_loop(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    let threshold = config.restarts.threshold;

    snapshot
        .containers
        .iter()
        .filter(|c| {
            c.status.to_ascii_lowercase().contains("restarting") || c.restart_count > threshold
        })
        .map(|c| {
            container_issue(
                ids::RESTART_LOOP,
                c,
                Severity::High,
                "restarts",
                format!(
                    "Container {} ({}) is restarting or exceeded restart threshold",
                    c.name, c.id
                ),
            )
            .fact("status", c.status.as_str())
            .fact("restart_count", c.restart_count)
            .fact("threshold", threshold)
            .solutions([
                format!("Check logs: 'docker logs {}'", c.id),
                "Inspect container configuration for errors.".to_string(),
                "Check resource limits (CPU/memory) that might cause crashes.".to_string(),
                "Review application code for stability issues.".to_string(),
                "Stop and restart the container manually if needed.".to_string(),
            ])
        })
        .collect()
}

/// OOM_KILLED: the kernel killed the container for exceeding its memory.
pub fn check_oom_killed(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    if !config.oom.enabled {
        return Vec::new();
    }

    snapshot
        .containers
        .iter()
        .filter(|c| c.oom_killed)
        .map(|c| {
            container_issue(
                ids::OOM_KILLED,
                c,
                Severity::High,
                "oom",
                format!(
                    "Container {} ({}) was killed due to out-of-memory condition",
                    c.name, c.id
                ),
            )
            .fact("status", c.status.as_str())
            .solutions([
                format!("Check logs: 'docker logs {}'", c.id),
                format!("Increase memory limit: 'docker update --memory <limit> {}'", c.id),
                "Optimize application memory usage.".to_string(),
                "Check for memory leaks in the application.".to_string(),
                "Consider using memory profiling tools.".to_string(),
                "Review container resource allocation.".to_string(),
            ])
        })
        .collect()
}

/// HEALTHCHECK_UNHEALTHY: escalates once the container has been failing for
/// more than an hour. An unknown onset stays at medium.
pub fn check_healthcheck(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    if !config.healthcheck.enabled {
        return Vec::new();
    }

    snapshot
        .containers
        .iter()
        .filter(|c| c.health == HealthStatus::Unhealthy)
        .map(|c| {
            let elapsed = c
                .unhealthy_since
                .map(|since| (snapshot.collected_at - since).num_seconds());

            let severity = match elapsed {
                Some(secs) if secs > UNHEALTHY_ESCALATION_SECS => Severity::High,
                _ => Severity::Medium,
            };
            let (description, duration) = match elapsed {
                Some(secs) => (
                    format!(
                        "Container {} ({}) has been unhealthy for {}",
                        c.name,
                        c.id,
                        format_duration(secs)
                    ),
                    format_duration(secs),
                ),
                None => (
                    format!("Container {} ({}) is unhealthy (onset unknown)", c.name, c.id),
                    "unknown".to_string(),
                ),
            };
            let since = c
                .unhealthy_since
                .map(|t| Value::String(t.to_rfc3339()))
                .unwrap_or(Value::Null);

            container_issue(ids::HEALTHCHECK_UNHEALTHY, c, severity, "healthcheck", description)
                .fact("health_status", c.health.as_str())
                .fact("unhealthy_since", since)
                .fact("unhealthy_duration", duration)
                .solutions([
                    format!(
                        "Check healthcheck logs: 'docker inspect {} | jq .State.Health.Log'",
                        c.id
                    ),
                    format!("Check container logs: 'docker logs {}'", c.id),
                    "Review healthcheck configuration in Dockerfile or compose file.".to_string(),
                    "Ensure the healthcheck command is appropriate for the application.".to_string(),
                    "Check application responsiveness and dependencies.".to_string(),
                    "Consider adjusting healthcheck timeouts or intervals.".to_string(),
                ])
        })
        .collect()
}

/// LOG_BLOAT: json-file logs above the size threshold. A zero size means the
/// log was not readable and never triggers.
pub fn check_log_bloat(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    if !config.log_bloat.enabled {
        return Vec::new();
    }
    let threshold = config.log_bloat.size_threshold;

    snapshot
        .containers
        .iter()
        .filter(|c| c.log_size > threshold)
        .map(|c| {
            let severity = if c.log_size > threshold.saturating_mul(2) {
                Severity::High
            } else {
                Severity::Medium
            };

            container_issue(
                ids::LOG_BLOAT,
                c,
                severity,
                "log_bloat",
                format!(
                    "Container {} ({}) has large log files ({} bytes), exceeding threshold of {} bytes",
                    c.name, c.id, c.log_size, threshold
                ),
            )
            .fact("log_size", c.log_size)
            .fact("threshold", threshold)
            .solutions([
                format!("Check log size: 'docker logs {} | wc -c'", c.id),
                format!(
                    "Rotate logs: 'docker logs {} > /tmp/logs && docker logs {} --tail 0'",
                    c.id, c.id
                ),
                "Use log drivers like 'json-file' with 'max-size' and 'max-file' options.".to_string(),
                "Configure logging in docker-compose.yml or Dockerfile.".to_string(),
                "Consider using external logging solutions (e.g., ELK stack, Fluentd).".to_string(),
                "Monitor application logging levels to reduce verbosity.".to_string(),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn snapshot_with(containers: Vec<ContainerFacts>) -> FactSnapshot {
        let mut snapshot = FactSnapshot::empty(Utc::now());
        snapshot.containers = containers;
        snapshot
    }

    fn container(id: &str) -> ContainerFacts {
        ContainerFacts {
            id: id.to_string(),
            name: format!("/{}", id),
            status: "Up 1m".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_restart_loop_by_status_or_count() {
        let mut restarting = container("aaa");
        restarting.status = "Restarting (1) 2 seconds ago".into();
        let mut counted = container("bbb");
        counted.restart_count = 4;
        let mut calm = container("ccc");
        calm.restart_count = 3;

        let issues = check_restart_loop(
            &snapshot_with(vec![restarting, counted, calm]),
            &RuleConfig::default(),
        );
        let subjects: Vec<&str> = issues.iter().map(|i| i.subject.as_str()).collect();
        assert_eq!(subjects, vec!["container=aaa", "container=bbb"]);
        assert!(issues.iter().all(|i| i.severity == Severity::High));
        assert_eq!(issues[0].facts["container_name"], "/aaa");
    }

    #[test]
    fn test_oom_respects_switch() {
        let mut c = container("ooo");
        c.oom_killed = true;
        let snapshot = snapshot_with(vec![c]);

        let mut cfg = RuleConfig::default();
        assert_eq!(check_oom_killed(&snapshot, &cfg).len(), 1);

        cfg.oom.enabled = false;
        assert!(check_oom_killed(&snapshot, &cfg).is_empty());
    }

    #[test]
    fn test_healthcheck_escalates_after_an_hour() {
        let now = Utc::now();
        let mut long = container("long");
        long.health = HealthStatus::Unhealthy;
        long.unhealthy_since = Some(now - Duration::hours(2));
        let mut short = container("short");
        short.health = HealthStatus::Unhealthy;
        short.unhealthy_since = Some(now - Duration::minutes(5));

        let mut snapshot = snapshot_with(vec![long, short]);
        snapshot.collected_at = now;

        let issues = check_healthcheck(&snapshot, &RuleConfig::default());
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].facts["unhealthy_duration"], "2h0m0s");
        assert_eq!(issues[1].severity, Severity::Medium);
    }

    #[test]
    fn test_healthcheck_unknown_onset_does_not_panic() {
        let mut c = container("nolog");
        c.health = HealthStatus::Unhealthy;
        c.unhealthy_since = None;

        let issues = check_healthcheck(&snapshot_with(vec![c]), &RuleConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].facts["unhealthy_since"], Value::Null);
        assert_eq!(issues[0].facts["unhealthy_duration"], "unknown");
    }

    #[test]
    fn test_healthy_and_disabled_produce_nothing() {
        let mut c = container("fine");
        c.health = HealthStatus::Healthy;
        assert!(check_healthcheck(&snapshot_with(vec![c.clone()]), &RuleConfig::default()).is_empty());

        c.health = HealthStatus::Unhealthy;
        let mut cfg = RuleConfig::default();
        cfg.healthcheck.enabled = false;
        assert!(check_healthcheck(&snapshot_with(vec![c]), &cfg).is_empty());
    }

    #[test]
    fn test_log_bloat_severity_and_zero_size() {
        let mut cfg = RuleConfig::default();
        cfg.log_bloat.size_threshold = 100;

        let mut medium = container("medium");
        medium.log_size = 150;
        let mut high = container("high");
        high.log_size = 201;
        let unreadable = container("unreadable");

        let issues = check_log_bloat(&snapshot_with(vec![medium, high, unreadable]), &cfg);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[1].severity, Severity::High);
    }
}
