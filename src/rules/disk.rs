use super::{ids, subject, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::FactSnapshot;

/// DISK_USAGE_HIGH: one issue per host path above the usage threshold.
pub fn check_disk_usage(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    let threshold = config.disk_usage.threshold;

    snapshot
        .host
        .disk_usage
        .iter()
        .filter(|(_, disk)| disk.used_percent > f64::from(threshold))
        .map(|(path, disk)| {
            let mut solutions = vec![
                "Identify and remove unused files or directories.".to_string(),
                "Consider increasing disk space if possible.".to_string(),
            ];
            if path == "/var/lib/docker" || path.contains("docker") {
                solutions.extend([
                    "Run 'docker system prune' to remove unused containers, images, and networks.".to_string(),
                    "Run 'docker volume prune' to remove unused volumes.".to_string(),
                    "Inspect and clean up large Docker images or logs.".to_string(),
                ]);
            } else if path == "/" {
                solutions.extend([
                    "Check for large log files in /var/log and rotate them.".to_string(),
                    "Remove old kernel packages: 'apt autoremove' (on Ubuntu/Debian).".to_string(),
                ]);
            }

            Issue::new(
                ids::DISK_USAGE_HIGH,
                subject::path(path),
                disk_severity(disk.used_percent),
                "disk_usage",
                format!(
                    "Disk usage for {} is {:.2}%, exceeding threshold of {}%",
                    path, disk.used_percent, threshold
                ),
            )
            .fact("path", path.as_str())
            .fact("used_bytes", disk.used)
            .fact("total_bytes", disk.total)
            .fact("used_percent", disk.used_percent)
            .fact("threshold", threshold)
            .solutions(solutions)
        })
        .collect()
}

/// `> 90` is high, `< 85` is low, everything in between (85.0 and 90.0
/// included) is medium. The high branch is checked first.
fn disk_severity(used_percent: f64) -> Severity {
    if used_percent > 90.0 {
        Severity::High
    } else if used_percent < 85.0 {
        Severity::Low
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::DiskUsage;
    use chrono::Utc;

    fn snapshot_with(disks: &[(&str, f64)]) -> FactSnapshot {
        let mut snapshot = FactSnapshot::empty(Utc::now());
        for (path, pct) in disks {
            snapshot.host.disk_usage.insert(
                path.to_string(),
                DiskUsage { used: *pct as u64, total: 100, used_percent: *pct },
            );
        }
        snapshot
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(disk_severity(95.0), Severity::High);
        assert_eq!(disk_severity(90.0), Severity::Medium);
        assert_eq!(disk_severity(85.0), Severity::Medium);
        assert_eq!(disk_severity(84.99), Severity::Low);
    }

    #[test]
    fn test_only_paths_over_threshold() {
        let snapshot = snapshot_with(&[("/", 81.0), ("/var/lib/docker", 80.0), ("/data", 20.0)]);
        let issues = check_disk_usage(&snapshot, &RuleConfig::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject, "path=/");
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(issues[0].facts["threshold"], 80);
    }

    #[test]
    fn test_docker_path_gets_prune_advice() {
        let snapshot = snapshot_with(&[("/var/lib/docker", 99.0)]);
        let issues = check_disk_usage(&snapshot, &RuleConfig::default());

        assert_eq!(issues[0].severity, Severity::High);
        assert!(issues[0].solutions.iter().any(|s| s.contains("docker system prune")));
        assert!(issues[0].description.contains("99.00%"));
    }
}
