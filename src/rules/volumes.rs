use super::offenders::{top_offenders, Offender};
use super::{ids, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::FactSnapshot;
use crate::utils::format::human_bytes;

const TOP_UNUSED: usize = 5;

/// VOLUME_BLOAT: one aggregate issue listing volumes no container mounts.
pub fn check_volume_bloat(snapshot: &FactSnapshot, _config: &RuleConfig) -> Vec<Issue> {
    let volumes = &snapshot.volumes;
    let total_size: u64 = volumes.iter().map(|v| v.size).sum();
    let used_count = volumes.iter().filter(|v| v.used).count();
    let unused: Vec<Offender> = volumes
        .iter()
        .filter(|v| !v.used)
        .map(|v| Offender { name: v.name.as_str(), size: v.size })
        .collect();

    if unused.is_empty() {
        return Vec::new();
    }

    let severity = if unused.len() > 5 { Severity::Medium } else { Severity::Low };
    let top_unused: Vec<String> =
        top_offenders(&unused, TOP_UNUSED).iter().map(Offender::describe).collect();

    let mut solutions = vec![format!(
        "Found {} unused volumes out of {} total",
        unused.len(),
        volumes.len()
    )];
    if !top_unused.is_empty() {
        solutions.push(format!("Largest unused volumes: {}", top_unused.join(", ")));
    }
    solutions.extend(
        [
            "Remove unused volumes: 'docker volume rm <volume_name>'",
            "List all volumes: 'docker volume ls'",
            "Prune unused volumes: 'docker volume prune'",
            "Review container configurations to ensure volumes are properly attached.",
        ]
        .map(String::from),
    );

    vec![Issue::new(
        ids::VOLUME_BLOAT,
        "",
        severity,
        "storage_bloat",
        format!("Found {} unused Docker volumes that can be cleaned up", unused.len()),
    )
    .fact("total_volumes", volumes.len())
    .fact("used_volumes", used_count)
    .fact("unused_volumes", unused.len())
    .fact("total_volume_size", total_size)
    .fact("top_unused", top_unused)
    .solutions(solutions)]
}

/// VOLUME_SIZE_HIGH: one aggregate mixing volumes above the size threshold
/// and volumes whose size could not be measured.
pub fn check_volume_size(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    if !config.volume_size.enabled {
        return Vec::new();
    }
    let threshold = config.volume_size.size_threshold;

    let large: Vec<String> = snapshot
        .volumes
        .iter()
        .filter(|v| v.size_available && v.size > threshold)
        .map(|v| Offender { name: v.name.as_str(), size: v.size }.describe())
        .collect();
    let unavailable: Vec<String> = snapshot
        .volumes
        .iter()
        .filter(|v| !v.size_available)
        .map(|v| v.name.clone())
        .collect();

    let flagged = large.len() + unavailable.len();
    if flagged == 0 {
        return Vec::new();
    }
    let severity = if flagged > 3 { Severity::High } else { Severity::Medium };

    let mut descriptions = Vec::new();
    let mut solutions = vec![
        "Review volume contents and remove unnecessary data".to_string(),
        "Consider archiving old data or using smaller volumes".to_string(),
    ];
    if !large.is_empty() {
        descriptions.push(format!(
            "Found {} volumes exceeding size threshold of {}",
            large.len(),
            human_bytes(threshold)
        ));
        solutions.push(
            "Inspect large volumes: 'docker run --rm -v <volume>:/data alpine du -sh /data'"
                .to_string(),
        );
    }
    if !unavailable.is_empty() {
        descriptions.push(format!(
            "Volume sizes unavailable for {} volumes (host FS not accessible)",
            unavailable.len()
        ));
        solutions.push(
            "Volume sizes are not available on this system (host FS access required)".to_string(),
        );
    }

    let mut issue = Issue::new(
        ids::VOLUME_SIZE_HIGH,
        "",
        severity,
        "storage",
        descriptions.join(". "),
    );
    if !large.is_empty() {
        issue = issue.fact("large_volumes", large).fact("size_threshold", threshold);
    }
    if !unavailable.is_empty() {
        issue = issue.fact("unavailable_volumes", unavailable);
    }

    vec![issue.solutions(solutions)]
}
