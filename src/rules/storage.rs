use super::offenders::{top_offenders, Offender};
use super::{ids, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::FactSnapshot;
use crate::utils::format::human_bytes;

pub const MEASUREMENT_SYSTEM_DF: &str = "system_df_layers_size";
pub const MEASUREMENT_IMAGE_LIST: &str = "image_list_sum";

const TOP_IMAGES: usize = 5;
const REMOVE_COMMANDS: usize = 3;

/// DOCKER_STORAGE_BLOAT: one aggregate issue when image storage exceeds the
/// threshold. The deduplicated `system df` layer size wins over the naive
/// per-image sum whenever it reports something.
pub fn check_storage_bloat(snapshot: &FactSnapshot, config: &RuleConfig) -> Vec<Issue> {
    let threshold = config.storage_bloat.image_size_threshold;

    let (observed, measurement) = match snapshot.system_df {
        Some(df) if df.images_total_bytes > 0 => (df.images_total_bytes, MEASUREMENT_SYSTEM_DF),
        _ => (snapshot.images.total_size, MEASUREMENT_IMAGE_LIST),
    };
    let build_cache = snapshot.system_df.map(|df| df.build_cache_total_bytes).unwrap_or(0);

    if observed <= threshold {
        return Vec::new();
    }

    let severity = if observed > threshold.saturating_mul(2) {
        Severity::High
    } else {
        Severity::Medium
    };

    let items: Vec<Offender> = snapshot
        .images
        .list
        .iter()
        .map(|img| Offender { name: img.id.as_str(), size: img.size })
        .collect();
    let ranked = top_offenders(&items, items.len());
    let top_images: Vec<String> = ranked.iter().take(TOP_IMAGES).map(Offender::describe).collect();
    let image_count = snapshot.images.list.len();

    let mut solutions = vec![
        "Run 'docker system df' to see deduplicated disk usage and reclaimable space.".to_string(),
        format!("Total images: {}, total size: {}", image_count, human_bytes(observed)),
    ];
    if !top_images.is_empty() {
        solutions.push(format!("Top images by size: {}", top_images.join(", ")));

        let remove: Vec<String> = ranked
            .iter()
            .take(REMOVE_COMMANDS)
            .filter(|img| img.size > 0)
            .map(|img| format!("'docker image rm {}'", img.name))
            .collect();
        if !remove.is_empty() {
            solutions.push(format!("Remove largest images: {}", remove.join(" ")));
        }
    }
    solutions.extend(
        [
            "List images: 'docker images' (or 'docker image ls') and remove unused ones.",
            "Remove unused images: 'docker image prune -a'",
            "Prune build cache: 'docker builder prune' (or 'docker builder prune -a' for more).",
            "Use multi-stage builds to reduce image sizes.",
            "Consider using smaller base images.",
        ]
        .map(String::from),
    );
    if build_cache > 0 {
        solutions.push(format!(
            "Build cache size: {} - consider pruning if large.",
            human_bytes(build_cache)
        ));
    }

    vec![Issue::new(
        ids::DOCKER_STORAGE_BLOAT,
        "",
        severity,
        "storage_bloat",
        format!(
            "Docker image disk usage is {} bytes, exceeding threshold of {} bytes",
            observed, threshold
        ),
    )
    .fact("total_images", image_count)
    .fact("total_image_size", observed)
    .fact("size_threshold", threshold)
    .fact("measurement", measurement)
    .fact("build_cache_size", build_cache)
    .fact("top_images", top_images)
    .solutions(solutions)]
}
