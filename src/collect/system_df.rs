//! `docker system df`: shared-layer-aware totals. Best-effort.

use super::docker::{str_val, DockerCli};
use crate::facts::SystemDfSummary;
use crate::utils::format::parse_size_to_bytes;
use crate::utils::Result;
use serde_json::Value;

pub fn collect(cli: &DockerCli) -> Result<SystemDfSummary> {
    let rows = cli.json_lines(&["system", "df", "--format", "{{json .}}"])?;
    Ok(summary_from_rows(&rows))
}

/// One row per `Type`; unknown types and unparsable sizes count as zero.
pub fn summary_from_rows(rows: &[Value]) -> SystemDfSummary {
    let mut df = SystemDfSummary::default();
    for row in rows {
        let size = parse_size_to_bytes(&str_val(row, &["Size"])).unwrap_or(0);
        match str_val(row, &["Type"]).as_str() {
            "Images" => df.images_total_bytes = size,
            "Containers" => df.containers_writable_total_bytes = size,
            "Local Volumes" => df.volumes_total_bytes = size,
            "Build Cache" => df.build_cache_total_bytes = size,
            _ => {}
        }
    }
    df
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::docker::parse_json_lines;

    #[test]
    fn test_rows_to_summary() {
        let out = r#"{"Active":"2","Reclaimable":"1.2GB (40%)","Size":"3.1GB","TotalCount":"9","Type":"Images"}
{"Active":"2","Reclaimable":"0B (0%)","Size":"12.5kB","TotalCount":"3","Type":"Containers"}
{"Active":"1","Reclaimable":"0B","Size":"512MiB","TotalCount":"4","Type":"Local Volumes"}
{"Active":"0","Reclaimable":"0B","Size":"0B","TotalCount":"0","Type":"Build Cache"}"#;
        let df = summary_from_rows(&parse_json_lines(out).unwrap());
        assert_eq!(df.images_total_bytes, 3_100_000_000);
        assert_eq!(df.containers_writable_total_bytes, 12_500);
        assert_eq!(df.volumes_total_bytes, 512 * 1024 * 1024);
        assert_eq!(df.build_cache_total_bytes, 0);
    }
}
