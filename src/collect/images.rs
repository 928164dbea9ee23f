use super::docker::{short_id, DockerCli};
use crate::facts::{ImageFacts, ImageInfo};
use crate::utils::Result;
use serde_json::Value;
use std::collections::BTreeSet;

pub fn collect(cli: &DockerCli) -> Result<ImageFacts> {
    let ids = dedup(cli.lines(&["image", "ls", "-a", "-q", "--no-trunc"])?);
    if ids.is_empty() {
        return Ok(ImageFacts::default());
    }

    let mut args = vec!["image", "inspect"];
    args.extend(ids.iter().map(String::as_str));
    let inspected = cli.json(&args)?;
    Ok(ImageFacts::from_list(images_from_inspect(&inspected)))
}

/// `image ls -a` repeats an id once per tag; keep the first occurrence.
fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn images_from_inspect(arr: &Value) -> Vec<ImageInfo> {
    arr.as_array()
        .map(|a| {
            a.iter()
                .map(|img| ImageInfo {
                    id: short_id(img["Id"].as_str().unwrap_or("")),
                    size: img["Size"].as_u64().unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default()
}
