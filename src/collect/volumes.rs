use super::docker::{str_val, DockerCli};
use crate::facts::VolumeFacts;
use crate::utils::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Sizes are measured under `<data_root>/volumes/<name>/_data` only when
/// `host_fs` is given; otherwise every volume is marked size-unavailable.
pub fn collect(
    cli: &DockerCli,
    used: &BTreeSet<String>,
    host_fs: Option<&Path>,
) -> Result<Vec<VolumeFacts>> {
    let rows = cli.json_lines(&["volume", "ls", "--format", "{{json .}}"])?;
    Ok(rows
        .iter()
        .map(|r| str_val(r, &["Name"]))
        .filter(|name| !name.is_empty())
        .map(|name| {
            let size = host_fs.and_then(|root| volume_size(root, &name));
            VolumeFacts {
                used: used.contains(&name),
                size: size.unwrap_or(0),
                size_available: size.is_some(),
                name,
            }
        })
        .collect())
}

fn volume_size(data_root: &Path, name: &str) -> Option<u64> {
    let path = data_root.join("volumes").join(name).join("_data");
    if !path.is_dir() {
        return None;
    }
    dir_size(&path).ok()
}

/// Recursive sum of regular file sizes. Symlinks are not followed.
pub fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let ft = entry.file_type()?;
        if ft.is_dir() {
            total += dir_size(&entry.path())?;
        } else if ft.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_size_from_data_dir() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("volumes/pg/_data/sub");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("a"), vec![0u8; 300]).unwrap();
        fs::write(root.path().join("volumes/pg/_data/b"), vec![0u8; 12]).unwrap();

        assert_eq!(volume_size(root.path(), "pg"), Some(312));
        assert_eq!(volume_size(root.path(), "missing"), None);
    }
}
