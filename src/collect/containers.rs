//! 容器信息收集
//! 来源：docker ps / docker inspect / json-file 日志

use super::docker::{str_val, DockerCli};
use crate::facts::{ContainerFacts, HealthStatus};
use crate::utils::{DoctorError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

pub const INSPECT_WORKERS: usize = 8;

#[derive(Debug, Default)]
pub struct ContainerScan {
    pub containers: Vec<ContainerFacts>,
    /// Names of volumes mounted by at least one container.
    pub used_volumes: BTreeSet<String>,
    /// At least one json-file log was stat'ed successfully.
    pub logs_readable: bool,
}

/// Everything taken from one `docker inspect`.
#[derive(Debug, Default, Clone)]
struct Inspected {
    restart_count: u32,
    oom_killed: bool,
    health: HealthStatus,
    unhealthy_since: Option<DateTime<Utc>>,
    log_path: String,
    volumes: Vec<String>,
}

struct Listed {
    id: String,
    name: String,
    status: String,
}

// ── 公开接口 ────────────────────────────────────────────────────────────────

/// `host_fs` is the daemon data root when host files may be read.
pub fn collect(cli: &DockerCli, host_fs: Option<&Path>) -> Result<ContainerScan> {
    let rows = cli.json_lines(&["ps", "-a", "--no-trunc", "--format", "{{json .}}"])?;
    let listed: Vec<Listed> = rows
        .iter()
        .map(|r| Listed {
            id: str_val(r, &["ID"]),
            name: str_val(r, &["Names"]),
            status: str_val(r, &["Status"]),
        })
        .filter(|l| !l.id.is_empty())
        .collect();

    let inspected = inspect_all(cli, &listed)?;

    let mut scan = ContainerScan::default();
    for (l, ins) in listed.iter().zip(inspected) {
        let log_size = match host_fs {
            Some(root) => match log_size(root, &l.id, &ins.log_path) {
                Some(size) => {
                    scan.logs_readable = true;
                    size
                }
                None => 0,
            },
            None => 0,
        };
        scan.used_volumes.extend(ins.volumes);
        scan.containers.push(ContainerFacts {
            id: l.id.chars().take(12).collect(),
            name: l.name.clone(),
            status: l.status.clone(),
            restart_count: ins.restart_count,
            oom_killed: ins.oom_killed,
            health: ins.health,
            unhealthy_since: ins.unhealthy_since,
            log_size,
        });
    }

    scan.containers
        .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(scan)
}

/// Bounded pool: worker `w` takes every `INSPECT_WORKERS`-th container
/// starting at `w` into its own buffer; buffers are merged by index.
fn inspect_all(cli: &DockerCli, listed: &[Listed]) -> Result<Vec<Inspected>> {
    let workers = INSPECT_WORKERS.min(listed.len()).max(1);

    let buffers: Vec<Vec<(usize, Result<Inspected>)>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                s.spawn(move || {
                    listed
                        .iter()
                        .enumerate()
                        .skip(w)
                        .step_by(workers)
                        .map(|(i, l)| (i, inspect_one(cli, &l.id)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or_default()).collect()
    });

    let mut merged = vec![Inspected::default(); listed.len()];
    for (i, res) in buffers.into_iter().flatten() {
        match res {
            Ok(ins) => merged[i] = ins,
            Err(e @ DoctorError::Timeout(_)) => return Err(e),
            Err(e) => warn!(container = %listed[i].id, error = %e, "inspect failed, using defaults"),
        }
    }
    Ok(merged)
}

fn inspect_one(cli: &DockerCli, id: &str) -> Result<Inspected> {
    let arr = cli.json(&["inspect", id])?;
    let c = arr
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| DoctorError::Parse("empty inspect result".to_string()))?;
    Ok(parse_inspect(c))
}

fn parse_inspect(c: &Value) -> Inspected {
    let (health, unhealthy_since) = parse_health(&c["State"]);
    let volumes = c["Mounts"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter(|m| m["Type"].as_str() == Some("volume"))
                .filter_map(|m| m["Name"].as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Inspected {
        restart_count: c["RestartCount"].as_u64().unwrap_or(0) as u32,
        oom_killed: c["State"]["OOMKilled"].as_bool().unwrap_or(false),
        health,
        unhealthy_since,
        log_path: str_val(c, &["LogPath"]),
        volumes,
    }
}

// ── health ──────────────────────────────────────────────────────────────────

/// Health status from `State.Health`, plus when it turned unhealthy.
pub fn parse_health(state: &Value) -> (HealthStatus, Option<DateTime<Utc>>) {
    let health = &state["Health"];
    let status = HealthStatus::parse(health["Status"].as_str().unwrap_or(""));
    if status != HealthStatus::Unhealthy {
        return (status, None);
    }
    let log = health["Log"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    (status, infer_unhealthy_since(log))
}

/// Walk the probe log backwards to the latest success; the probe right
/// after it marks the onset. No success at all means the first entry.
/// An empty log gives `None`.
pub fn infer_unhealthy_since(log: &[Value]) -> Option<DateTime<Utc>> {
    let mut since = parse_ts(log.first()?["Start"].as_str().unwrap_or(""));

    if let Some(i) = log.iter().rposition(|p| p["ExitCode"].as_i64() == Some(0)) {
        if let Some(next) = log.get(i + 1).and_then(|p| parse_ts(p["Start"].as_str().unwrap_or(""))) {
            since = Some(next);
        }
    }
    since
}

fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc))
}

// ── logs ────────────────────────────────────────────────────────────────────

fn log_size(data_root: &Path, id: &str, log_path: &str) -> Option<u64> {
    let path = if log_path.is_empty() {
        data_root.join("containers").join(id).join(format!("{}-json.log", id))
    } else {
        Path::new(log_path).to_path_buf()
    };
    std::fs::metadata(path).ok().map(|m| m.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn probe(start: &str, code: i64) -> Value {
        json!({ "Start": start, "End": start, "ExitCode": code })
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_onset_is_probe_after_last_success() {
        let log = vec![
            probe("2024-01-01T10:00:00Z", 1),
            probe("2024-01-01T10:01:00Z", 0),
            probe("2024-01-01T10:02:00.123456789Z", 1),
            probe("2024-01-01T10:03:00Z", 1),
        ];
        let since = infer_unhealthy_since(&log).unwrap();
        assert_eq!(since.timestamp(), at(10, 2).timestamp());
    }

    #[test]
    fn test_no_success_uses_first_entry() {
        let log = vec![probe("2024-01-01T09:00:00+00:00", 1), probe("2024-01-01T09:30:00Z", 1)];
        assert_eq!(infer_unhealthy_since(&log), Some(at(9, 0)));
    }

    #[test]
    fn test_success_as_last_entry_falls_back_to_first() {
        let log = vec![probe("2024-01-01T08:00:00Z", 1), probe("2024-01-01T08:05:00Z", 0)];
        assert_eq!(infer_unhealthy_since(&log), Some(at(8, 0)));
    }

    #[test]
    fn test_empty_log_is_unknown() {
        assert_eq!(infer_unhealthy_since(&[]), None);

        let state = json!({ "Health": { "Status": "unhealthy", "Log": [] } });
        assert_eq!(parse_health(&state), (HealthStatus::Unhealthy, None));
    }

    #[test]
    fn test_healthy_has_no_onset() {
        let state = json!({ "Health": { "Status": "healthy", "Log": [probe("2024-01-01T08:00:00Z", 0)] } });
        assert_eq!(parse_health(&state), (HealthStatus::Healthy, None));
        assert_eq!(parse_health(&json!({})), (HealthStatus::None, None));
    }

    #[test]
    fn test_parse_inspect_fields() {
        let c = json!({
            "RestartCount": 7,
            "State": { "OOMKilled": true },
            "LogPath": "/var/lib/docker/containers/abc/abc-json.log",
            "Mounts": [
                { "Type": "volume", "Name": "pgdata" },
                { "Type": "bind", "Source": "/etc" }
            ]
        });
        let ins = parse_inspect(&c);
        assert_eq!(ins.restart_count, 7);
        assert!(ins.oom_killed);
        assert_eq!(ins.health, HealthStatus::None);
        assert_eq!(ins.volumes, vec!["pgdata".to_string()]);
    }

    #[test]
    fn test_log_size_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x-json.log");
        std::fs::write(&file, b"0123456789").unwrap();
        assert_eq!(log_size(dir.path(), "x", file.to_str().unwrap()), Some(10));
        assert_eq!(log_size(dir.path(), "missing", ""), None);
    }
}
