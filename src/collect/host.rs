//! 宿主机层信息收集
//! 来源：/proc/*, /etc/machine-id, statvfs

use crate::facts::{DiskUsage, HostFacts};
use nix::sys::statvfs::statvfs;
use rand::Rng;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn collect(data_root: &str) -> HostFacts {
    let mut disk_usage = BTreeMap::new();
    if let Some(d) = disk_usage_of("/") {
        disk_usage.insert("/".to_string(), d);
    }
    if data_root != "/" && Path::new(data_root).exists() {
        if let Some(d) = disk_usage_of(data_root) {
            disk_usage.insert(data_root.to_string(), d);
        }
    }

    HostFacts {
        host_id: host_id(),
        hostname: read_trimmed("/proc/sys/kernel/hostname"),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        kernel: read_trimmed("/proc/sys/kernel/osrelease"),
        uptime_seconds: fs::read_to_string("/proc/uptime")
            .ok()
            .as_deref()
            .and_then(parse_uptime)
            .unwrap_or(0),
        disk_usage,
    }
}

fn read_trimmed(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_default().trim().to_string()
}

/// machine-id when present, otherwise a random per-run id.
fn host_id() -> String {
    let id = read_trimmed("/etc/machine-id");
    if !id.is_empty() {
        return id;
    }
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn parse_uptime(s: &str) -> Option<u64> {
    s.split_whitespace().next()?.parse::<f64>().ok().map(|v| v as u64)
}

pub fn disk_usage_of(path: &str) -> Option<DiskUsage> {
    let st = match statvfs(path) {
        Ok(st) => st,
        Err(e) => {
            debug!(path, error = %e, "statvfs failed");
            return None;
        }
    };
    let frsize = st.fragment_size() as u64;
    let total = st.blocks() as u64 * frsize;
    let available = st.blocks_available() as u64 * frsize;
    Some(usage(total, available))
}

fn usage(total: u64, available: u64) -> DiskUsage {
    let used = total.saturating_sub(available);
    let used_percent = if total == 0 { 0.0 } else { used as f64 / total as f64 * 100.0 };
    DiskUsage { used, total, used_percent }
}
