//! 扫描时刻的宿主机快照：主机、守护进程、容器、镜像、卷、网络
//!
//! A [`FactSnapshot`] is built once by the collectors and handed to the
//! rule engine as a read-only value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSnapshot {
    /// Reference "now" for time-based rules.
    pub collected_at: DateTime<Utc>,
    pub host: HostFacts,
    pub daemon: DaemonFacts,
    pub containers: Vec<ContainerFacts>,
    pub images: ImageFacts,
    pub volumes: Vec<VolumeFacts>,
    pub networks: Vec<NetworkFacts>,
    /// Deduplicated `docker system df` totals, absent when that call failed.
    #[serde(default)]
    pub system_df: Option<SystemDfSummary>,
}

impl FactSnapshot {
    pub fn empty(collected_at: DateTime<Utc>) -> Self {
        Self {
            collected_at,
            host: HostFacts::default(),
            daemon: DaemonFacts::default(),
            containers: Vec::new(),
            images: ImageFacts::default(),
            volumes: Vec::new(),
            networks: Vec::new(),
            system_df: None,
        }
    }
}

// ── Host ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostFacts {
    pub host_id: String,
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub kernel: String,
    pub uptime_seconds: u64,
    /// mount path -> usage
    pub disk_usage: BTreeMap<String, DiskUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub used: u64,
    pub total: u64,
    pub used_percent: f64,
}

// ── Daemon ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonFacts {
    pub version: String,
    pub api_version: String,
    pub cgroup_version: String,
    pub data_root: String,
    /// 原始 daemon 配置键值（experimental / registry_config / logging_driver / ...）
    pub info: BTreeMap<String, serde_json::Value>,
}

impl DaemonFacts {
    pub fn info_str(&self, key: &str) -> &str {
        self.info.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    pub fn storage_driver(&self) -> &str {
        self.info_str("storage_driver")
    }
}

// ── Containers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    None,
    Healthy,
    Unhealthy,
    Starting,
}

impl HealthStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" => HealthStatus::Healthy,
            "unhealthy" => HealthStatus::Unhealthy,
            "starting" => HealthStatus::Starting,
            _ => HealthStatus::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::None => "none",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Starting => "starting",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerFacts {
    pub id: String,
    pub name: String,
    /// `docker ps` status text, e.g. "Up 2 hours" or "Restarting (1) 3 seconds ago"
    pub status: String,
    pub restart_count: u32,
    pub oom_killed: bool,
    pub health: HealthStatus,
    /// Unknown when the container is not unhealthy or the probe log is empty.
    #[serde(default)]
    pub unhealthy_since: Option<DateTime<Utc>>,
    /// Estimated json-file log size, 0 when not readable.
    pub log_size: u64,
}

impl ContainerFacts {
    pub fn is_running(&self) -> bool {
        self.status.trim().to_ascii_lowercase().starts_with("up")
    }
}

// ── Images / volumes / networks ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageFacts {
    pub list: Vec<ImageInfo>,
    /// Naive sum of per-image sizes (shared layers counted repeatedly).
    pub total_size: u64,
}

impl ImageFacts {
    pub fn from_list(list: Vec<ImageInfo>) -> Self {
        let total_size = list.iter().map(|i| i.size).sum();
        Self { list, total_size }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeFacts {
    pub name: String,
    pub size: u64,
    pub size_available: bool,
    pub used: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFacts {
    pub name: String,
    pub cidr: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDfSummary {
    pub images_total_bytes: u64,
    pub containers_writable_total_bytes: u64,
    pub volumes_total_bytes: u64,
    pub build_cache_total_bytes: u64,
}
