//! Fact collection through the `docker` CLI and the host filesystem.
//!
//! Produces one complete [`FactSnapshot`] plus per-collector run metadata.
//! Listing failures are fatal; `system df` and host-filesystem probing are
//! best-effort and only show up as collector status.

pub mod containers;
pub mod docker;
pub mod engine;
pub mod host;
pub mod images;
pub mod networks;
pub mod system_df;
pub mod volumes;

use crate::config::{ScanConfig, ScanMode};
use crate::facts::FactSnapshot;
use crate::schema::v1::{Capabilities, Collector, CollectorStatus};
use crate::utils::Result;
use chrono::Utc;
use docker::DockerCli;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DAEMON_CONFIG_FILE: &str = "/etc/docker/daemon.json";

#[derive(Debug, Clone)]
pub struct CollectorRun {
    pub name: String,
    pub status: CollectorStatus,
    pub duration: Duration,
    pub errors: Vec<String>,
}

impl CollectorRun {
    fn new(name: &str, status: CollectorStatus, duration: Duration, errors: Vec<String>) -> Self {
        Self { name: name.to_string(), status, duration, errors }
    }

    pub fn ok(name: &str, duration: Duration) -> Self {
        Self::new(name, CollectorStatus::Ok, duration, Vec::new())
    }

    pub fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self::new(name, CollectorStatus::Skipped, Duration::ZERO, vec![reason.into()])
    }

    pub fn error(name: &str, duration: Duration, err: impl Into<String>) -> Self {
        Self::new(name, CollectorStatus::Error, duration, vec![err.into()])
    }
}

impl From<&CollectorRun> for Collector {
    fn from(run: &CollectorRun) -> Self {
        Collector {
            name: run.name.clone(),
            status: run.status,
            duration_ms: run.duration.as_millis() as i64,
            errors: run.errors.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub snapshot: FactSnapshot,
    pub runs: Vec<CollectorRun>,
    pub capabilities: Capabilities,
    pub effective_mode: ScanMode,
}

/// Decide whether host files are used. Returns the effective mode, whether
/// the host filesystem may be read, and the `host_fs` run record.
pub fn resolve_mode(requested: ScanMode, host_fs_readable: bool) -> (ScanMode, bool, CollectorRun) {
    const NAME: &str = "host_fs";
    match (requested, host_fs_readable) {
        (ScanMode::Basic, _) => (
            ScanMode::Basic,
            false,
            CollectorRun::skipped(NAME, "host filesystem not used in basic mode"),
        ),
        (ScanMode::Full, true) | (ScanMode::Auto, true) => {
            (ScanMode::Full, true, CollectorRun::ok(NAME, Duration::ZERO))
        }
        (ScanMode::Full, false) => (
            ScanMode::Full,
            false,
            CollectorRun::error(NAME, Duration::ZERO, "host filesystem is not readable"),
        ),
        (ScanMode::Auto, false) => (
            ScanMode::Basic,
            false,
            CollectorRun::skipped(NAME, "host filesystem is not readable"),
        ),
    }
}

fn host_fs_readable(data_root: &Path) -> bool {
    std::fs::read_dir(data_root.join("containers")).is_ok()
}

/// Time one collector and record it as ok, or pass its error up.
fn timed<T>(runs: &mut Vec<CollectorRun>, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let out = f()?;
    let elapsed = started.elapsed();
    debug!(collector = name, elapsed_ms = elapsed.as_millis() as u64, "collected");
    runs.push(CollectorRun::ok(name, elapsed));
    Ok(out)
}

pub fn collect(scan: &ScanConfig) -> Result<Collection> {
    let cli = DockerCli::new(scan);
    let mut runs = Vec::new();

    let daemon = timed(&mut runs, "docker_engine", || engine::collect(&cli))?;
    let data_root = PathBuf::from(&daemon.data_root);

    let host = timed(&mut runs, "host", || Ok(host::collect(&daemon.data_root)))?;

    let (effective_mode, use_host_fs, host_fs_run) =
        resolve_mode(scan.mode, host_fs_readable(&data_root));
    if host_fs_run.status == CollectorStatus::Error {
        warn!(data_root = %data_root.display(), "full mode requested but host filesystem is not readable");
    }
    runs.push(host_fs_run);
    let host_fs = use_host_fs.then_some(data_root.as_path());

    let scanned = timed(&mut runs, "containers", || containers::collect(&cli, host_fs))?;
    let images = timed(&mut runs, "images", || images::collect(&cli))?;
    let volumes = timed(&mut runs, "volumes", || {
        volumes::collect(&cli, &scanned.used_volumes, host_fs)
    })?;
    let networks = timed(&mut runs, "networks", || networks::collect(&cli))?;

    let df_started = Instant::now();
    let system_df = match system_df::collect(&cli) {
        Ok(df) => {
            runs.push(CollectorRun::ok("docker_system_df", df_started.elapsed()));
            Some(df)
        }
        Err(e @ crate::utils::DoctorError::Timeout(_)) => return Err(e),
        Err(e) => {
            warn!(error = %e, "docker system df unavailable");
            runs.push(CollectorRun::error("docker_system_df", df_started.elapsed(), e.to_string()));
            None
        }
    };

    let capabilities = Capabilities {
        docker_api: true,
        host_fs_mounted: use_host_fs,
        daemon_config_readable: std::fs::File::open(DAEMON_CONFIG_FILE).is_ok(),
        container_log_files_readable: scanned.logs_readable,
    };

    let snapshot = FactSnapshot {
        collected_at: Utc::now(),
        host,
        daemon,
        containers: scanned.containers,
        images,
        volumes,
        networks,
        system_df,
    };

    Ok(Collection { snapshot, runs, capabilities, effective_mode })
}
