//! Assembles the v1 envelope from a snapshot, its sorted issues and the run
//! metadata handed over by the collection layer.

use super::finding::finding_from_issue;
use super::v1::*;
use super::SCHEMA_VERSION;
use crate::config::ScanMode;
use crate::facts::FactSnapshot;
use crate::rules::Issue;
use chrono::{DateTime, Utc};
use rand::Rng;

pub const TOOL_NAME: &str = "docker-doctor";

impl Tool {
    /// Name and version of this binary, stamped at build time.
    pub fn current() -> Self {
        Self {
            name: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_commit: env!("GIT_COMMIT").to_string(),
            build_time: env!("BUILD_TIME").to_string(),
        }
    }
}

/// `YYYYMMDDTHHMMSSZ-<8 hex>`. Sortable and unique enough; not a secret.
pub fn new_scan_id(finished_at: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}-{:08x}", finished_at.format("%Y%m%dT%H%M%SZ"), suffix)
}

pub struct ReportBuilder<'a> {
    snapshot: &'a FactSnapshot,
    issues: &'a [Issue],
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    tool: Tool,
    mode: ScanMode,
    effective_mode: ScanMode,
    timeout_seconds: u64,
    api_version: String,
    capabilities: Capabilities,
    collectors: Vec<Collector>,
    errors: Vec<String>,
    scan_id: Option<String>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        snapshot: &'a FactSnapshot,
        issues: &'a [Issue],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            snapshot,
            issues,
            started_at,
            finished_at,
            tool: Tool::current(),
            mode: ScanMode::Auto,
            effective_mode: ScanMode::Auto,
            timeout_seconds: 0,
            api_version: snapshot.daemon.api_version.clone(),
            capabilities: Capabilities { docker_api: true, ..Default::default() },
            collectors: Vec::new(),
            errors: Vec::new(),
            scan_id: None,
        }
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    pub fn mode(mut self, requested: ScanMode, effective: ScanMode) -> Self {
        self.mode = requested;
        self.effective_mode = effective;
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// The API version the scan was configured with, when it should win
    /// over what the daemon reported.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn collectors(mut self, collectors: Vec<Collector>) -> Self {
        self.collectors = collectors;
        self
    }

    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Fixed scan id, for reproducible output.
    pub fn scan_id(mut self, id: impl Into<String>) -> Self {
        self.scan_id = Some(id.into());
        self
    }

    pub fn build(self) -> Report {
        let snapshot = self.snapshot;

        let mut findings: Vec<Finding> = self.issues.iter().map(finding_from_issue).collect();
        // Same key as the issue order: rank, rule id, then fingerprint (which
        // orders like the subject within one rule).
        findings.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        });

        let mut finding_counts = FindingCounts::default();
        for f in &findings {
            finding_counts.add(f.severity);
        }

        let running = snapshot.containers.iter().filter(|c| c.is_running()).count();

        let mut collectors = self.collectors;
        collectors.sort_by(|a, b| a.name.cmp(&b.name));

        let duration_ms = (self.finished_at - self.started_at).num_milliseconds();
        let scan_id = self.scan_id.unwrap_or_else(|| new_scan_id(self.finished_at));

        Report {
            schema_version: SCHEMA_VERSION.to_string(),
            tool: self.tool,
            scan: Scan {
                scan_id,
                started_at: self.started_at,
                finished_at: self.finished_at,
                duration_ms,
                mode: self.mode.as_str().to_string(),
                effective_mode: self.effective_mode.as_str().to_string(),
                timeout_seconds: self.timeout_seconds,
                capabilities: self.capabilities,
                redaction: Redaction::default(),
            },
            target: Target {
                host: TargetHost {
                    host_id: snapshot.host.host_id.clone(),
                    hostname: snapshot.host.hostname.clone(),
                    os: snapshot.host.os.clone(),
                    arch: snapshot.host.arch.clone(),
                    kernel: snapshot.host.kernel.clone(),
                    uptime_seconds: snapshot.host.uptime_seconds,
                },
                docker: TargetDocker {
                    engine_version: snapshot.daemon.version.clone(),
                    api_version: self.api_version,
                    storage_driver: snapshot.daemon.storage_driver().to_string(),
                    cgroup_version: snapshot.daemon.cgroup_version.clone(),
                    data_root: snapshot.daemon.data_root.clone(),
                },
            },
            collectors,
            summary: Summary {
                counts: SummaryCounts {
                    containers_running: running,
                    containers_stopped: snapshot.containers.len() - running,
                    images: snapshot.images.list.len(),
                    volumes: snapshot.volumes.len(),
                    networks: snapshot.networks.len(),
                },
                resource_snapshot: ResourceSnapshot { docker_system_df: system_df_of(snapshot) },
                finding_counts,
            },
            findings,
            errors: self.errors,
            raw: Raw::default(),
        }
    }
}

/// Deduplicated totals, with the naive image sum standing in when `system df`
/// was unavailable or reported zero image bytes.
fn system_df_of(snapshot: &FactSnapshot) -> DockerSystemDf {
    let mut df = snapshot
        .system_df
        .map(|s| DockerSystemDf {
            images_total_bytes: s.images_total_bytes,
            containers_writable_total_bytes: s.containers_writable_total_bytes,
            volumes_total_bytes: s.volumes_total_bytes,
            build_cache_total_bytes: s.build_cache_total_bytes,
        })
        .unwrap_or_default();
    if df.images_total_bytes == 0 {
        df.images_total_bytes = snapshot.images.total_size;
    }
    df
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{ContainerFacts, ImageFacts, ImageInfo, SystemDfSummary};
    use crate::rules::Severity;
    use chrono::{Duration, TimeZone};

    fn times() -> (DateTime<Utc>, DateTime<Utc>) {
        let finished = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        (finished - Duration::milliseconds(1500), finished)
    }

    fn container(status: &str) -> ContainerFacts {
        ContainerFacts { id: "x".into(), name: "x".into(), status: status.into(), ..Default::default() }
    }

    #[test]
    fn test_scan_id_shape() {
        let (_, finished) = times();
        let id = new_scan_id(finished);
        let (stamp, suffix) = id.split_once('-').unwrap();
        assert_eq!(stamp, "20240305T140709Z");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_counts_and_fallback_df() {
        let (started, finished) = times();
        let mut snapshot = FactSnapshot::empty(finished);
        snapshot.containers = vec![container("Up 2 hours"), container("up"), container("Exited (1)")];
        snapshot.images = ImageFacts::from_list(vec![ImageInfo { id: "a".into(), size: 77 }]);
        snapshot.system_df = Some(SystemDfSummary { build_cache_total_bytes: 5, ..Default::default() });

        let issues = vec![
            Issue::new("RESTART_LOOP", "container=x", Severity::High, "restarts", "r"),
            Issue::new("VOLUME_BLOAT", "", Severity::Low, "storage_bloat", "v"),
        ];
        let report = ReportBuilder::new(&snapshot, &issues, started, finished).build();

        assert_eq!(report.schema_version, "1.0");
        assert_eq!(report.scan.duration_ms, 1500);
        assert_eq!(report.summary.counts.containers_running, 2);
        assert_eq!(report.summary.counts.containers_stopped, 1);
        let df = report.summary.resource_snapshot.docker_system_df;
        assert_eq!(df.images_total_bytes, 77);
        assert_eq!(df.build_cache_total_bytes, 5);
        assert_eq!(report.summary.finding_counts, FindingCounts { critical: 1, warning: 0, info: 1 });
        assert_eq!(report.findings[1].fingerprint, "VOLUME_BLOAT:global");
        assert_eq!(report.raw.reason, "privacy_and_size");
    }

    #[test]
    fn test_collectors_sorted_by_name() {
        let (started, finished) = times();
        let snapshot = FactSnapshot::empty(finished);
        let run = |name: &str| Collector {
            name: name.to_string(),
            status: CollectorStatus::Ok,
            duration_ms: 0,
            errors: Vec::new(),
        };
        let report = ReportBuilder::new(&snapshot, &[], started, finished)
            .collectors(vec![run("host_fs"), run("docker_engine"), run("docker_system_df")])
            .scan_id("fixed")
            .build();

        let names: Vec<&str> = report.collectors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["docker_engine", "docker_system_df", "host_fs"]);
        assert_eq!(report.scan.scan_id, "fixed");
    }

    #[test]
    fn test_top_level_keys() {
        let (started, finished) = times();
        let snapshot = FactSnapshot::empty(finished);
        let report = ReportBuilder::new(&snapshot, &[], started, finished).build();
        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "schemaVersion",
            "tool",
            "scan",
            "target",
            "collectors",
            "summary",
            "findings",
            "errors",
            "raw",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["scan"]["redaction"]["maskedIPs"], false);
        assert_eq!(json["scan"]["capabilities"]["dockerApi"], true);
    }
}
