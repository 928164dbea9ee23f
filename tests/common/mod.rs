#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use docker_doctor::facts::*;
use serde_json::json;

pub fn empty() -> FactSnapshot {
    FactSnapshot::empty(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

pub fn container(id: &str, name: &str, status: &str) -> ContainerFacts {
    ContainerFacts {
        id: id.to_string(),
        name: name.to_string(),
        status: status.to_string(),
        ..Default::default()
    }
}

pub fn disk(pct: f64) -> DiskUsage {
    DiskUsage { used: (pct * 10.0) as u64, total: 1000, used_percent: pct }
}

/// A host with something wrong in every area.
pub fn troubled_host() -> FactSnapshot {
    let mut s = empty();
    let now = s.collected_at;

    s.host.hostname = "node-1".into();
    s.host.disk_usage.insert("/".into(), disk(85.0));
    s.host.disk_usage.insert("/var/lib/docker".into(), disk(95.0));

    s.daemon.version = "24.0.7".into();
    s.daemon.info.insert("experimental".into(), json!(true));
    s.daemon.info.insert("logging_driver".into(), json!("none"));

    let mut looping = container("aaaaaaaaaaaa", "api", "Restarting (1) 5 seconds ago");
    looping.restart_count = 12;
    let mut oom = container("bbbbbbbbbbbb", "worker", "Exited (137) 1 hour ago");
    oom.oom_killed = true;
    let mut sick = container("cccccccccccc", "web", "Up 3 hours (unhealthy)");
    sick.health = HealthStatus::Unhealthy;
    sick.unhealthy_since = Some(now - Duration::hours(2));
    let mut chatty = container("dddddddddddd", "logger", "Up 3 days");
    chatty.log_size = 500 * 1024 * 1024;
    s.containers = vec![looping, oom, sick, chatty];

    s.images = ImageFacts::from_list(vec![
        ImageInfo { id: "img-big".into(), size: 9 * 1024 * 1024 * 1024 },
        ImageInfo { id: "img-small".into(), size: 3 * 1024 * 1024 * 1024 },
    ]);

    s.volumes = vec![
        VolumeFacts { name: "orphan".into(), size: 10, size_available: true, used: false },
        VolumeFacts { name: "pgdata".into(), size: 6 * 1024 * 1024 * 1024, size_available: true, used: true },
    ];

    s.networks = vec![
        NetworkFacts { name: "bridge".into(), cidr: "172.17.0.0/16".into() },
        NetworkFacts { name: "app".into(), cidr: "172.17.1.0/24".into() },
    ];

    s
}
