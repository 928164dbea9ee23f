//! 输出层：接收 ReportDocument，渲染 text 或 json

use crate::rules::Issue;
use crate::schema::v1::{Finding, Report};
use crate::schema::{LegacyReport, ReportDocument};
use crate::utils::format::{format_uptime, human_bytes};
use crate::utils::Result;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render(doc: &ReportDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => doc.to_json_pretty(),
        OutputFormat::Text => Ok(match doc {
            ReportDocument::V1(r) => render_v1(r),
            ReportDocument::Legacy(r) => render_legacy(r),
        }),
    }
}

pub fn display(doc: &ReportDocument, format: OutputFormat) -> Result<()> {
    println!("{}", render(doc, format)?);
    Ok(())
}

// ── v1 ──────────────────────────────────────────────────────────────────────

fn render_v1(r: &Report) -> String {
    let mut out = String::new();

    section(&mut out, "SCAN");
    line(&mut out, "Scan ID", &r.scan.scan_id);
    line(&mut out, "Finished", &r.scan.finished_at.to_rfc3339());
    line(&mut out, "Duration", &format!("{}ms", r.scan.duration_ms));
    line(&mut out, "Mode", &format!("{} (effective {})", r.scan.mode, r.scan.effective_mode));
    line(&mut out, "Tool", &format!("{} {}", r.tool.name, r.tool.version));

    section(&mut out, "HOST");
    let h = &r.target.host;
    line(&mut out, "Hostname", &h.hostname);
    line(&mut out, "OS/Arch", &format!("{}/{}", h.os, h.arch));
    line(&mut out, "Kernel", &h.kernel);
    line(&mut out, "Uptime", &format_uptime(h.uptime_seconds));

    section(&mut out, "DOCKER ENGINE");
    let d = &r.target.docker;
    line(&mut out, "Version", &d.engine_version);
    line(&mut out, "API version", &d.api_version);
    line(&mut out, "Storage drv", &d.storage_driver);
    line(&mut out, "cgroup ver", &d.cgroup_version);
    line(&mut out, "Root dir", &d.data_root);

    section(&mut out, "SUMMARY");
    let c = &r.summary.counts;
    line(
        &mut out,
        "Containers",
        &format!("{} running  {} stopped", c.containers_running, c.containers_stopped),
    );
    line(&mut out, "Images", &c.images.to_string());
    line(&mut out, "Volumes", &c.volumes.to_string());
    line(&mut out, "Networks", &c.networks.to_string());
    let df = &r.summary.resource_snapshot.docker_system_df;
    line(&mut out, "Image bytes", &human_bytes(df.images_total_bytes));
    line(&mut out, "Build cache", &human_bytes(df.build_cache_total_bytes));
    let fc = &r.summary.finding_counts;
    line(
        &mut out,
        "Findings",
        &format!("{} critical  {} warning  {} info", fc.critical, fc.warning, fc.info),
    );

    section(&mut out, "COLLECTORS");
    for col in &r.collectors {
        let _ = write!(out, "  {:<18} {:<8} {:>6}ms", col.name, col.status.as_str(), col.duration_ms);
        if !col.errors.is_empty() {
            let _ = write!(out, "  {}", col.errors.join("; "));
        }
        out.push('\n');
    }

    section(&mut out, &format!("FINDINGS ({})", r.findings.len()));
    if r.findings.is_empty() {
        out.push_str("  No issues found.\n");
    }
    for f in &r.findings {
        render_finding(&mut out, f);
    }

    out
}

fn render_finding(out: &mut String, f: &Finding) {
    let _ = writeln!(
        out,
        "\n  [{}] {}  ({}, confidence {})",
        f.severity.as_str().to_uppercase(),
        f.title,
        f.fingerprint,
        f.confidence.as_str()
    );
    let _ = writeln!(out, "    {}", f.summary);

    let s = &f.scope;
    if !s.container_id.is_empty() {
        let _ = writeln!(out, "    container: {} {}", s.container_id, s.container_name);
    }
    if !s.path.is_empty() {
        let _ = writeln!(out, "    path: {}", s.path);
    }

    for rec in &f.recommendations {
        for step in &rec.steps {
            let _ = writeln!(out, "    - {}", step);
        }
        for cmd in &rec.commands {
            let _ = writeln!(out, "    $ {}", cmd);
        }
        for note in &rec.notes {
            let _ = writeln!(out, "    ~ {}", note);
        }
    }
}

// ── legacy ──────────────────────────────────────────────────────────────────

fn render_legacy(r: &LegacyReport) -> String {
    let mut out = String::new();
    let s = &r.snapshot;

    section(&mut out, "REPORT");
    line(&mut out, "Collected at", &r.timestamp.to_rfc3339());

    section(&mut out, "HOST");
    line(&mut out, "Hostname", &s.host.hostname);
    line(&mut out, "Kernel", &s.host.kernel);
    line(&mut out, "Uptime", &format_uptime(s.host.uptime_seconds));
    for (path, d) in &s.host.disk_usage {
        let _ = writeln!(
            out,
            "    {:<20} {:.1}% used  ({} / {})",
            path,
            d.used_percent,
            human_bytes(d.used),
            human_bytes(d.total)
        );
    }

    section(&mut out, "DOCKER ENGINE");
    line(&mut out, "Version", &s.daemon.version);
    line(&mut out, "Storage drv", s.daemon.storage_driver());

    section(&mut out, &format!("CONTAINERS ({})", s.containers.len()));
    for c in &s.containers {
        let icon = if c.is_running() { "●" } else { "○" };
        let _ = writeln!(
            out,
            "  {} {:<24} {:<12} {}  restarts={} health={}",
            icon, c.name, c.id, c.status, c.restart_count, c.health
        );
    }

    line(&mut out, "Images", &format!("{} ({})", s.images.list.len(), human_bytes(s.images.total_size)));
    line(&mut out, "Volumes", &s.volumes.len().to_string());
    line(&mut out, "Networks", &s.networks.len().to_string());

    section(&mut out, &format!("ISSUES ({})", r.issues.len()));
    if r.issues.is_empty() {
        out.push_str("  No issues found.\n");
    }
    for issue in &r.issues {
        render_issue(&mut out, issue);
    }

    out
}

fn render_issue(out: &mut String, issue: &Issue) {
    let _ = writeln!(
        out,
        "\n  [{}] {} {}",
        issue.severity.as_str().to_uppercase(),
        issue.rule_id,
        issue.subject
    );
    let _ = writeln!(out, "    {}", issue.description);
    for sol in &issue.solutions {
        let _ = writeln!(out, "    - {}", sol);
    }
}

// ── 格式化工具 ───────────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "─".repeat(60));
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", "─".repeat(60));
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {:<13}: {}", label, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactSnapshot;
    use crate::rules::Severity;
    use crate::schema::ReportBuilder;
    use chrono::Utc;

    fn issues() -> Vec<Issue> {
        vec![Issue::new("OOM_KILLED", "container=abc", Severity::High, "oom", "killed")
            .fact("container_name", "web")
            .solutions(["Check logs: 'docker logs abc'", "Run 'docker system df'"])]
    }

    #[test]
    fn test_text_v1_lists_findings() {
        let now = Utc::now();
        let snapshot = FactSnapshot::empty(now);
        let issues = issues();
        let report = ReportBuilder::new(&snapshot, &issues, now, now).scan_id("id-1").build();
        let text = render(&ReportDocument::V1(Box::new(report)), OutputFormat::Text).unwrap();

        assert!(text.contains("FINDINGS (1)"));
        assert!(text.contains("[CRITICAL] Container was killed by OOM"));
        assert!(text.contains("OOM_KILLED:container=abc"));
        assert!(text.contains("container: abc web"));
        assert!(text.contains("$ Run 'docker system df'"));
        assert!(text.contains("- Check logs"));
    }

    #[test]
    fn test_text_legacy_and_json() {
        let doc = ReportDocument::Legacy(Box::new(LegacyReport::new(
            FactSnapshot::empty(Utc::now()),
            issues(),
        )));
        let text = render(&doc, OutputFormat::Text).unwrap();
        assert!(text.contains("ISSUES (1)"));
        assert!(text.contains("[HIGH] OOM_KILLED container=abc"));

        let json = render(&doc, OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["issues"][0]["ruleId"], "OOM_KILLED");
    }
}
