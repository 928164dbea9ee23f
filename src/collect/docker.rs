//! `docker` CLI runner bound to one scan deadline.

use crate::config::ScanConfig;
use crate::utils::{DoctorError, Result};
use serde_json::Value;
use std::process::Command;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DockerCli {
    host: String,
    api_version: String,
    deadline: Instant,
    timeout_secs: u64,
}

impl DockerCli {
    /// The deadline starts now and lasts `scan.timeout` seconds.
    pub fn new(scan: &ScanConfig) -> Self {
        Self {
            host: scan.docker_host.clone(),
            api_version: scan.version.clone(),
            deadline: Instant::now() + Duration::from_secs(scan.timeout),
            timeout_secs: scan.timeout,
        }
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn remaining(&self) -> Result<Duration> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            Err(DoctorError::Timeout(self.timeout_secs))
        } else {
            Ok(left)
        }
    }

    /// Run `docker <args>` and return stdout.
    ///
    /// The command runs on a helper thread; when the deadline passes first
    /// the child is abandoned and `Timeout` is returned.
    pub fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let left = self.remaining()?;
        let started = Instant::now();

        let mut cmd = Command::new("docker");
        cmd.args(args)
            .env("DOCKER_HOST", &self.host)
            .env("DOCKER_API_VERSION", &self.api_version);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(cmd.output());
        });

        let out = match rx.recv_timeout(left) {
            Ok(res) => res.map_err(|e| {
                DoctorError::Docker(format!("failed to run docker {}: {}", args.join(" "), e))
            })?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(DoctorError::Timeout(self.timeout_secs))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(DoctorError::System("docker runner thread exited".to_string()))
            }
        };

        debug!(cmd = %args.join(" "), elapsed_ms = started.elapsed().as_millis() as u64, "docker");

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(DoctorError::Docker(format!(
                "docker {} failed: {}",
                args.first().copied().unwrap_or(""),
                stderr.trim()
            )));
        }
        Ok(out.stdout)
    }

    /// One JSON document on stdout (`inspect`, `--format '{{json .}}'` on a single object).
    pub fn json(&self, args: &[&str]) -> Result<Value> {
        let out = self.run(args)?;
        serde_json::from_slice(&out)
            .map_err(|e| DoctorError::Parse(format!("docker {} JSON: {}", args.join(" "), e)))
    }

    /// One JSON object per line (`ls --format '{{json .}}'`).
    pub fn json_lines(&self, args: &[&str]) -> Result<Vec<Value>> {
        let out = self.run(args)?;
        parse_json_lines(&String::from_utf8_lossy(&out))
    }

    /// Plain lines, trimmed, empties dropped.
    pub fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        let out = self.run(args)?;
        Ok(String::from_utf8_lossy(&out)
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }
}

pub fn parse_json_lines(s: &str) -> Result<Vec<Value>> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).map_err(|e| DoctorError::Parse(format!("JSON line: {}", e))))
        .collect()
}

// ── 工具 ────────────────────────────────────────────────────────────────────

pub fn str_val(v: &Value, path: &[&str]) -> String {
    let mut cur = v;
    for key in path {
        cur = &cur[key];
    }
    cur.as_str().unwrap_or("").to_string()
}

/// `sha256:abcdef…` → `abcdef123456`
pub fn short_id(id: &str) -> String {
    id.trim_start_matches("sha256:").chars().take(12).collect()
}
