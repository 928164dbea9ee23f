//! Scan and rule configuration loaded from YAML (`doctor.yml`).

use crate::utils::{DoctorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "doctor.yml";

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub rules: RuleConfig,
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DoctorError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        let cfg = Self::from_yaml(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse without validating.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| DoctorError::Config(format!("failed to parse config file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.rules.validate()
    }

    /// `DOCKER_HOST` and `DOCKER_API_VERSION` take precedence over the file.
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("DOCKER_HOST") {
            if !val.trim().is_empty() {
                self.scan.docker_host = val;
            }
        }
        if let Ok(val) = std::env::var("DOCKER_API_VERSION") {
            if !val.trim().is_empty() {
                self.scan.version = val;
            }
        }
        self
    }
}

// ── Scan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Use the host filesystem when it is readable.
    #[default]
    Auto,
    /// Docker API only.
    Basic,
    /// Docker API plus host filesystem.
    Full,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Auto => "auto",
            ScanMode::Basic => "basic",
            ScanMode::Full => "full",
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Overall scan timeout in seconds.
    pub timeout: u64,
    pub docker_host: String,
    /// Docker API version.
    pub version: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Auto,
            timeout: 30,
            docker_host: "unix:///var/run/docker.sock".to_string(),
            version: "1.41".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(DoctorError::Config("timeout must be greater than 0".to_string()));
        }
        if self.docker_host.trim().is_empty() {
            return Err(DoctorError::Config("dockerHost cannot be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(DoctorError::Config("version cannot be empty".to_string()));
        }
        Ok(())
    }
}

// ── Rules ───────────────────────────────────────────────────────────────────

/// Per-rule thresholds and switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub disk_usage: DiskUsageRule,
    pub storage_bloat: StorageBloatRule,
    pub restarts: RestartsRule,
    pub oom: ToggleRule,
    pub healthcheck: ToggleRule,
    pub log_bloat: LogBloatRule,
    pub volume_size: VolumeSizeRule,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.disk_usage.threshold > 100 {
            return Err(DoctorError::Config(format!(
                "disk_usage threshold must be between 0 and 100, got {}",
                self.disk_usage.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskUsageRule {
    /// percent (0-100)
    pub threshold: u32,
}

impl Default for DiskUsageRule {
    fn default() -> Self {
        Self { threshold: 80 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageBloatRule {
    /// bytes
    pub image_size_threshold: u64,
}

impl Default for StorageBloatRule {
    fn default() -> Self {
        Self { image_size_threshold: 10 * GIB }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartsRule {
    pub threshold: u32,
}

impl Default for RestartsRule {
    fn default() -> Self {
        Self { threshold: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleRule {
    pub enabled: bool,
}

impl Default for ToggleRule {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogBloatRule {
    pub enabled: bool,
    /// bytes
    pub size_threshold: u64,
}

impl Default for LogBloatRule {
    fn default() -> Self {
        Self { enabled: true, size_threshold: 100 * MIB }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSizeRule {
    pub enabled: bool,
    /// bytes
    pub size_threshold: u64,
}

impl Default for VolumeSizeRule {
    fn default() -> Self {
        Self { enabled: true, size_threshold: 5 * GIB }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.scan.mode, ScanMode::Auto);
        assert_eq!(cfg.rules.disk_usage.threshold, 80);
        assert!(cfg.rules.oom.enabled);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml(
            r#"
scan:
  mode: basic
  dockerHost: tcp://10.0.0.5:2375
rules:
  disk_usage:
    threshold: 70
  oom:
    enabled: false
"#,
        )
        .unwrap();

        assert_eq!(cfg.scan.mode, ScanMode::Basic);
        assert_eq!(cfg.scan.docker_host, "tcp://10.0.0.5:2375");
        assert_eq!(cfg.scan.timeout, 30);
        assert_eq!(cfg.rules.disk_usage.threshold, 70);
        assert!(!cfg.rules.oom.enabled);
        assert!(cfg.rules.healthcheck.enabled);
        assert_eq!(cfg.rules.log_bloat.size_threshold, 100 * MIB);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::from_yaml("scan:\n  mode: turbo\n").unwrap_err();
        assert!(matches!(err, DoctorError::Config(_)));
    }

    #[test]
    fn test_validation_failures() {
        let mut cfg = Config::default();
        cfg.scan.timeout = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.scan.docker_host = "  ".into();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.scan.version = String::new();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.rules.disk_usage.threshold = 101;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scan:\n  timeout: 45\nrules:\n  restarts:\n    threshold: 7").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.scan.timeout, 45);
        assert_eq!(cfg.rules.restarts.threshold, 7);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/doctor.yml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
