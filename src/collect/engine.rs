//! Docker 引擎层信息收集
//! 来源：docker version, docker info

use super::docker::{str_val, DockerCli};
use crate::facts::DaemonFacts;
use crate::utils::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const DEFAULT_DATA_ROOT: &str = "/var/lib/docker";

pub fn collect(cli: &DockerCli) -> Result<DaemonFacts> {
    let version = cli.json(&["version", "--format", "{{json .}}"])?;
    let info = cli.json(&["info", "--format", "{{json .}}"])?;
    Ok(daemon_from_json(&version, &info))
}

pub fn daemon_from_json(version: &Value, info: &Value) -> DaemonFacts {
    let mut bag = BTreeMap::new();
    bag.insert("server_version".to_string(), json!(str_val(info, &["ServerVersion"])));
    bag.insert("os".to_string(), json!(str_val(info, &["OSType"])));
    bag.insert("arch".to_string(), json!(str_val(info, &["Architecture"])));
    bag.insert("storage_driver".to_string(), json!(str_val(info, &["Driver"])));
    bag.insert("logging_driver".to_string(), json!(str_val(info, &["LoggingDriver"])));
    bag.insert(
        "experimental".to_string(),
        json!(info["ExperimentalBuild"].as_bool().unwrap_or(false)),
    );
    bag.insert("registry_config".to_string(), info["RegistryConfig"].clone());

    let data_root = match str_val(info, &["DockerRootDir"]) {
        s if s.is_empty() => DEFAULT_DATA_ROOT.to_string(),
        s => s,
    };
    let cgroup_version = str_val(info, &["CgroupVersion"]);

    DaemonFacts {
        version: str_val(version, &["Server", "Version"]),
        api_version: str_val(version, &["Server", "ApiVersion"]),
        cgroup_version,
        data_root,
        info: bag,
    }
}
