use super::docker::{str_val, DockerCli};
use crate::facts::NetworkFacts;
use crate::utils::Result;
use serde_json::Value;

pub fn collect(cli: &DockerCli) -> Result<Vec<NetworkFacts>> {
    let ids = cli.lines(&["network", "ls", "-q", "--no-trunc"])?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut args = vec!["network", "inspect"];
    args.extend(ids.iter().map(String::as_str));
    Ok(networks_from_inspect(&cli.json(&args)?))
}

/// Name and first IPAM subnet, ordered by name.
fn networks_from_inspect(arr: &Value) -> Vec<NetworkFacts> {
    let mut nets: Vec<NetworkFacts> = arr
        .as_array()
        .map(|a| {
            a.iter()
                .map(|n| NetworkFacts {
                    name: str_val(n, &["Name"]),
                    cidr: n["IPAM"]["Config"]
                        .as_array()
                        .and_then(|c| c.first())
                        .and_then(|c| c["Subnet"].as_str())
                        .unwrap_or("")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    nets.sort_by(|a, b| a.name.cmp(&b.name));
    nets
}
