use super::{ids, Issue, Severity};
use crate::config::RuleConfig;
use crate::facts::FactSnapshot;
use std::net::IpAddr;

/// An IP network: base address masked to its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cidr {
    base: IpAddr,
    prefix: u8,
}

impl Cidr {
    fn parse(s: &str) -> Option<Self> {
        let (addr, prefix) = s.trim().split_once('/')?;
        let addr: IpAddr = addr.parse().ok()?;
        let prefix: u8 = prefix.parse().ok()?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return None;
        }
        Some(Self { base: mask(addr, prefix), prefix })
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self.base, ip) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(ip, self.prefix) == self.base
            }
            _ => false,
        }
    }
}

fn mask(ip: IpAddr, prefix: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let m = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V4((bits & m).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let m = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            IpAddr::V6((bits & m).into())
        }
    }
}

/// True when the two networks share any address. Empty or unparsable
/// strings never overlap anything.
pub fn cidrs_overlap(a: &str, b: &str) -> bool {
    let (Some(n1), Some(n2)) = (Cidr::parse(a), Cidr::parse(b)) else {
        return false;
    };
    n1.base == n2.base || n1.contains(n2.base) || n2.contains(n1.base)
}

/// NETWORK_OVERLAP: every unordered pair compared once, one aggregate issue.
pub fn check_network_overlap(snapshot: &FactSnapshot, _config: &RuleConfig) -> Vec<Issue> {
    let networks = &snapshot.networks;

    let mut overlapping = Vec::new();
    for (i, n1) in networks.iter().enumerate() {
        for n2 in &networks[i + 1..] {
            if cidrs_overlap(&n1.cidr, &n2.cidr) {
                overlapping.push(format!("{} ({}) and {} ({})", n1.name, n1.cidr, n2.name, n2.cidr));
            }
        }
    }

    if overlapping.is_empty() {
        return Vec::new();
    }

    vec![Issue::new(
        ids::NETWORK_OVERLAP,
        "",
        Severity::High,
        "networking",
        format!(
            "Found {} overlapping Docker network CIDRs that may cause connectivity issues",
            overlapping.len()
        ),
    )
    .fact("total_networks", networks.len())
    .fact("overlapping_networks", overlapping)
    .solutions([
        "Review and reconfigure overlapping network subnets",
        "Use non-overlapping CIDR ranges for Docker networks",
        "Remove unnecessary networks: 'docker network rm <network_name>'",
        "Recreate networks with proper subnets: 'docker network create --subnet <cidr> <name>'",
        "Check network configurations in docker-compose files",
    ])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::NetworkFacts;
    use chrono::Utc;

    fn net(name: &str, cidr: &str) -> NetworkFacts {
        NetworkFacts { name: name.to_string(), cidr: cidr.to_string() }
    }

    #[test]
    fn test_overlap_cases() {
        assert!(cidrs_overlap("192.168.1.0/24", "192.168.1.0/25"));
        assert!(cidrs_overlap("192.168.1.128/25", "192.168.1.0/24"));
        assert!(cidrs_overlap("172.17.0.0/16", "172.17.5.0/24"));
        assert!(!cidrs_overlap("10.0.0.0/8", "192.168.0.0/16"));
        assert!(!cidrs_overlap("172.17.0.0/16", "172.18.0.0/16"));
    }

    #[test]
    fn test_unparsable_never_overlaps() {
        assert!(!cidrs_overlap("", "10.0.0.0/8"));
        assert!(!cidrs_overlap("10.0.0.0/8", "garbage"));
        assert!(!cidrs_overlap("10.0.0.0/33", "10.0.0.0/8"));
        assert!(!cidrs_overlap("10.0.0.0", "10.0.0.0/8"));
    }

    #[test]
    fn test_ipv6_and_mixed_families() {
        assert!(cidrs_overlap("fd00::/8", "fd00:1::/64"));
        assert!(!cidrs_overlap("fd00::/8", "fe80::/10"));
        assert!(!cidrs_overlap("::/0", "0.0.0.0/0"));
    }

    #[test]
    fn test_host_bits_are_masked() {
        assert!(cidrs_overlap("10.1.2.3/16", "10.1.0.0/16"));
    }

    #[test]
    fn test_pairs_checked_once() {
        let mut snapshot = FactSnapshot::empty(Utc::now());
        snapshot.networks = vec![
            net("a", "10.0.0.0/8"),
            net("b", "10.1.0.0/16"),
            net("c", "192.168.0.0/16"),
            net("host", ""),
        ];

        let issues = check_network_overlap(&snapshot, &RuleConfig::default());
        assert_eq!(issues.len(), 1);
        let pairs = issues[0].facts["overlapping_networks"].as_array().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], "a (10.0.0.0/8) and b (10.1.0.0/16)");
        assert_eq!(issues[0].facts["total_networks"], 4);
    }
}
