use crate::fqdn::parent_domains;
use ipnetwork::IpNetwork;
use std::collections::HashSet;
use std::net::IpAddr;

/// Private, loopback and link-local ranges blocked in answers when
/// rebinding protection is enabled.
const REBINDING_PREFIXES: &[&str] = &[
    "127.0.0.0/8",
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
    "::ffff:127.0.0.1/104",
    "::ffff:10.0.0.0/104",
    "::ffff:169.254.0.0/112",
    "::ffff:172.16.0.0/108",
    "::ffff:192.168.0.0/112",
];

pub fn rebinding_prefixes() -> Vec<IpNetwork> {
    REBINDING_PREFIXES
        .iter()
        .filter_map(|prefix| prefix.parse().ok())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedAddress {
    Ip(IpAddr),
    Prefix(IpNetwork),
}

/// Parses one block-list line as a bare address or a CIDR prefix.
pub fn parse_blocked_address(line: &str) -> Option<BlockedAddress> {
    let line = line.trim();
    if line.contains('/') {
        line.parse::<IpNetwork>().ok().map(BlockedAddress::Prefix)
    } else {
        line.parse::<IpAddr>().ok().map(BlockedAddress::Ip)
    }
}

/// Merged, deduplicated and sorted block data produced by one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockLists {
    pub hostnames: Vec<String>,
    pub ips: Vec<IpAddr>,
    pub prefixes: Vec<IpNetwork>,
}

impl BlockLists {
    pub fn normalize(&mut self) {
        self.hostnames.sort();
        self.hostnames.dedup();
        self.ips.sort();
        self.ips.dedup();
        self.prefixes.sort_by_key(|net| (net.ip(), net.prefix()));
        self.prefixes.dedup();
    }
}

/// Immutable matching view over one `BlockLists`.
#[derive(Debug, Clone, Default)]
pub struct FilterSnapshot {
    hostnames: HashSet<String>,
    ips: HashSet<IpAddr>,
    prefixes: Vec<IpNetwork>,
}

impl FilterSnapshot {
    pub fn hostname_count(&self) -> usize {
        self.hostnames.len()
    }

    pub fn ip_count(&self) -> usize {
        self.ips.len()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    /// `fqdn` must be canonical. Checks the name then every parent.
    pub fn is_hostname_blocked(&self, fqdn: &str) -> bool {
        parent_domains(fqdn).any(|candidate| self.hostnames.contains(candidate))
    }

    pub fn is_address_blocked(&self, ip: IpAddr) -> bool {
        self.ips.contains(&ip) || self.prefixes.iter().any(|net| net.contains(ip))
    }
}

impl From<BlockLists> for FilterSnapshot {
    fn from(lists: BlockLists) -> Self {
        Self {
            hostnames: lists.hostnames.into_iter().collect(),
            ips: lists.ips.into_iter().collect(),
            prefixes: lists.prefixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(hostnames: &[&str], ips: &[&str], prefixes: &[&str]) -> FilterSnapshot {
        FilterSnapshot::from(BlockLists {
            hostnames: hostnames.iter().map(|h| h.to_string()).collect(),
            ips: ips.iter().map(|ip| ip.parse().unwrap()).collect(),
            prefixes: prefixes.iter().map(|p| p.parse().unwrap()).collect(),
        })
    }

    #[test]
    fn test_blocked_hostname_covers_subdomains() {
        let snap = snapshot(&["example.com."], &[], &[]);
        assert!(snap.is_hostname_blocked("example.com."));
        assert!(snap.is_hostname_blocked("sub.example.com."));
        assert!(snap.is_hostname_blocked("a.b.example.com."));
        assert!(!snap.is_hostname_blocked("notexample.com."));
        assert!(!snap.is_hostname_blocked("example.com.evil.org."));
    }

    #[test]
    fn test_root_is_never_blocked() {
        let snap = snapshot(&["."], &[], &[]);
        assert!(!snap.is_hostname_blocked("."));
    }

    #[test]
    fn test_address_in_set_or_prefix() {
        let snap = snapshot(&[], &["1.2.3.4"], &["10.0.0.0/8", "::1/128"]);
        assert!(snap.is_address_blocked("1.2.3.4".parse().unwrap()));
        assert!(snap.is_address_blocked("10.20.30.40".parse().unwrap()));
        assert!(snap.is_address_blocked("::1".parse().unwrap()));
        assert!(!snap.is_address_blocked("1.2.3.5".parse().unwrap()));
    }

    #[test]
    fn test_parse_blocked_address() {
        assert_eq!(
            parse_blocked_address("1.2.3.4"),
            Some(BlockedAddress::Ip("1.2.3.4".parse().unwrap()))
        );
        assert_eq!(
            parse_blocked_address("192.168.0.0/16"),
            Some(BlockedAddress::Prefix("192.168.0.0/16".parse().unwrap()))
        );
        assert_eq!(parse_blocked_address("not-an-ip"), None);
        assert_eq!(parse_blocked_address("10.0.0.0/99"), None);
    }

    #[test]
    fn test_rebinding_table_parses_completely() {
        let prefixes = rebinding_prefixes();
        assert_eq!(prefixes.len(), REBINDING_PREFIXES.len());
        assert!(prefixes.contains(&"::ffff:127.0.0.1/104".parse().unwrap()));
    }

    #[test]
    fn test_normalize_sorts_and_dedupes() {
        let mut lists = BlockLists {
            hostnames: vec!["b.".into(), "a.".into(), "b.".into()],
            ips: vec!["2.2.2.2".parse().unwrap(), "1.1.1.1".parse().unwrap()],
            prefixes: vec![
                "10.0.0.0/8".parse().unwrap(),
                "10.0.0.0/8".parse().unwrap(),
            ],
        };
        lists.normalize();
        assert_eq!(lists.hostnames, vec!["a.", "b."]);
        assert_eq!(lists.ips[0], "1.1.1.1".parse::<IpAddr>().unwrap());
        assert_eq!(lists.prefixes.len(), 1);
    }
}
