use crate::block_category::{BlockCategory, ListKind};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Replacement URLs for one category's lists.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceOverride {
    pub hostnames: Option<String>,
    pub ips: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    #[serde(default = "default_true")]
    pub block_malicious: bool,

    #[serde(default)]
    pub block_ads: bool,

    #[serde(default)]
    pub block_surveillance: bool,

    /// Block answers pointing into private address space
    #[serde(default = "default_true")]
    pub rebinding_protection: bool,

    /// Never blocked, together with all their subdomains
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    #[serde(default)]
    pub blocked_hosts: Vec<String>,

    #[serde(default)]
    pub blocked_ips: Vec<String>,

    #[serde(default)]
    pub blocked_ip_prefixes: Vec<String>,

    #[serde(default)]
    pub sources: BTreeMap<BlockCategory, SourceOverride>,
}

impl BlockingConfig {
    pub fn enabled_categories(&self) -> Vec<BlockCategory> {
        BlockCategory::ALL
            .into_iter()
            .filter(|category| match category {
                BlockCategory::Malicious => self.block_malicious,
                BlockCategory::Ads => self.block_ads,
                BlockCategory::Surveillance => self.block_surveillance,
            })
            .collect()
    }

    pub fn source_url(&self, category: BlockCategory, kind: ListKind) -> String {
        let custom = self.sources.get(&category).and_then(|o| match kind {
            ListKind::Hostnames => o.hostnames.clone(),
            ListKind::Ips => o.ips.clone(),
        });
        custom.unwrap_or_else(|| category.default_source(kind))
    }

    pub fn parsed_blocked_ips(&self) -> Result<Vec<IpAddr>, String> {
        self.blocked_ips
            .iter()
            .map(|ip| {
                ip.trim()
                    .parse::<IpAddr>()
                    .map_err(|e| format!("Invalid blocked IP '{}': {}", ip, e))
            })
            .collect()
    }

    pub fn parsed_blocked_prefixes(&self) -> Result<Vec<IpNetwork>, String> {
        self.blocked_ip_prefixes
            .iter()
            .map(|prefix| {
                prefix
                    .trim()
                    .parse::<IpNetwork>()
                    .map_err(|e| format!("Invalid blocked IP prefix '{}': {}", prefix, e))
            })
            .collect()
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            block_malicious: true,
            block_ads: false,
            block_surveillance: false,
            rebinding_protection: true,
            allowed_hosts: vec![],
            blocked_hosts: vec![],
            blocked_ips: vec![],
            blocked_ip_prefixes: vec![],
            sources: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
