//! Merges fetched block lists with user supplied entries into one
//! deterministic `BlockLists`.

use super::fetcher::{BlocklistFetcher, FetchReport, ListSource, SourceError};
use ferrous_relay_domain::{
    parent_domains, parse_blocked_address, rebinding_prefixes, to_fqdn, BlockCategory,
    BlockLists, BlockedAddress, BlockingConfig, DomainError, ListKind,
};
use ipnetwork::IpNetwork;
use rustc_hash::FxHashSet;
use std::net::IpAddr;
use tracing::{debug, info};

/// Block list inputs, validated and canonicalized once.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSettings {
    pub sources: Vec<ListSource>,
    pub allowed_hosts: Vec<String>,
    pub blocked_hosts: Vec<String>,
    pub blocked_ips: Vec<IpAddr>,
    pub blocked_prefixes: Vec<IpNetwork>,
    pub rebinding_protection: bool,
}

impl SnapshotSettings {
    pub fn from_config(config: &BlockingConfig) -> Result<Self, DomainError> {
        let sources = config
            .enabled_categories()
            .into_iter()
            .flat_map(|category: BlockCategory| {
                [ListKind::Hostnames, ListKind::Ips]
                    .into_iter()
                    .map(move |kind| (category, kind))
            })
            .map(|(category, kind)| ListSource {
                category,
                kind,
                url: config.source_url(category, kind),
            })
            .collect();

        Ok(Self {
            sources,
            allowed_hosts: config.allowed_hosts.clone(),
            blocked_hosts: config.blocked_hosts.clone(),
            blocked_ips: config
                .parsed_blocked_ips()
                .map_err(DomainError::ConfigError)?,
            blocked_prefixes: config
                .parsed_blocked_prefixes()
                .map_err(DomainError::ConfigError)?,
            rebinding_protection: config.rebinding_protection,
        })
    }

    fn sources_of(&self, kind: ListKind) -> Vec<ListSource> {
        self.sources
            .iter()
            .filter(|source| source.kind == kind)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub lists: BlockLists,
    pub errors: Vec<SourceError>,
}

pub struct SnapshotBuilder {
    fetcher: BlocklistFetcher,
    settings: SnapshotSettings,
}

impl SnapshotBuilder {
    pub fn new(fetcher: BlocklistFetcher, settings: SnapshotSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Builds the hostname and address branches concurrently. Remote lists
    /// are only downloaded when `fetch_remote` is set; source failures are
    /// reported, never fatal.
    pub async fn build(&self, fetch_remote: bool) -> BuildReport {
        info!(fetch_remote, "Block list build started");

        let ((hostnames, mut errors), (ips, prefixes, ip_errors)) = tokio::join!(
            self.build_hostnames(fetch_remote),
            self.build_addresses(fetch_remote)
        );
        errors.extend(ip_errors);

        let mut lists = BlockLists {
            hostnames,
            ips,
            prefixes,
        };
        lists.normalize();

        info!(
            hostnames = lists.hostnames.len(),
            ips = lists.ips.len(),
            prefixes = lists.prefixes.len(),
            source_errors = errors.len(),
            "Block list build completed"
        );

        BuildReport { lists, errors }
    }

    async fn fetch(&self, kind: ListKind, fetch_remote: bool) -> FetchReport {
        if !fetch_remote {
            return FetchReport::default();
        }
        self.fetcher.fetch_all(self.settings.sources_of(kind)).await
    }

    async fn build_hostnames(&self, fetch_remote: bool) -> (Vec<String>, Vec<SourceError>) {
        let fetched = self.fetch(ListKind::Hostnames, fetch_remote).await;

        let allowed: FxHashSet<String> = self
            .settings
            .allowed_hosts
            .iter()
            .map(|host| to_fqdn(host))
            .filter(|host| host != ".")
            .collect();

        let mut excluded = 0usize;
        let hostnames: Vec<String> = fetched
            .entries
            .iter()
            .chain(&self.settings.blocked_hosts)
            .map(|host| to_fqdn(host))
            .filter(|host| host != ".")
            .filter(|host| {
                let is_allowed = parent_domains(host).any(|parent| allowed.contains(parent));
                if is_allowed {
                    excluded += 1;
                }
                !is_allowed
            })
            .collect();

        debug!(kept = hostnames.len(), excluded, "Hostnames merged");
        (hostnames, fetched.errors)
    }

    async fn build_addresses(
        &self,
        fetch_remote: bool,
    ) -> (Vec<IpAddr>, Vec<IpNetwork>, Vec<SourceError>) {
        let fetched = self.fetch(ListKind::Ips, fetch_remote).await;

        let mut ips = self.settings.blocked_ips.clone();
        let mut prefixes = self.settings.blocked_prefixes.clone();

        for line in &fetched.entries {
            match parse_blocked_address(line) {
                Some(BlockedAddress::Ip(ip)) => ips.push(ip),
                Some(BlockedAddress::Prefix(prefix)) => prefixes.push(prefix),
                None => {}
            }
        }

        if self.settings.rebinding_protection {
            prefixes.extend(rebinding_prefixes());
        }

        (ips, prefixes, fetched.errors)
    }
}
