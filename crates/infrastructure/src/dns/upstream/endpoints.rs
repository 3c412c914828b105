use ferrous_relay_domain::{DnsProtocol, DomainError, Provider};
use std::net::SocketAddr;
use std::sync::Arc;

const DOT_PORT: u16 = 853;
const DOH_PORT: u16 = 443;
const PLAINTEXT_PORT: u16 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Dot,
    Doh,
    Plaintext,
}

/// Concrete endpoints for one provider, in the order they are attempted.
pub fn endpoints_for(
    provider: &Provider,
    kind: EndpointKind,
    ipv6: bool,
) -> Result<Vec<DnsProtocol>, DomainError> {
    let addresses = provider.addresses(ipv6);

    let endpoints = match kind {
        EndpointKind::Dot => {
            let hostname: Arc<str> = Arc::from(provider.tls_name);
            addresses
                .into_iter()
                .map(|ip| DnsProtocol::Tls {
                    addr: SocketAddr::new(ip, DOT_PORT),
                    hostname: hostname.clone(),
                })
                .collect()
        }
        EndpointKind::Doh => {
            let url = reqwest::Url::parse(provider.doh_url).map_err(|e| {
                DomainError::ConfigError(format!("Invalid DoH URL {}: {}", provider.doh_url, e))
            })?;
            let host = url.host_str().ok_or_else(|| {
                DomainError::ConfigError(format!("DoH URL {} has no host", provider.doh_url))
            })?;
            let addrs: Arc<[SocketAddr]> = addresses
                .into_iter()
                .map(|ip| SocketAddr::new(ip, DOH_PORT))
                .collect();
            vec![DnsProtocol::Https {
                url: Arc::from(provider.doh_url),
                hostname: Arc::from(host),
                addrs,
            }]
        }
        EndpointKind::Plaintext => addresses
            .into_iter()
            .map(|ip| DnsProtocol::Udp {
                addr: SocketAddr::new(ip, PLAINTEXT_PORT),
            })
            .collect(),
    };

    Ok(endpoints)
}
