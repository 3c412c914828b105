//! Explicit construction of upstream transports.
//!
//! Every transport gets its TLS configuration and HTTP client from a
//! `Dialer` owned by the caller; nothing here relies on process-wide
//! defaults or the system resolver.

use super::https::HttpsTransport;
use super::tcp::TcpTransport;
use super::tls::TlsTransport;
use super::udp::UdpTransport;
use super::Transport;
use ferrous_relay_domain::{DnsProtocol, DomainError};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Dialer {
    tls_config: Arc<rustls::ClientConfig>,
    timeout: Duration,
}

impl Dialer {
    pub fn new(timeout: Duration) -> Result<Self, DomainError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| DomainError::ConfigError(format!("TLS setup failed: {}", e)))?
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(Self {
            tls_config: Arc::new(config),
            timeout,
        })
    }

    pub fn transport_for(&self, protocol: &DnsProtocol) -> Result<Transport, DomainError> {
        match protocol {
            DnsProtocol::Udp { addr } => Ok(Transport::Udp(UdpTransport::new(*addr))),
            DnsProtocol::Tcp { addr } => Ok(Transport::Tcp(TcpTransport::new(*addr))),
            DnsProtocol::Tls { addr, hostname } => Ok(Transport::Tls(TlsTransport::new(
                *addr,
                hostname.to_string(),
                self.tls_config.clone(),
            ))),
            DnsProtocol::Https {
                url,
                hostname,
                addrs,
            } => {
                let client = reqwest::Client::builder()
                    .use_rustls_tls()
                    .https_only(true)
                    .resolve_to_addrs(hostname, addrs)
                    .timeout(self.timeout)
                    .pool_max_idle_per_host(4)
                    .build()
                    .map_err(|e| {
                        DomainError::ConfigError(format!(
                            "Failed to build DoH client for {}: {}",
                            url, e
                        ))
                    })?;
                Ok(Transport::Https(HttpsTransport::new(url.to_string(), client)))
            }
        }
    }
}
