use super::endpoints::{endpoints_for, EndpointKind};
use super::query::exchange_with;
use crate::dns::transport::{Dialer, Transport};
use async_trait::async_trait;
use ferrous_relay_application::ports::{DialOutcome, DnsExchanger, MetricsPort};
use ferrous_relay_domain::{DnsProtocol, DomainError, Provider, UpstreamConfig, UpstreamType};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One dialable endpoint of a named provider.
pub struct Upstream {
    provider: Arc<str>,
    protocol: DnsProtocol,
    transport: Transport,
}

impl Upstream {
    pub fn new(provider: &str, protocol: DnsProtocol, dialer: &Dialer) -> Result<Self, DomainError> {
        let transport = dialer.transport_for(&protocol)?;
        Ok(Self {
            provider: Arc::from(provider),
            protocol,
            transport,
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn protocol(&self) -> &DnsProtocol {
        &self.protocol
    }
}

/// Tries upstreams strictly in order: every primary (DoT or DoH) endpoint,
/// then every plaintext fallback endpoint.
pub struct UpstreamResolver {
    upstreams: Vec<Upstream>,
    timeout: Duration,
    metrics: Arc<dyn MetricsPort>,
}

impl UpstreamResolver {
    pub fn new(upstreams: Vec<Upstream>, timeout: Duration, metrics: Arc<dyn MetricsPort>) -> Self {
        Self {
            upstreams,
            timeout,
            metrics,
        }
    }

    pub fn from_config(
        config: &UpstreamConfig,
        dialer: &Dialer,
        metrics: Arc<dyn MetricsPort>,
    ) -> Result<Self, DomainError> {
        let primary_kind = match config.upstream_type {
            UpstreamType::Dot => EndpointKind::Dot,
            UpstreamType::Doh => EndpointKind::Doh,
        };

        let mut upstreams = Vec::new();
        let groups = [
            (config.primary_providers(), primary_kind),
            (config.plaintext_providers.as_slice(), EndpointKind::Plaintext),
        ];
        for (names, kind) in groups {
            for name in names {
                let provider = Provider::by_name(name).ok_or_else(|| {
                    DomainError::ConfigError(format!("Unknown upstream provider: {}", name))
                })?;
                for protocol in endpoints_for(provider, kind, config.ipv6)? {
                    upstreams.push(Upstream::new(provider.name, protocol, dialer)?);
                }
            }
        }

        info!(
            upstream_type = config.upstream_type.as_str(),
            endpoints = upstreams.len(),
            ipv6 = config.ipv6,
            "Upstream resolver configured"
        );

        Ok(Self::new(upstreams, config.timeout(), metrics))
    }

    pub fn upstreams(&self) -> &[Upstream] {
        &self.upstreams
    }
}

#[async_trait]
impl DnsExchanger for UpstreamResolver {
    async fn exchange(&self, request: &Message) -> Result<Message, DomainError> {
        for (position, upstream) in self.upstreams.iter().enumerate() {
            let address = upstream.protocol.address_label();

            match exchange_with(&upstream.transport, &upstream.protocol, request, self.timeout).await {
                Ok(response) => {
                    self.metrics
                        .upstream_dial(&upstream.provider, &address, DialOutcome::Success);
                    debug!(
                        provider = %upstream.provider,
                        upstream = %upstream.protocol,
                        position,
                        "Upstream responded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    self.metrics
                        .upstream_dial(&upstream.provider, &address, DialOutcome::Error);
                    warn!(
                        provider = %upstream.provider,
                        upstream = %upstream.protocol,
                        error = %e,
                        position,
                        "Failing over"
                    );
                }
            }
        }
        Err(DomainError::TransportAllServersUnreachable)
    }
}
