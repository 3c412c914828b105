//! Bring-up check that resolves a real name through a freshly started instance.

use crate::dns::forwarding::{parse_message, serialize_message};
use crate::dns::transport::udp::UdpTransport;
use crate::dns::transport::DnsTransport;
use async_trait::async_trait;
use ferrous_relay_application::ports::LivenessProbe;
use ferrous_relay_domain::{to_fqdn, DomainError};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RecordType};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_ATTEMPTS: u32 = 10;
const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(100);

pub struct DnsLivenessProbe {
    hostname: Name,
    timeout: Duration,
    attempts: u32,
    backoff_step: Duration,
}

impl DnsLivenessProbe {
    pub fn new(hostname: &str, timeout: Duration) -> Result<Self, DomainError> {
        let hostname = Name::from_str(&to_fqdn(hostname))
            .map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", hostname, e)))?;
        Ok(Self {
            hostname,
            timeout,
            attempts: DEFAULT_ATTEMPTS,
            backoff_step: DEFAULT_BACKOFF_STEP,
        })
    }

    /// Waits `backoff_step * n` after the n-th failed attempt.
    pub fn with_attempts(mut self, attempts: u32, backoff_step: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff_step = backoff_step;
        self
    }

    async fn probe_once(&self, target: SocketAddr) -> Result<(), DomainError> {
        let mut query = Message::new();
        query
            .set_id(fastrand::u16(..))
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        query.add_query(Query::query(self.hostname.clone(), RecordType::A));

        let reply = UdpTransport::new(target)
            .send(&serialize_message(&query)?, self.timeout)
            .await?;
        let response = parse_message(&reply.bytes)?;

        if response.id() != query.id() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "probe id mismatch: sent {}, got {}",
                query.id(),
                response.id()
            )));
        }
        if response.response_code() != ResponseCode::NoError {
            return Err(DomainError::InvalidDnsResponse(format!(
                "probe for {} answered {}",
                self.hostname,
                response.response_code()
            )));
        }
        Ok(())
    }
}

/// Unspecified bind addresses are reached through loopback.
fn probe_target(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}

#[async_trait]
impl LivenessProbe for DnsLivenessProbe {
    async fn check(&self, addr: SocketAddr, cancel: &CancellationToken) -> Result<(), DomainError> {
        let target = probe_target(addr);
        let mut last_error = String::new();

        for attempt in 1..=self.attempts {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DomainError::Cancelled),
                result = self.probe_once(target) => result,
            };

            match result {
                Ok(()) => {
                    info!(addr = %target, attempt, "DNS liveness check passed");
                    return Ok(());
                }
                Err(e) => {
                    debug!(addr = %target, attempt, error = %e, "DNS liveness attempt failed");
                    last_error = e.to_string();
                }
            }

            if attempt < self.attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(DomainError::Cancelled),
                    _ = tokio::time::sleep(self.backoff_step * attempt) => {}
                }
            }
        }

        Err(DomainError::LivenessCheckFailed {
            attempts: self.attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_addresses_probe_loopback() {
        assert_eq!(
            probe_target("0.0.0.0:5353".parse().unwrap()),
            "127.0.0.1:5353".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            probe_target("[::]:53".parse().unwrap()),
            "[::1]:53".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            probe_target("192.168.1.2:53".parse().unwrap()),
            "192.168.1.2:53".parse::<SocketAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_cancelled_probe_stops_immediately() {
        let probe = DnsLivenessProbe::new("github.com", Duration::from_millis(50)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = probe.check("127.0.0.1:9".parse().unwrap(), &cancel).await;

        assert!(matches!(result, Err(DomainError::Cancelled)));
    }
}
