pub mod dialer;
pub mod https;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use std::time::Duration;

pub use dialer::Dialer;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
    Https(https::HttpsTransport),
}

#[async_trait]
impl DnsTransport for Transport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Transport::Udp(t) => t.send(message_bytes, timeout).await,
            Transport::Tcp(t) => t.send(message_bytes, timeout).await,
            Transport::Tls(t) => t.send(message_bytes, timeout).await,
            Transport::Https(t) => t.send(message_bytes, timeout).await,
        }
    }
}
