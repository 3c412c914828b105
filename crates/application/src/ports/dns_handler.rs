use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;

/// A decoded query together with where it came from.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub message: Message,
    pub client: SocketAddr,
    pub protocol: &'static str,
}

impl DnsRequest {
    pub fn new(message: Message, client: SocketAddr, protocol: &'static str) -> Self {
        Self {
            message,
            client,
            protocol,
        }
    }
}

/// Destination of exactly one response message.
#[async_trait]
pub trait ResponseWriter: Send {
    async fn write_msg(&mut self, message: Message) -> Result<(), DomainError>;
}

#[async_trait]
pub trait DnsHandler: Send + Sync {
    /// Answer `request` through `writer`. Errors are write failures only;
    /// resolution failures are answered with an error rcode instead.
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError>;
}
