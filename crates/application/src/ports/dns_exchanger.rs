use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;

/// Delivers a query to some upstream and returns its answer.
#[async_trait]
pub trait DnsExchanger: Send + Sync {
    async fn exchange(&self, request: &Message) -> Result<Message, DomainError>;
}
