use crate::dns::forwarding::{parse_message, serialize_message};
use crate::dns::transport::tcp::TcpTransport;
use crate::dns::transport::{DnsTransport, Transport};
use ferrous_relay_domain::{DnsProtocol, DomainError};
use hickory_proto::op::Message;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const MIN_TCP_RETRY_BUDGET: Duration = Duration::from_millis(500);

/// One exchange against one upstream.
///
/// The request goes out under a fresh random id which the reply must echo;
/// the returned message carries the caller's original id. A truncated UDP
/// reply is retried over TCP against the same address.
pub async fn exchange_with(
    transport: &Transport,
    protocol: &DnsProtocol,
    request: &Message,
    timeout: Duration,
) -> Result<Message, DomainError> {
    let start = Instant::now();
    let original_id = request.id();

    let mut outgoing = request.clone();
    let wire_id = fastrand::u16(..);
    outgoing.set_id(wire_id);
    let query_bytes = serialize_message(&outgoing)?;

    let reply = transport.send(&query_bytes, timeout).await?;
    let mut response = parse_message(&reply.bytes)?;
    check_id(&response, wire_id, protocol)?;

    if response.truncated() {
        if let DnsProtocol::Udp { addr } = protocol {
            debug!(server = %addr, "Response truncated (TC bit), retrying via TCP");

            let remaining = timeout
                .checked_sub(start.elapsed())
                .unwrap_or(MIN_TCP_RETRY_BUDGET);
            let tcp_reply = TcpTransport::new(*addr)
                .send(&query_bytes, remaining)
                .await?;
            response = parse_message(&tcp_reply.bytes)?;
            check_id(&response, wire_id, protocol)?;
        }
    }

    response.set_id(original_id);
    Ok(response)
}

fn check_id(response: &Message, expected: u16, protocol: &DnsProtocol) -> Result<(), DomainError> {
    if response.id() != expected {
        return Err(DomainError::InvalidDnsResponse(format!(
            "{} answered id {} for query id {}",
            protocol,
            response.id(),
            expected
        )));
    }
    Ok(())
}
