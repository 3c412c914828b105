//! Wire encoding helpers around `hickory-proto` messages.

use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::rr::{Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Smallest payload every DNS client accepts over UDP (RFC 1035 §4.2.1).
const MIN_UDP_PAYLOAD: usize = 512;

pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buffer = Vec::with_capacity(MIN_UDP_PAYLOAD);
    let mut encoder = BinEncoder::new(&mut buffer);
    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
    })?;
    Ok(buffer)
}

pub fn parse_message(bytes: &[u8]) -> Result<Message, DomainError> {
    Message::from_vec(bytes)
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to parse DNS message: {}", e)))
}

/// Lowest TTL across all resource records, OPT excluded.
pub fn min_ttl(message: &Message) -> Option<u32> {
    message
        .answers()
        .iter()
        .chain(message.name_servers())
        .chain(message.additionals())
        .filter(|record| record.record_type() != RecordType::OPT)
        .map(|record| record.ttl())
        .min()
}

/// Clamp every record TTL to at most `ttl` seconds.
pub fn cap_ttls(message: &mut Message, ttl: u32) {
    cap_section(message.answers_mut(), ttl);
    cap_section(message.name_servers_mut(), ttl);
    cap_section(message.additionals_mut(), ttl);
}

fn cap_section(records: &mut [Record], ttl: u32) {
    for record in records.iter_mut() {
        let capped = record.ttl().min(ttl);
        record.set_ttl(capped);
    }
}

/// Serialize `response` so it fits the payload size advertised by `request`,
/// dropping all records and setting TC when it does not.
pub fn truncate_for(request: &Message, response: &Message) -> Result<Vec<u8>, DomainError> {
    let limit = request
        .extensions()
        .as_ref()
        .map(|edns| usize::from(edns.max_payload()))
        .unwrap_or(MIN_UDP_PAYLOAD)
        .max(MIN_UDP_PAYLOAD);

    let bytes = serialize_message(response)?;
    if bytes.len() <= limit {
        return Ok(bytes);
    }

    let mut truncated = response.clone();
    truncated.take_answers();
    truncated.take_name_servers();
    truncated.take_additionals();
    truncated.set_truncated(true);
    serialize_message(&truncated)
}
