#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_relay_application::ports::DnsExchanger;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::{Message, MessageType, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn query(name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(stable_id(name)).set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}

fn stable_id(name: &str) -> u16 {
    name.bytes().fold(17u16, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u16))
}

pub fn a_response(name: &str, ip: Ipv4Addr, ttl: u32) -> Message {
    let mut response = query(name, RecordType::A);
    response.set_message_type(MessageType::Response);
    response.add_answer(Record::from_rdata(
        Name::from_str(name).unwrap(),
        ttl,
        RData::A(A(ip)),
    ));
    response
}

/// Upstream that replays a canned answer or error and counts calls.
pub struct MockExchanger {
    response: Mutex<Result<Message, DomainError>>,
    calls: AtomicUsize,
}

impl MockExchanger {
    pub fn answering(response: Message) -> Self {
        Self {
            response: Mutex::new(Ok(response)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            response: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsExchanger for MockExchanger {
    async fn exchange(&self, _request: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}
