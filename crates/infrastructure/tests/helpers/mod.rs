#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_relay_application::ports::{
    DnsExchanger, DnsHandler, DnsRequest, ListFetcher, ResponseWriter,
};
use ferrous_relay_application::services::reply_with_code;
use ferrous_relay_domain::DomainError;
use ferrous_relay_infrastructure::dns::forwarding::{parse_message, serialize_message};
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;

pub fn query(name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(fastrand::u16(..))
        .set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}

pub fn request(name: &str, record_type: RecordType) -> DnsRequest {
    DnsRequest::new(
        query(name, record_type),
        "192.168.1.100:40000".parse().unwrap(),
        "udp",
    )
}

/// Answer to `request` with one address record per question.
pub fn address_response(request: &Message, ip: IpAddr, ttl: u32) -> Message {
    let mut response = reply_with_code(request, ResponseCode::NoError);
    response.set_message_type(MessageType::Response);
    for query in request.queries() {
        let rdata = match ip {
            IpAddr::V4(v4) => RData::A(A(v4)),
            IpAddr::V6(v6) => RData::AAAA(AAAA(v6)),
        };
        response.add_answer(Record::from_rdata(query.name().clone(), ttl, rdata));
    }
    response
}

/// Serves canned block lists by URL and counts downloads per URL.
#[derive(Default)]
pub struct MockListFetcher {
    lists: HashMap<String, Result<Vec<String>, String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockListFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, url: &str, lines: &[&str]) -> Self {
        self.lists.insert(
            url.to_string(),
            Ok(lines.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.lists.insert(url.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ListFetcher for MockListFetcher {
    async fn fetch_lines(&self, url: &str) -> Result<Vec<String>, DomainError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        match self.lists.get(url) {
            Some(Ok(lines)) => Ok(lines.clone()),
            Some(Err(reason)) => Err(DomainError::BlockListFetch {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(DomainError::BlockListFetch {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            }),
        }
    }
}

/// Upstream answering every question with one fixed address.
pub struct MockExchanger {
    answer: IpAddr,
    ttl: u32,
    calls: AtomicUsize,
}

impl MockExchanger {
    pub fn answering(answer: IpAddr, ttl: u32) -> Self {
        Self {
            answer,
            ttl,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsExchanger for MockExchanger {
    async fn exchange(&self, request: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(address_response(request, self.answer, self.ttl))
    }
}

/// Terminal handler answering with a fixed address or a fixed rcode.
pub struct StaticHandler {
    answer: Option<IpAddr>,
    code: ResponseCode,
    ttl: u32,
    calls: AtomicUsize,
}

impl StaticHandler {
    pub fn answering(answer: IpAddr, ttl: u32) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer),
            code: ResponseCode::NoError,
            ttl,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(code: ResponseCode) -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            code,
            ttl: 0,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsHandler for StaticHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = match self.answer {
            Some(ip) => address_response(&request.message, ip, self.ttl),
            None => reply_with_code(&request.message, self.code),
        };
        writer.write_msg(response).await
    }
}

/// Plain UDP upstream on loopback answering every question with `answer`.
pub async fn spawn_udp_upstream(answer: IpAddr) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = parse_message(&buf[..len]) else {
                continue;
            };
            let response = address_response(&request, answer, 300);
            let bytes = serialize_message(&response).unwrap();
            let _ = socket.send_to(&bytes, peer).await;
        }
    });
    addr
}

/// Loopback UDP socket that never answers.
pub async fn silent_udp_upstream() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}
