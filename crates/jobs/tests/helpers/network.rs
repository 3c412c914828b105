//! Real listeners on loopback for exercising the loop end to end.

use async_trait::async_trait;
use ferrous_relay_application::ports::{
    DnsExchanger, DnsHandler, DnsRequest, InstanceFactory, ListFetcher, ResponseWriter,
    ServerInstance,
};
use ferrous_relay_application::services::reply_with_code;
use ferrous_relay_domain::DomainError;
use ferrous_relay_infrastructure::dns::block_filter::{
    BlocklistFetcher, SnapshotBuilder, SnapshotSettings,
};
use ferrous_relay_infrastructure::dns::forwarding::{parse_message, serialize_message};
use ferrous_relay_infrastructure::dns::metrics::CounterMetrics;
use ferrous_relay_infrastructure::dns::server::DnsServer;
use ferrous_relay_infrastructure::dns::transport::udp::UdpTransport;
use ferrous_relay_infrastructure::dns::transport::DnsTransport;
use ferrous_relay_infrastructure::dns::DnsInstanceFactory;
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const UPSTREAM_ANSWER: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 53);

/// A port nothing listens on right now.
pub fn free_port() -> SocketAddr {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap()
}

pub async fn ask(addr: SocketAddr, name: &str) -> Message {
    let mut request = Message::new();
    request
        .set_id(query_id(name))
        .set_recursion_desired(true);
    request.add_query(Query::query(Name::from_str(name).unwrap(), RecordType::A));

    let reply = UdpTransport::new(addr)
        .send(&serialize_message(&request).unwrap(), Duration::from_secs(2))
        .await
        .unwrap();
    let response = parse_message(&reply.bytes).unwrap();
    assert_eq!(response.id(), request.id());
    response
}

fn query_id(name: &str) -> u16 {
    name.bytes().fold(7u16, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u16))
}

/// Upstream stand-in answering every A question, counting calls per name.
#[derive(Default)]
pub struct FixedExchanger {
    calls: Mutex<HashMap<String, usize>>,
}

impl FixedExchanger {
    pub fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DnsExchanger for FixedExchanger {
    async fn exchange(&self, request: &Message) -> Result<Message, DomainError> {
        let query = request.queries()[0].clone();
        *self
            .calls
            .lock()
            .unwrap()
            .entry(query.name().to_string())
            .or_default() += 1;

        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_recursion_desired(true)
            .set_recursion_available(true)
            .set_response_code(ResponseCode::NoError);
        response.add_answer(Record::from_rdata(
            query.name().clone(),
            300,
            RData::A(A(UPSTREAM_ANSWER)),
        ));
        response.add_query(query);
        Ok(response)
    }
}

pub struct EmptyListFetcher;

#[async_trait]
impl ListFetcher for EmptyListFetcher {
    async fn fetch_lines(&self, _url: &str) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }
}

/// Handler that is up but answers nothing useful.
pub struct ServFailHandler;

#[async_trait]
impl DnsHandler for ServFailHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        writer
            .write_msg(reply_with_code(&request.message, ResponseCode::ServFail))
            .await
    }
}

pub enum Step {
    /// Full serving stack from `DnsInstanceFactory`.
    Serve,
    /// Listener on the shared address whose handler only returns SERVFAIL.
    Broken,
    Fail(DomainError),
}

/// Builds real instances on one shared address, following a script.
/// Builds past the script fail.
pub struct ScriptedDnsFactory {
    listen_addr: SocketAddr,
    inner: DnsInstanceFactory,
    script: Mutex<VecDeque<Step>>,
    builds: Mutex<usize>,
}

impl ScriptedDnsFactory {
    pub fn new(listen_addr: SocketAddr, exchanger: Arc<FixedExchanger>, script: Vec<Step>) -> Self {
        let builder = SnapshotBuilder::new(
            BlocklistFetcher::new(Arc::new(EmptyListFetcher)),
            SnapshotSettings::default(),
        );
        let inner = DnsInstanceFactory::new(
            listen_addr,
            builder,
            exchanger,
            Arc::new(CounterMetrics::new()),
        );
        Self {
            listen_addr,
            inner,
            script: Mutex::new(script.into()),
            builds: Mutex::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        *self.builds.lock().unwrap()
    }
}

#[async_trait]
impl InstanceFactory for ScriptedDnsFactory {
    async fn build(&self, fetch_remote: bool) -> Result<Box<dyn ServerInstance>, DomainError> {
        *self.builds.lock().unwrap() += 1;
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Serve) => self.inner.build(fetch_remote).await,
            Some(Step::Broken) => Ok(Box::new(DnsServer::new(
                self.listen_addr,
                Arc::new(ServFailHandler),
            ))),
            Some(Step::Fail(error)) => Err(error),
            None => Err(DomainError::ServerStart {
                addr: self.listen_addr.to_string(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}
