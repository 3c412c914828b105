use ferrous_relay_application::ports::DnsCachePort;
use hickory_proto::op::Message;

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDnsCache;

impl DnsCachePort for NoopDnsCache {
    fn get(&self, _request: &Message) -> Option<Message> {
        None
    }

    fn add(&self, _request: &Message, _response: &Message) {}

    fn remove(&self, _request: &Message) {}

    fn len(&self) -> usize {
        0
    }
}
