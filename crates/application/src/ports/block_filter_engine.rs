use ferrous_relay_domain::FilterSnapshot;
use hickory_proto::op::Message;

pub trait BlockFilterPort: Send + Sync {
    /// Atomically replace the active snapshot.
    fn update(&self, snapshot: FilterSnapshot);

    /// True when a question names a blocked host or one of its subdomains.
    fn filter_request(&self, request: &Message) -> bool;

    /// True when an A/AAAA answer points at a blocked address or prefix.
    fn filter_response(&self, response: &Message) -> bool;
}
