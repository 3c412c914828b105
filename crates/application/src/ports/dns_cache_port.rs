use hickory_proto::op::Message;

/// Response store keyed by the first question of a request.
pub trait DnsCachePort: Send + Sync {
    fn get(&self, request: &Message) -> Option<Message>;

    fn add(&self, request: &Message, response: &Message);

    fn remove(&self, request: &Message);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
