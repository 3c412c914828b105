use async_trait::async_trait;
use ferrous_relay_application::ports::{
    BlockFilterPort, DnsCachePort, DnsHandler, DnsRequest, Middleware, ResponseWriter,
};
use ferrous_relay_application::services::{reply_with_code, ResponseBuffer};
use ferrous_relay_domain::DomainError;
use hickory_proto::op::ResponseCode;
use std::sync::Arc;
use tracing::debug;

/// Refuses blocked questions, and refuses answers pointing at blocked
/// addresses after purging them from the cache.
pub struct FilterMiddleware {
    filter: Arc<dyn BlockFilterPort>,
    cache: Arc<dyn DnsCachePort>,
}

impl FilterMiddleware {
    pub fn new(filter: Arc<dyn BlockFilterPort>, cache: Arc<dyn DnsCachePort>) -> Self {
        Self { filter, cache }
    }
}

impl Middleware for FilterMiddleware {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn wrap(&self, next: Arc<dyn DnsHandler>) -> Arc<dyn DnsHandler> {
        Arc::new(FilterHandler {
            filter: self.filter.clone(),
            cache: self.cache.clone(),
            next,
        })
    }
}

struct FilterHandler {
    filter: Arc<dyn BlockFilterPort>,
    cache: Arc<dyn DnsCachePort>,
    next: Arc<dyn DnsHandler>,
}

#[async_trait]
impl DnsHandler for FilterHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        if self.filter.filter_request(&request.message) {
            return writer
                .write_msg(reply_with_code(&request.message, ResponseCode::Refused))
                .await;
        }

        let mut buffer = ResponseBuffer::new();
        self.next.serve(&mut buffer, request).await?;
        let Some(response) = buffer.into_message() else {
            return Ok(());
        };

        if self.filter.filter_response(&response) {
            self.cache.remove(&request.message);
            debug!(client = %request.client, id = request.message.id(), "Blocked answer purged from cache");
            return writer
                .write_msg(reply_with_code(&request.message, ResponseCode::Refused))
                .await;
        }

        writer.write_msg(response).await
    }
}
