use async_trait::async_trait;
use ferrous_relay_application::ports::{
    DnsCachePort, DnsHandler, DnsRequest, Middleware, ResponseWriter,
};
use ferrous_relay_application::services::ResponseBuffer;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::ResponseCode;
use std::sync::Arc;
use tracing::debug;

pub struct CacheMiddleware {
    cache: Arc<dyn DnsCachePort>,
}

impl CacheMiddleware {
    pub fn new(cache: Arc<dyn DnsCachePort>) -> Self {
        Self { cache }
    }
}

impl Middleware for CacheMiddleware {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn wrap(&self, next: Arc<dyn DnsHandler>) -> Arc<dyn DnsHandler> {
        Arc::new(CacheHandler {
            cache: self.cache.clone(),
            next,
        })
    }
}

struct CacheHandler {
    cache: Arc<dyn DnsCachePort>,
    next: Arc<dyn DnsHandler>,
}

#[async_trait]
impl DnsHandler for CacheHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        if let Some(mut cached) = self.cache.get(&request.message) {
            cached.set_id(request.message.id());
            debug!(id = request.message.id(), "Cache hit");
            return writer.write_msg(cached).await;
        }

        let mut buffer = ResponseBuffer::new();
        self.next.serve(&mut buffer, request).await?;
        let Some(response) = buffer.into_message() else {
            return Ok(());
        };

        if response.response_code() == ResponseCode::NoError && !response.truncated() {
            self.cache.add(&request.message, &response);
        }

        writer.write_msg(response).await
    }
}
