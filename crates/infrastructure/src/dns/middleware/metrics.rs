use async_trait::async_trait;
use ferrous_relay_application::ports::{
    DnsHandler, DnsRequest, MetricsPort, Middleware, ResponseWriter,
};
use ferrous_relay_application::services::ResponseBuffer;
use ferrous_relay_domain::DomainError;
use std::sync::Arc;

pub struct MetricsMiddleware {
    metrics: Arc<dyn MetricsPort>,
}

impl MetricsMiddleware {
    pub fn new(metrics: Arc<dyn MetricsPort>) -> Self {
        Self { metrics }
    }
}

impl Middleware for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn wrap(&self, next: Arc<dyn DnsHandler>) -> Arc<dyn DnsHandler> {
        Arc::new(MetricsHandler {
            metrics: self.metrics.clone(),
            next,
        })
    }
}

struct MetricsHandler {
    metrics: Arc<dyn MetricsPort>,
    next: Arc<dyn DnsHandler>,
}

#[async_trait]
impl DnsHandler for MetricsHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        self.metrics.request_received();
        for query in request.message.queries() {
            self.metrics
                .question_received(query.query_class(), query.query_type());
        }

        self.metrics.inflight_changed(1);
        let mut buffer = ResponseBuffer::new();
        let served = self.next.serve(&mut buffer, request).await;
        self.metrics.inflight_changed(-1);
        served?;

        let Some(response) = buffer.into_message() else {
            return Ok(());
        };

        self.metrics.response_code(response.response_code());
        for record in response.answers() {
            self.metrics
                .answer_sent(record.dns_class(), record.record_type());
        }

        writer.write_msg(response).await?;
        self.metrics.response_sent();
        Ok(())
    }
}
