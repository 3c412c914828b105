use async_trait::async_trait;
use ferrous_relay_application::ports::{DnsHandler, DnsRequest, Middleware, ResponseWriter};
use ferrous_relay_application::services::ResponseBuffer;
use ferrous_relay_domain::{DomainError, MiddlewareConfig};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::{error, info};

pub struct LogMiddleware {
    log_requests: bool,
    log_responses: bool,
}

impl LogMiddleware {
    pub fn new(config: &MiddlewareConfig) -> Self {
        Self {
            log_requests: config.log_requests,
            log_responses: config.log_responses,
        }
    }
}

impl Middleware for LogMiddleware {
    fn name(&self) -> &'static str {
        "log"
    }

    fn wrap(&self, next: Arc<dyn DnsHandler>) -> Arc<dyn DnsHandler> {
        Arc::new(LogHandler {
            log_requests: self.log_requests,
            log_responses: self.log_responses,
            next,
        })
    }
}

struct LogHandler {
    log_requests: bool,
    log_responses: bool,
    next: Arc<dyn DnsHandler>,
}

fn question_summary(message: &Message) -> String {
    message
        .queries()
        .iter()
        .map(|q| format!("{} {} {}", q.name(), q.query_class(), q.query_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn answer_summary(message: &Message) -> String {
    message
        .answers()
        .iter()
        .map(|r| format!("{} {} {}", r.name(), r.record_type(), r.data()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl DnsHandler for LogHandler {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        if self.log_requests {
            info!(
                client = %request.client,
                protocol = request.protocol,
                id = request.message.id(),
                questions = %question_summary(&request.message),
                "DNS request"
            );
        }

        let mut buffer = ResponseBuffer::new();
        self.next.serve(&mut buffer, request).await?;
        let Some(response) = buffer.into_message() else {
            return Ok(());
        };

        if self.log_responses {
            info!(
                client = %request.client,
                id = response.id(),
                rcode = %response.response_code(),
                answers = %answer_summary(&response),
                "DNS response"
            );
        }

        if let Err(e) = writer.write_msg(response).await {
            error!(client = %request.client, error = %e, "Failed to write DNS response");
            return Err(e);
        }
        Ok(())
    }
}
