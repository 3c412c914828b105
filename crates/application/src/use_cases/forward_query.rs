use crate::ports::{DnsExchanger, DnsHandler, DnsRequest, ResponseWriter};
use crate::services::reply_with_code;
use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::ResponseCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Innermost handler: asks the upstream and writes whatever comes back.
pub struct ForwardQueryUseCase {
    exchanger: Arc<dyn DnsExchanger>,
}

impl ForwardQueryUseCase {
    pub fn new(exchanger: Arc<dyn DnsExchanger>) -> Self {
        Self { exchanger }
    }
}

#[async_trait]
impl DnsHandler for ForwardQueryUseCase {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &DnsRequest,
    ) -> Result<(), DomainError> {
        let response = match self.exchanger.exchange(&request.message).await {
            Ok(mut response) => {
                response.set_id(request.message.id());
                debug!(
                    id = request.message.id(),
                    rcode = %response.response_code(),
                    answers = response.answers().len(),
                    "Upstream answered"
                );
                response
            }
            Err(e) => {
                warn!(client = %request.client, error = %e, "Upstream exchange failed");
                reply_with_code(&request.message, ResponseCode::ServFail)
            }
        };

        writer.write_msg(response).await
    }
}
