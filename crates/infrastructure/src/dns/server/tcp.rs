use crate::dns::forwarding::{parse_message, serialize_message};
use crate::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};
use async_trait::async_trait;
use ferrous_relay_application::ports::{DnsHandler, DnsRequest, ResponseWriter};
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

struct TcpResponseWriter<'a> {
    stream: &'a mut OwnedWriteHalf,
}

#[async_trait]
impl ResponseWriter for TcpResponseWriter<'_> {
    async fn write_msg(&mut self, message: Message) -> Result<(), DomainError> {
        let bytes = serialize_message(&message)?;
        send_with_length_prefix(&mut *self.stream, &bytes).await
    }
}

/// Accepts connections until cancelled. Accept failures (descriptor
/// exhaustion and the like) are logged and retried.
pub(super) async fn serve_tcp(
    listener: TcpListener,
    handler: Arc<dyn DnsHandler>,
    cancel: CancellationToken,
) -> Result<(), DomainError> {
    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer)) => {
                let handler = handler.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    serve_connection(stream, peer, handler, cancel).await;
                });
            }
            Err(e) => {
                warn!(error = %e, "TCP accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn DnsHandler>,
    cancel: CancellationToken,
) {
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return,
            frame = tokio::time::timeout(IDLE_TIMEOUT, read_with_length_prefix(&mut reader)) => frame,
        };
        let bytes = match frame {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(_)) | Err(_) => return,
        };

        let message = match parse_message(&bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!(client = %peer, error = %e, "Closing TCP connection after malformed query");
                return;
            }
        };

        let request = DnsRequest::new(message, peer, "tcp");
        let mut response_writer = TcpResponseWriter {
            stream: &mut writer,
        };
        if let Err(e) = handler.serve(&mut response_writer, &request).await {
            debug!(client = %peer, error = %e, "TCP query not answered");
            return;
        }
    }
}
