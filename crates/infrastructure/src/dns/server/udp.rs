use crate::dns::forwarding::{parse_message, truncate_for};
use async_trait::async_trait;
use ferrous_relay_application::ports::{DnsHandler, DnsRequest, ResponseWriter};
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

const MAX_UDP_QUERY_SIZE: usize = 4096;

struct UdpResponseWriter {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    request: Message,
}

#[async_trait]
impl ResponseWriter for UdpResponseWriter {
    async fn write_msg(&mut self, message: Message) -> Result<(), DomainError> {
        let bytes = truncate_for(&self.request, &message)?;
        self.socket.send_to(&bytes, self.peer).await?;
        Ok(())
    }
}

/// Receives datagrams until cancelled; each query is answered on its own task.
pub(super) async fn serve_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<dyn DnsHandler>,
    cancel: CancellationToken,
) -> Result<(), DomainError> {
    let mut buf = [0u8; MAX_UDP_QUERY_SIZE];

    loop {
        let (len, peer) = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) if is_transient(&e) => continue,
                Err(e) => {
                    error!(error = %e, "UDP receive failed");
                    return Err(e.into());
                }
            },
        };

        let message = match parse_message(&buf[..len]) {
            Ok(message) => message,
            Err(e) => {
                debug!(client = %peer, error = %e, "Dropping malformed UDP query");
                continue;
            }
        };

        let socket = socket.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let request = DnsRequest::new(message.clone(), peer, "udp");
            let mut writer = UdpResponseWriter {
                socket,
                peer,
                request: message,
            };
            if let Err(e) = handler.serve(&mut writer, &request).await {
                debug!(client = %peer, error = %e, "UDP query not answered");
            }
        });
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionReset | io::ErrorKind::WouldBlock
    )
}
