//! DNS-over-TLS transport (RFC 7858).
//!
//! Idle connections are kept per transport and reused for subsequent
//! queries, which amortizes the TCP and TLS handshakes.

use super::tcp::{read_with_length_prefix, send_with_length_prefix};
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Maximum idle connections kept per transport.
const MAX_IDLE_CONNECTIONS: usize = 2;

pub struct TlsTransport {
    server_addr: SocketAddr,
    hostname: String,
    connector: TlsConnector,
    idle: Mutex<Vec<TlsStream<TcpStream>>>,
}

impl TlsTransport {
    pub fn new(
        server_addr: SocketAddr,
        hostname: String,
        tls_config: Arc<rustls::ClientConfig>,
    ) -> Self {
        Self {
            server_addr,
            hostname,
            connector: TlsConnector::from(tls_config),
            idle: Mutex::new(Vec::new()),
        }
    }

    fn take_pooled(&self) -> Option<TlsStream<TcpStream>> {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    fn return_to_pool(&self, stream: TlsStream<TcpStream>) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(stream);
        }
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        }
    }

    async fn connect_new(&self, timeout: Duration) -> Result<TlsStream<TcpStream>, DomainError> {
        let server_name = ServerName::try_from(self.hostname.clone()).map_err(|e| {
            DomainError::InvalidDomainName(format!(
                "Invalid TLS hostname '{}': {}",
                self.hostname, e
            ))
        })?;

        let tcp_stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| DomainError::TransportConnectionRefused {
                server: self.server_addr.to_string(),
                reason: e.to_string(),
            })?;
        tcp_stream.set_nodelay(true)?;

        let tls_stream =
            tokio::time::timeout(timeout, self.connector.connect(server_name, tcp_stream))
                .await
                .map_err(|_| self.timeout_error())?
                .map_err(|e| DomainError::Transport {
                    server: self.server_addr.to_string(),
                    reason: format!("TLS handshake failed: {}", e),
                })?;

        debug!(server = %self.server_addr, hostname = %self.hostname, "TLS connection established");
        Ok(tls_stream)
    }

    async fn send_on_stream(
        &self,
        stream: &mut TlsStream<TcpStream>,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        let exchange = async {
            send_with_length_prefix(stream, message_bytes).await?;
            read_with_length_prefix(stream).await
        };
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| self.timeout_error())?
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if let Some(mut stream) = self.take_pooled() {
            match self.send_on_stream(&mut stream, message_bytes, timeout).await {
                Ok(bytes) => {
                    debug!(server = %self.server_addr, "TLS query via pooled connection");
                    self.return_to_pool(stream);
                    return Ok(TransportResponse { bytes });
                }
                Err(e) => {
                    debug!(server = %self.server_addr, error = %e, "Pooled TLS connection stale, reconnecting");
                }
            }
        }

        let mut stream = self.connect_new(timeout).await?;
        let bytes = self.send_on_stream(&mut stream, message_bytes, timeout).await?;

        debug!(
            server = %self.server_addr,
            response_len = bytes.len(),
            "TLS response received"
        );

        self.return_to_pool(stream);

        Ok(TransportResponse { bytes })
    }
}
