//! Plain DNS listener over UDP and TCP on one address.

mod socket;
mod tcp;
mod udp;

use async_trait::async_trait;
use ferrous_relay_application::ports::{DnsHandler, RunError, ServerInstance};
use ferrous_relay_domain::DomainError;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::sync::{oneshot, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

struct Running {
    cancel: CancellationToken,
    supervisor: JoinHandle<()>,
}

pub struct DnsServer {
    addr: SocketAddr,
    handler: Arc<dyn DnsHandler>,
    running: Mutex<Option<Running>>,
    local_addr: OnceLock<SocketAddr>,
    probe_addr: OnceLock<SocketAddr>,
}

impl DnsServer {
    pub fn new(addr: SocketAddr, handler: Arc<dyn DnsHandler>) -> Self {
        Self {
            addr,
            handler,
            running: Mutex::new(None),
            local_addr: OnceLock::new(),
            probe_addr: OnceLock::new(),
        }
    }

    fn start_error(&self, reason: impl ToString) -> DomainError {
        DomainError::ServerStart {
            addr: self.addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ServerInstance for DnsServer {
    async fn start(&self) -> Result<RunError, DomainError> {
        let mut running = self.running.lock().await;
        if running.is_some() || self.local_addr.get().is_some() {
            return Err(self.start_error("instance already started"));
        }

        let udp_socket = socket::create_udp_socket(self.addr).map_err(|e| self.start_error(e))?;
        let bound = udp_socket.local_addr().map_err(|e| self.start_error(e))?;
        let tcp_listener = socket::create_tcp_listener(bound).map_err(|e| self.start_error(e))?;
        let probe_socket = socket::create_probe_socket(bound).map_err(|e| self.start_error(e))?;
        let probe_bound = probe_socket.local_addr().map_err(|e| self.start_error(e))?;
        let _ = self.local_addr.set(bound);
        let _ = self.probe_addr.set(probe_bound);

        let cancel = CancellationToken::new();
        let (error_tx, error_rx) = oneshot::channel();

        let mut loops = JoinSet::new();
        loops.spawn(udp::serve_udp(
            Arc::new(udp_socket),
            self.handler.clone(),
            cancel.clone(),
        ));
        loops.spawn(tcp::serve_tcp(
            tcp_listener,
            self.handler.clone(),
            cancel.clone(),
        ));

        loops.spawn(udp::serve_udp(
            Arc::new(probe_socket),
            self.handler.clone(),
            cancel.clone(),
        ));

        let supervisor_cancel = cancel.clone();
        let supervisor = tokio::spawn(async move {
            let mut error_tx = Some(error_tx);
            while let Some(joined) = loops.join_next().await {
                if supervisor_cancel.is_cancelled() {
                    continue;
                }
                let reason = match joined {
                    Ok(Ok(())) => "listener loop exited".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                error!(addr = %bound, reason = %reason, "DNS listener crashed");
                supervisor_cancel.cancel();
                if let Some(tx) = error_tx.take() {
                    let _ = tx.send(DomainError::ServerCrashed {
                        addr: bound.to_string(),
                        reason,
                    });
                }
            }
        });

        *running = Some(Running { cancel, supervisor });
        info!(addr = %bound, probe_addr = %probe_bound, "DNS server listening on UDP and TCP");
        Ok(error_rx)
    }

    async fn stop(&self) -> Result<(), DomainError> {
        let Some(running) = self.running.lock().await.take() else {
            return Err(DomainError::ServerNotRunning);
        };

        running.cancel.cancel();
        running
            .supervisor
            .await
            .map_err(|e| DomainError::ServerCrashed {
                addr: self.addr.to_string(),
                reason: e.to_string(),
            })?;

        info!(addr = %self.local_addr().unwrap_or(self.addr), "DNS server stopped");
        Ok(())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    fn probe_addr(&self) -> Option<SocketAddr> {
        self.probe_addr.get().copied()
    }
}
