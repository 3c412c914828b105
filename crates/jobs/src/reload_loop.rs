//! Owns the active server instance and periodically replaces it with a
//! freshly built one.
//!
//! A successor is built, started and (optionally) liveness-checked on its
//! own probe address before the predecessor is stopped. Any failure while bringing up a successor
//! leaves the predecessor serving and is reported as a reload error; the
//! same failure during the very first bring-up is fatal.

use arc_swap::ArcSwapOption;
use ferrous_relay_application::ports::{InstanceFactory, LivenessProbe, RunError, ServerInstance};
use ferrous_relay_domain::DomainError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub struct ReloadLoop {
    factory: Arc<dyn InstanceFactory>,
    update_period: Option<Duration>,
    liveness: Option<Arc<dyn LivenessProbe>>,
}

impl ReloadLoop {
    pub fn new(factory: Arc<dyn InstanceFactory>) -> Self {
        Self {
            factory,
            update_period: None,
            liveness: None,
        }
    }

    /// `None` disables periodic rebuilds.
    pub fn with_update_period(mut self, period: Option<Duration>) -> Self {
        self.update_period = period.filter(|p| !p.is_zero());
        self
    }

    pub fn with_liveness_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.liveness = Some(probe);
        self
    }

    /// Brings up the first instance from static entries only, then hands the
    /// running instance to a background task. Fails if that first instance
    /// cannot be built, started or verified.
    pub async fn start(self, parent: &CancellationToken) -> Result<ReloadHandle, DomainError> {
        let cancel = parent.child_token();

        info!("Starting first server instance");
        let (instance, run_error) = self.bring_up(false, &cancel).await?;

        let active_addr = Arc::new(ArcSwapOption::from(instance.local_addr().map(Arc::new)));
        let (fatal_tx, fatal_rx) = oneshot::channel();
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();

        info!(
            addr = ?instance.local_addr(),
            update_period_secs = self.update_period.map(|p| p.as_secs()),
            "Server instance running"
        );

        let task = tokio::spawn(self.run(
            instance,
            run_error,
            cancel.clone(),
            active_addr.clone(),
            fatal_tx,
            reload_tx,
        ));

        Ok(ReloadHandle {
            cancel,
            task,
            active_addr,
            fatal: Some(fatal_rx),
            reload_errors: reload_rx,
        })
    }

    async fn bring_up(
        &self,
        fetch_remote: bool,
        cancel: &CancellationToken,
    ) -> Result<(Box<dyn ServerInstance>, RunError), DomainError> {
        let instance = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DomainError::Cancelled),
            built = self.factory.build(fetch_remote) => built?,
        };

        let run_error = instance.start().await?;

        if let Some(probe) = &self.liveness {
            let checked = match instance.probe_addr() {
                Some(addr) => probe.check(addr, cancel).await,
                None => Err(DomainError::ServerNotRunning),
            };
            if let Err(e) = checked {
                if let Err(stop_error) = instance.stop().await {
                    warn!(error = %stop_error, "Failed to stop unverified instance");
                }
                return Err(e);
            }
        }

        Ok((instance, run_error))
    }

    async fn run(
        self,
        mut active: Box<dyn ServerInstance>,
        mut run_error: RunError,
        cancel: CancellationToken,
        active_addr: Arc<ArcSwapOption<SocketAddr>>,
        fatal_tx: oneshot::Sender<DomainError>,
        reload_tx: mpsc::UnboundedSender<DomainError>,
    ) -> Box<dyn ServerInstance> {
        loop {
            let timer = async {
                match self.update_period {
                    Some(period) => tokio::time::sleep(period).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Reload loop cancelled");
                    return active;
                }
                crashed = &mut run_error => {
                    let error = crashed.unwrap_or_else(|_| DomainError::ServerCrashed {
                        addr: active
                            .local_addr()
                            .map(|addr| addr.to_string())
                            .unwrap_or_default(),
                        reason: "instance exited without reporting an error".to_string(),
                    });
                    error!(error = %error, "Active server instance failed");
                    let _ = fatal_tx.send(error);
                    return active;
                }
                _ = timer => {
                    info!("Rebuilding server instance");
                    match self.bring_up(true, &cancel).await {
                        Ok((successor, successor_run_error)) => {
                            let previous = std::mem::replace(&mut active, successor);
                            run_error = successor_run_error;
                            active_addr.store(active.local_addr().map(Arc::new));

                            if let Err(e) = previous.stop().await {
                                warn!(error = %e, "Failed to stop previous server instance");
                            }
                            info!(addr = ?active.local_addr(), "Server instance replaced");
                        }
                        Err(DomainError::Cancelled) => {
                            info!("Reload cancelled, keeping current instance");
                            return active;
                        }
                        Err(e) => {
                            warn!(error = %e, "Reload failed, keeping current instance");
                            let _ = reload_tx.send(e);
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum LoopEvent {
    ReloadFailed(DomainError),
    /// The loop has ended, with the fatal error if there was one.
    Exited(Option<DomainError>),
}

async fn wait_fatal(slot: &mut Option<oneshot::Receiver<DomainError>>) -> Option<DomainError> {
    match slot.as_mut() {
        Some(receiver) => {
            let outcome = receiver.await.ok();
            *slot = None;
            outcome
        }
        None => std::future::pending().await,
    }
}

/// Control surface of a running reload loop.
pub struct ReloadHandle {
    cancel: CancellationToken,
    task: JoinHandle<Box<dyn ServerInstance>>,
    active_addr: Arc<ArcSwapOption<SocketAddr>>,
    fatal: Option<oneshot::Receiver<DomainError>>,
    reload_errors: mpsc::UnboundedReceiver<DomainError>,
}

impl ReloadHandle {
    /// Address of the instance currently serving traffic.
    pub fn active_addr(&self) -> Option<SocketAddr> {
        self.active_addr.load_full().map(|addr| *addr)
    }

    /// Resolves once with the error that ended the loop, or `None` when the
    /// loop ended without one. Pending forever after it has resolved.
    pub async fn fatal_error(&mut self) -> Option<DomainError> {
        wait_fatal(&mut self.fatal).await
    }

    /// Next recoverable reload failure; `None` once the loop has exited.
    pub async fn next_reload_error(&mut self) -> Option<DomainError> {
        self.reload_errors.recv().await
    }

    /// Whichever comes first: a recoverable reload failure or the end of
    /// the loop.
    pub async fn next_event(&mut self) -> LoopEvent {
        tokio::select! {
            Some(error) = self.reload_errors.recv() => LoopEvent::ReloadFailed(error),
            fatal = wait_fatal(&mut self.fatal) => LoopEvent::Exited(fatal),
        }
    }

    /// Cancels the loop, waits for it to exit, then stops the active instance.
    pub async fn stop(self) -> Result<(), DomainError> {
        self.cancel.cancel();
        let active = self
            .task
            .await
            .map_err(|e| DomainError::IoError(format!("Reload loop task failed: {}", e)))?;

        active.stop().await?;
        info!("Reload loop stopped");
        Ok(())
    }
}
