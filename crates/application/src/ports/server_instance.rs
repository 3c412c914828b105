use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Resolves with an error if a started instance dies on its own.
/// Closed without a value when the instance is stopped normally.
pub type RunError = oneshot::Receiver<DomainError>;

/// One complete serving stack (filter, cache, chain, listener).
#[async_trait]
pub trait ServerInstance: Send + Sync {
    async fn start(&self) -> Result<RunError, DomainError>;

    /// Closes the listener and waits for the accept loops to exit.
    async fn stop(&self) -> Result<(), DomainError>;

    /// Bound address, once started.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// Address answered by this instance alone, once started. `local_addr`
    /// may be shared with a predecessor through port reuse.
    fn probe_addr(&self) -> Option<SocketAddr>;
}

#[async_trait]
pub trait InstanceFactory: Send + Sync {
    /// Build a fresh, not yet started instance. Remote block lists are
    /// downloaded only when `fetch_remote` is set.
    async fn build(&self, fetch_remote: bool) -> Result<Box<dyn ServerInstance>, DomainError>;
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn check(&self, addr: SocketAddr, cancel: &CancellationToken)
        -> Result<(), DomainError>;
}
