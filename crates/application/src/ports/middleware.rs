use super::DnsHandler;
use std::sync::Arc;

/// Wraps a handler and returns a handler.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn wrap(&self, next: Arc<dyn DnsHandler>) -> Arc<dyn DnsHandler>;
}
