use ferrous_relay_application::ports::{DnsHandler, Middleware};
use std::sync::Arc;
use tracing::info;

/// Composes middlewares around a terminal handler. Middlewares are added
/// outermost first; the first one added is the first to see a request.
pub struct ChainBuilder {
    terminal: Arc<dyn DnsHandler>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl ChainBuilder {
    pub fn new(terminal: Arc<dyn DnsHandler>) -> Self {
        Self {
            terminal,
            middlewares: Vec::new(),
        }
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    pub fn build(self) -> Arc<dyn DnsHandler> {
        let names: Vec<&'static str> = self.middlewares.iter().map(|m| m.name()).collect();
        info!(chain = ?names, "Building DNS handler chain");

        self.middlewares
            .iter()
            .rev()
            .fold(self.terminal, |inner, middleware| middleware.wrap(inner))
    }
}
