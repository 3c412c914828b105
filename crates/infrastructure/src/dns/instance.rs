//! Builds one complete serving stack per reload: a fresh filter engine,
//! a fresh cache, the handler chain and an unstarted listener.

use crate::dns::block_filter::{BlockFilterEngine, SnapshotBuilder};
use crate::dns::cache::build_cache;
use crate::dns::middleware::{
    CacheMiddleware, ChainBuilder, FilterMiddleware, LogMiddleware, MetricsMiddleware,
};
use crate::dns::server::DnsServer;
use async_trait::async_trait;
use ferrous_relay_application::ports::{
    BlockFilterPort, DnsExchanger, InstanceFactory, MetricsPort, ServerInstance,
};
use ferrous_relay_application::use_cases::ForwardQueryUseCase;
use ferrous_relay_domain::{CacheConfig, DomainError, FilterSnapshot, MiddlewareConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DnsInstanceFactory {
    listen_addr: SocketAddr,
    builder: SnapshotBuilder,
    exchanger: Arc<dyn DnsExchanger>,
    metrics: Arc<dyn MetricsPort>,
    cache: CacheConfig,
    middleware: MiddlewareConfig,
}

impl DnsInstanceFactory {
    pub fn new(
        listen_addr: SocketAddr,
        builder: SnapshotBuilder,
        exchanger: Arc<dyn DnsExchanger>,
        metrics: Arc<dyn MetricsPort>,
    ) -> Self {
        Self {
            listen_addr,
            builder,
            exchanger,
            metrics,
            cache: CacheConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_middleware(mut self, middleware: MiddlewareConfig) -> Self {
        self.middleware = middleware;
        self
    }
}

#[async_trait]
impl InstanceFactory for DnsInstanceFactory {
    async fn build(&self, fetch_remote: bool) -> Result<Box<dyn ServerInstance>, DomainError> {
        let report = self.builder.build(fetch_remote).await;
        for error in &report.errors {
            warn!(error = %error, "Block list source skipped");
        }

        let engine = Arc::new(BlockFilterEngine::new(self.metrics.clone()));
        engine.update(FilterSnapshot::from(report.lists));

        let cache = build_cache(&self.cache, self.metrics.clone());
        let terminal = Arc::new(ForwardQueryUseCase::new(self.exchanger.clone()));

        let handler = ChainBuilder::new(terminal)
            .with(FilterMiddleware::new(engine, cache.clone()))
            .with(CacheMiddleware::new(cache))
            .with(MetricsMiddleware::new(self.metrics.clone()))
            .with(LogMiddleware::new(&self.middleware))
            .build();

        info!(addr = %self.listen_addr, fetch_remote, "Server instance built");
        Ok(Box::new(DnsServer::new(self.listen_addr, handler)))
    }
}
