use ferrous_relay_domain::Config;
use ferrous_relay_infrastructure::dns::block_filter::{
    BlocklistFetcher, HttpListFetcher, SnapshotBuilder, SnapshotSettings,
};
use ferrous_relay_infrastructure::dns::metrics::{build_metrics, CounterMetrics};
use ferrous_relay_infrastructure::dns::transport::Dialer;
use ferrous_relay_infrastructure::dns::upstream::UpstreamResolver;
use ferrous_relay_infrastructure::dns::{DnsInstanceFactory, DnsLivenessProbe};
use ferrous_relay_jobs::ReloadLoop;
use std::sync::Arc;
use tracing::info;

/// Everything the process runs, wired from one validated `Config`.
pub struct RelayServices {
    pub reload_loop: ReloadLoop,
    pub counters: Option<Arc<CounterMetrics>>,
}

impl RelayServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let (metrics, counters) = build_metrics(config.metrics.metrics_type);

        let dialer = Dialer::new(config.upstream.timeout())?;
        let resolver = Arc::new(UpstreamResolver::from_config(
            &config.upstream,
            &dialer,
            metrics.clone(),
        )?);
        for upstream in resolver.upstreams() {
            info!(
                provider = upstream.provider(),
                endpoint = %upstream.protocol(),
                "Upstream configured"
            );
        }

        let list_fetcher = Arc::new(HttpListFetcher::with_default_client()?);
        let settings = SnapshotSettings::from_config(&config.blocking)?;
        info!(
            sources = settings.sources.len(),
            allowed = settings.allowed_hosts.len(),
            rebinding_protection = settings.rebinding_protection,
            "Block list sources configured"
        );
        let builder = SnapshotBuilder::new(BlocklistFetcher::new(list_fetcher), settings);

        let factory = DnsInstanceFactory::new(
            config.server.socket_addr()?,
            builder,
            resolver,
            metrics,
        )
        .with_cache(config.cache.clone())
        .with_middleware(config.middleware.clone());

        let mut reload_loop =
            ReloadLoop::new(Arc::new(factory)).with_update_period(config.update.period());

        if config.health.check_dns {
            let probe = DnsLivenessProbe::new(&config.health.probe_hostname, config.upstream.timeout())?;
            reload_loop = reload_loop.with_liveness_probe(Arc::new(probe));
        }

        Ok(Self {
            reload_loop,
            counters,
        })
    }
}
