use clap::Parser;
use ferrous_relay_domain::{CliOverrides, DomainError};
use ferrous_relay_infrastructure::dns::metrics::CounterMetrics;
use ferrous_relay_jobs::LoopEvent;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "ferrous-relay")]
#[command(version)]
#[command(about = "Ferrous Relay - filtering DNS forwarder to encrypted upstreams")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address, e.g. 127.0.0.1:5353
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        listen_address: cli.listen.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;

    bootstrap::init_logging(&config);
    info!("Starting Ferrous Relay v{}", env!("CARGO_PKG_VERSION"));

    let services = di::RelayServices::new(&config)?;
    let shutdown = CancellationToken::new();

    let mut handle = match services.reload_loop.start(&shutdown).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };
    info!(addr = ?handle.active_addr(), "Ferrous Relay ready");

    let outcome = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutdown requested");
                break None;
            }
            event = handle.next_event() => match event {
                LoopEvent::ReloadFailed(e) => {
                    warn!(error = %e, "Reload failed, still serving previous instance");
                }
                LoopEvent::Exited(fatal) => break fatal,
            },
        }
    };

    shutdown.cancel();
    let stopped = handle.stop().await;

    if let Some(counters) = &services.counters {
        log_summary(counters);
    }

    exit_status(outcome, stopped)
}

/// A fatal loop error takes precedence over a failure while stopping.
fn exit_status(
    outcome: Option<DomainError>,
    stopped: Result<(), DomainError>,
) -> anyhow::Result<()> {
    if let Err(e) = &stopped {
        error!(error = %e, "Failed to stop server cleanly");
    }

    match outcome {
        Some(e) => {
            error!(error = %e, "Server stopped on fatal error");
            Err(e.into())
        }
        None => {
            stopped?;
            info!("Server shutdown complete");
            Ok(())
        }
    }
}

fn log_summary(counters: &CounterMetrics) {
    let sizes = counters.filter_sizes_snapshot();
    info!(
        requests = counters.requests(),
        responses = counters.responses(),
        cache_hits = counters.cache_hits(),
        cache_misses = counters.cache_misses(),
        cache_inserts = counters.cache_inserts(),
        cache_expirations = counters.cache_expirations(),
        cache_evictions = counters.cache_evictions(),
        blocked_hostnames = sizes.hostnames,
        blocked_ips = sizes.ips,
        blocked_prefixes = sizes.prefixes,
        "Metrics summary"
    );
}
