mod block_filter_engine;
mod dns_cache_port;
mod dns_exchanger;
mod dns_handler;
mod list_fetcher;
mod metrics;
mod middleware;
mod server_instance;

pub use block_filter_engine::BlockFilterPort;
pub use dns_cache_port::DnsCachePort;
pub use dns_exchanger::DnsExchanger;
pub use dns_handler::{DnsHandler, DnsRequest, ResponseWriter};
pub use list_fetcher::ListFetcher;
pub use metrics::{DialOutcome, MetricsPort};
pub use middleware::Middleware;
pub use server_instance::{InstanceFactory, LivenessProbe, RunError, ServerInstance};
