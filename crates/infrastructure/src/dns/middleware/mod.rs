mod cache;
mod chain;
mod filter;
mod log;
mod metrics;

pub use cache::CacheMiddleware;
pub use chain::ChainBuilder;
pub use filter::FilterMiddleware;
pub use log::LogMiddleware;
pub use metrics::MetricsMiddleware;
