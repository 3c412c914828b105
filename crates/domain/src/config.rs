mod blocking;
mod cache;
mod errors;
mod health;
mod logging;
mod metrics;
mod middleware;
mod root;
mod server;
mod update;
mod upstream;

pub use blocking::{BlockingConfig, SourceOverride};
pub use cache::{CacheConfig, CacheType};
pub use errors::ConfigError;
pub use health::HealthConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use metrics::{MetricsConfig, MetricsType};
pub use middleware::MiddlewareConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use update::UpdateConfig;
pub use upstream::{UpstreamConfig, UpstreamType};
