//! Ferrous Relay Domain Layer
pub mod block_category;
pub mod config;
pub mod dns_protocol;
pub mod errors;
pub mod filter_snapshot;
pub mod fqdn;
pub mod provider;

pub use block_category::{BlockCategory, ListKind};
pub use config::{
    BlockingConfig, CacheConfig, CacheType, CliOverrides, Config, ConfigError, HealthConfig,
    LogFormat, LoggingConfig, MetricsConfig, MetricsType, MiddlewareConfig, ServerConfig,
    SourceOverride, UpdateConfig, UpstreamConfig, UpstreamType,
};
pub use dns_protocol::DnsProtocol;
pub use errors::DomainError;
pub use filter_snapshot::{
    parse_blocked_address, rebinding_prefixes, BlockLists, BlockedAddress, FilterSnapshot,
};
pub use fqdn::{parent_domains, to_fqdn};
pub use provider::Provider;
