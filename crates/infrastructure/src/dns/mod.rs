pub mod block_filter;
pub mod cache;
pub mod forwarding;
pub mod health;
pub mod instance;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod transport;
pub mod upstream;

pub use health::DnsLivenessProbe;
pub use instance::DnsInstanceFactory;
