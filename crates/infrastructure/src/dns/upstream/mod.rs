mod endpoints;
mod query;
mod resolver;

pub use endpoints::{endpoints_for, EndpointKind};
pub use query::exchange_with;
pub use resolver::{Upstream, UpstreamResolver};
