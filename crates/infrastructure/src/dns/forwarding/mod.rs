mod wire;

pub use wire::{cap_ttls, min_ttl, parse_message, serialize_message, truncate_for};
