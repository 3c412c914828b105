pub mod builder;
pub mod engine;
pub mod fetcher;
pub mod http_fetcher;

pub use builder::{BuildReport, SnapshotBuilder, SnapshotSettings};
pub use engine::BlockFilterEngine;
pub use fetcher::{BlocklistFetcher, FetchReport, ListSource, SourceError};
pub use http_fetcher::HttpListFetcher;
