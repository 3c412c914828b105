//! Concurrent download of every enabled block list of one kind.

use ferrous_relay_application::ports::ListFetcher;
use ferrous_relay_domain::{BlockCategory, DomainError, ListKind};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// One remote list to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSource {
    pub category: BlockCategory,
    pub kind: ListKind,
    pub url: String,
}

/// A failed download, attributed to its source.
#[derive(Debug, Clone)]
pub struct SourceError {
    pub source: ListSource,
    pub error: DomainError,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} list ({}): {}",
            self.source.category, self.source.kind, self.source.url, self.error
        )
    }
}

/// What one download task reports. Lines and error are independent, so an
/// empty list that downloaded fine is distinct from a failed download.
struct TaskReport {
    lines: Vec<String>,
    error: Option<DomainError>,
}

/// Union of everything fetched plus every per-source failure.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub entries: Vec<String>,
    pub errors: Vec<SourceError>,
}

#[derive(Clone)]
pub struct BlocklistFetcher {
    fetcher: Arc<dyn ListFetcher>,
}

impl BlocklistFetcher {
    pub fn new(fetcher: Arc<dyn ListFetcher>) -> Self {
        Self { fetcher }
    }

    /// Spawns one task per source and waits for all of them. A failing
    /// source never cancels its siblings.
    pub async fn fetch_all(&self, sources: Vec<ListSource>) -> FetchReport {
        let mut tasks = JoinSet::new();

        for (index, source) in sources.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let url = source.url.clone();
            tasks.spawn(async move {
                let task_report = match fetcher.fetch_lines(&url).await {
                    Ok(lines) => TaskReport { lines, error: None },
                    Err(e) => TaskReport {
                        lines: Vec::new(),
                        error: Some(e),
                    },
                };
                (index, task_report)
            });
        }

        let mut pending: Vec<Option<ListSource>> = sources.into_iter().map(Some).collect();
        let mut report = FetchReport::default();

        while let Some(joined) = tasks.join_next().await {
            let (index, task_report) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "Block list fetch task panicked");
                    continue;
                }
            };
            let Some(source) = pending.get_mut(index).and_then(Option::take) else {
                continue;
            };

            if let Some(error) = task_report.error {
                warn!(url = %source.url, category = %source.category, error = %error, "Failed to fetch block list");
                report.errors.push(SourceError { source, error });
            } else {
                info!(url = %source.url, entries = task_report.lines.len(), "Fetched block list");
            }
            report.entries.extend(task_report.lines);
        }

        for source in pending.into_iter().flatten() {
            report.errors.push(SourceError {
                source,
                error: DomainError::IoError("Fetch task did not complete".to_string()),
            });
        }

        report
    }
}
