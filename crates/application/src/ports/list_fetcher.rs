use async_trait::async_trait;
use ferrous_relay_domain::DomainError;

/// Retrieves one newline-delimited block list.
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Non-empty lines of the list at `url`, whitespace trimmed.
    async fn fetch_lines(&self, url: &str) -> Result<Vec<String>, DomainError>;
}
