use async_trait::async_trait;
use ferrous_relay_application::ports::ListFetcher;
use ferrous_relay_domain::DomainError;
use std::time::Duration;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads block lists over HTTP(S) with an injected client.
pub struct HttpListFetcher {
    client: reqwest::Client,
}

impl HttpListFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_default_client() -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("ferrous-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| {
                DomainError::ConfigError(format!("Failed to build block list HTTP client: {}", e))
            })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ListFetcher for HttpListFetcher {
    async fn fetch_lines(&self, url: &str) -> Result<Vec<String>, DomainError> {
        let fetch_error = |reason: String| DomainError::BlockListFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let lines: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!(url, lines = lines.len(), "Block list downloaded");
        Ok(lines)
    }
}
