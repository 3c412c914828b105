use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamType {
    #[default]
    Dot,
    Doh,
}

impl UpstreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamType::Dot => "dot",
            UpstreamType::Doh => "doh",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(rename = "type", default)]
    pub upstream_type: UpstreamType,

    #[serde(default = "default_providers")]
    pub dot_providers: Vec<String>,

    #[serde(default = "default_providers")]
    pub doh_providers: Vec<String>,

    /// Providers queried over plain UDP once every encrypted attempt failed
    #[serde(default)]
    pub plaintext_providers: Vec<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub ipv6: bool,
}

impl UpstreamConfig {
    pub fn primary_providers(&self) -> &[String] {
        match self.upstream_type {
            UpstreamType::Dot => &self.dot_providers,
            UpstreamType::Doh => &self.doh_providers,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            upstream_type: UpstreamType::default(),
            dot_providers: default_providers(),
            doh_providers: default_providers(),
            plaintext_providers: Vec::new(),
            timeout_ms: default_timeout_ms(),
            ipv6: false,
        }
    }
}

fn default_providers() -> Vec<String> {
    vec!["cloudflare".to_string()]
}

fn default_timeout_ms() -> u64 {
    5000
}
