use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MiddlewareConfig {
    #[serde(default)]
    pub log_requests: bool,

    #[serde(default)]
    pub log_responses: bool,
}
