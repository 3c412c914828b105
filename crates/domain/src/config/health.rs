use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    /// Resolve a real name through each freshly started server
    #[serde(default = "default_check_dns")]
    pub check_dns: bool,

    #[serde(default = "default_probe_hostname")]
    pub probe_hostname: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_dns: default_check_dns(),
            probe_hostname: default_probe_hostname(),
        }
    }
}

fn default_check_dns() -> bool {
    true
}

fn default_probe_hostname() -> String {
    "github.com".to_string()
}
