use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Failed to fetch block list {url}: {reason}")]
    BlockListFetch { url: String, reason: String },

    #[error("Transport timeout: {server}")]
    TransportTimeout { server: String },

    #[error("Connection refused by {server}: {reason}")]
    TransportConnectionRefused { server: String, reason: String },

    #[error("Transport error with {server}: {reason}")]
    Transport { server: String, reason: String },

    #[error("All upstream servers unreachable")]
    TransportAllServersUnreachable,

    #[error("Response already written")]
    ResponseAlreadyWritten,

    #[error("Server failed to start on {addr}: {reason}")]
    ServerStart { addr: String, reason: String },

    #[error("Server on {addr} stopped unexpectedly: {reason}")]
    ServerCrashed { addr: String, reason: String },

    #[error("Server is not running")]
    ServerNotRunning,

    #[error("Liveness check failed after {attempts} attempts: {last_error}")]
    LivenessCheckFailed { attempts: u32, last_error: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
