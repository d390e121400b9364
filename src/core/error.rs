use std::io;
use thiserror::Error;

/// Unified error type for the Health Buddy gateway
#[derive(Error, Debug)]
pub enum AgentError {
    /// Backend API errors (unexpected status, unusable response body)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound envelope could not be parsed as structured data
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Inbound envelope carried a method we do not serve
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// No credential/model configured; permanent for this instance
    #[error("Model backend is not configured")]
    BackendUnavailable,

    /// The backend call failed mid-flight (timeout, quota, bad payload)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The model reply tripped the off-topic post-filter
    #[error("Model reply violated the topic policy")]
    PolicyViolation,

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Generation(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AgentError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            AgentError::Api(format!("API returned error status: {}", err))
        } else {
            AgentError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for AgentError {
    fn from(err: serde_yml::Error) -> Self {
        AgentError::Serialization(format!("YAML error: {}", err))
    }
}
