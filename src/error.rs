//! Error types for the fetch layer and manifest parsing
//!
//! The inspector never lets these escape an inspection run: it catches them
//! per manifest, entry, or probe and files them as errors, warnings, or
//! per-record `error` strings.

use thiserror::Error;

/// How a transport request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, interrupted body, or other failure a relay cannot fix
    Network,
    /// The direct route was refused (cross-origin block, connection refused).
    /// A relay may still reach the target.
    Cors,
    /// The server answered with a non-2xx status
    Http,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network-error"),
            FailureKind::Cors => write!(f, "cors-error"),
            FailureKind::Http => write!(f, "http-error"),
        }
    }
}

/// Failure reported by a [`crate::fetch::Transport`]
#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Errors from [`crate::fetch::Fetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Cannot use proxy with localhost URL: {0}. Local servers must be reached directly.")]
    ProxyForLocal(String),

    #[error(
        "Failed to reach local server at {url}. Common causes:\n  \
         1. The server is not running\n  \
         2. The server is not reachable from this machine\n  \
         3. The port is wrong\n\
         Original error: {detail}"
    )]
    LocalUnreachable { url: String, detail: String },

    #[error("Invalid URL for proxy: '{0}' (must start with http)")]
    InvalidProxyTarget(String),

    #[error("Proxy request failed for {url}: {detail}")]
    Proxy { url: String, detail: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Terminal manifest problems
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to parse llms.txt as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required field: site")]
    MissingSite,
}
