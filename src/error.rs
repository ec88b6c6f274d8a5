// Tue Jan 13 2026 - Alex

use crate::utils::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsshError {
    #[error("discovery failed: {0}")]
    DiscoveryFailed(String),
    #[error("no hosts matched {0:?}")]
    NoHostsMatched(String),
    #[error("could not start transport for {host}: {source}")]
    SpawnFailed {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PsshError {
    /// True for the failures that abort a run before anything is dispatched.
    pub fn is_discovery_failure(&self) -> bool {
        matches!(self, PsshError::DiscoveryFailed(_) | PsshError::NoHostsMatched(_))
    }
}

pub type PsshResult<T> = Result<T, PsshError>;
