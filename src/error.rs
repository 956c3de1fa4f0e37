use std::collections::TryReserveError;

use crate::scan::Phase;

/// Invalid scan or driver parameters, detected before any worker starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("array length {len} is smaller than the worker count {workers}")]
    TooFewItems { len: usize, workers: usize },
    #[error("{items} items exceeds the limit of {limit}")]
    TooManyItems { items: usize, limit: usize },
    #[error("{threads} threads exceeds the limit of {limit}")]
    TooManyThreads { threads: usize, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("failed to allocate {what} ({count} entries)")]
    ResourceExhaustion {
        what: &'static str,
        count: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to start a pool of {workers} workers")]
    Synchronization {
        workers: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("worker {worker} panicked during {phase}: {message}")]
    WorkerPanicked {
        worker: usize,
        phase: Phase,
        message: String,
    },
}

impl ScanError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, ScanError::Configuration(_))
    }
}
