// Parameters for the scan core and for the benchmark driver.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bounds on the driver's input, past which a run is refused.
pub const MAX_ITEMS: usize = 10_000_000;
pub const MAX_THREADS: usize = 32;

/// Worker pool setup for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub threads: usize,
    /// Pin worker `i` to core `i mod cores`.
    pub pin_threads: bool,
}

impl ScanConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            pin_threads: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(threads)
    }
}

/// Everything the `prefix_sum` driver needs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub items: usize,
    pub threads: usize,
    #[serde(default)]
    pub show_data: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub pin_threads: bool,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items > MAX_ITEMS {
            return Err(ConfigError::TooManyItems {
                items: self.items,
                limit: MAX_ITEMS,
            });
        }
        if self.threads > MAX_THREADS {
            return Err(ConfigError::TooManyThreads {
                threads: self.threads,
                limit: MAX_THREADS,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.items < self.threads {
            return Err(ConfigError::TooFewItems {
                len: self.items,
                workers: self.threads,
            });
        }
        Ok(())
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            threads: self.threads,
            pin_threads: self.pin_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(items: usize, threads: usize) -> RunConfig {
        RunConfig {
            items,
            threads,
            show_data: false,
            seed: None,
            pin_threads: false,
        }
    }

    #[test]
    fn test_validate_limits() {
        assert_eq!(run(1000, 8).validate(), Ok(()));
        assert_eq!(run(MAX_ITEMS, MAX_THREADS).validate(), Ok(()));
        assert_eq!(
            run(MAX_ITEMS + 1, 4).validate(),
            Err(ConfigError::TooManyItems {
                items: MAX_ITEMS + 1,
                limit: MAX_ITEMS
            })
        );
        assert_eq!(
            run(100, 33).validate(),
            Err(ConfigError::TooManyThreads {
                threads: 33,
                limit: MAX_THREADS
            })
        );
        assert_eq!(run(10, 0).validate(), Err(ConfigError::NoWorkers));
        assert_eq!(
            run(2, 3).validate(),
            Err(ConfigError::TooFewItems { len: 2, workers: 3 })
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"items": 16, "threads": 4}"#).unwrap();
        assert_eq!(config, run(16, 4));
        assert_eq!(config.scan_config(), ScanConfig::new(4));
    }

    #[test]
    fn test_default_has_a_worker() {
        assert!(ScanConfig::default().threads >= 1);
    }
}
