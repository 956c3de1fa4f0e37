//! Parallel inclusive prefix sum over a fixed pool of worker threads.
//!
//! [`parallel_prefix_sum`] produces the same result as a left-to-right
//! sequential scan, using chunked local scans, a single boundary combine
//! step and carry propagation, separated by two barriers.

pub mod config;
pub mod data;
pub mod error;
pub mod reference;
pub mod scan;

pub use config::{RunConfig, ScanConfig};
pub use error::{ConfigError, ScanError};
pub use reference::{check_result, first_mismatch, sequential_prefix_sum};
pub use scan::{parallel_prefix_sum, parallel_prefix_sum_with, Chunk, Partition, Phase};
