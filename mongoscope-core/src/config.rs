//! Sampling configuration.
//!
//! Controls how many documents are fetched per collection for schema
//! analysis. The sample is always bounded and fetched in one round trip;
//! the walker and aggregator place no further limits of their own.

use serde::{Deserialize, Serialize};

/// Configuration for document sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Number of documents to sample per collection
    pub sample_size: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { sample_size: 100 }
    }
}

impl SamplingConfig {
    /// Creates a sampling config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set sample size.
    #[must_use]
    pub fn with_sample_size(mut self, size: u32) -> Self {
        self.sample_size = size;
        self
    }
}
