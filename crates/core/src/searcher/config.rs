//! Searcher configuration types.

use serde::{Deserialize, Serialize};

/// Default score at which the searcher stops issuing further queries.
pub const EARLY_STOP_THRESHOLD: f64 = 0.8;

/// Query budget and early-stop threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearcherConfig {
    /// Stop once any candidate scores at or above this.
    #[serde(default = "default_early_stop_threshold")]
    pub early_stop_threshold: f64,
    /// Maximum queries issued per search.
    #[serde(default = "default_max_queries")]
    pub max_queries: u32,
}

fn default_early_stop_threshold() -> f64 {
    EARLY_STOP_THRESHOLD
}

fn default_max_queries() -> u32 {
    5
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            early_stop_threshold: default_early_stop_threshold(),
            max_queries: default_max_queries(),
        }
    }
}
