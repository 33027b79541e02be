//! Search result types.

use serde::Serialize;

use crate::model::Track;

/// A catalog track with its similarity to the searched track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTrack {
    pub track: Track,
    /// Similarity (0.0-1.0) to the searched track.
    pub score: f64,
}

/// Everything a search did, for callers that want more than the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Candidates, best first.
    pub results: Vec<ScoredTrack>,
    /// Queries actually sent, in order.
    pub queries_tried: Vec<String>,
    /// True if a confident candidate made the remaining queries unnecessary.
    pub early_stopped: bool,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&ScoredTrack> {
        self.results.first()
    }
}
