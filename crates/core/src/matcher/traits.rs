//! Matcher trait.

use crate::model::Track;

/// Compares two track records.
///
/// Implementations must be pure: no I/O, no hidden state, the same inputs
/// always give the same score. Evaluation sweeps call this millions of times.
pub trait TrackMatcher: Send + Sync {
    /// Name of this matcher for logging.
    fn name(&self) -> &str;

    /// Confidence (0.0-1.0) that both records describe the same track.
    fn similarity(&self, a: &Track, b: &Track) -> f64;

    /// Score a track must exceed to be accepted as a match.
    fn match_threshold(&self) -> f64;

    /// Whether both records describe the same track.
    fn matches(&self, a: &Track, b: &Track) -> bool {
        self.similarity(a, b) > self.match_threshold()
    }
}
