//! Track similarity scoring.
//!
//! A matcher decides whether two track records, usually from different
//! catalogs, describe the same recording.

mod config;
mod default_matcher;
mod traits;

pub use config::{MatcherConfig, MATCH_THRESHOLD};
pub use default_matcher::{DefaultMatcher, ScoreBreakdown};
pub use traits::TrackMatcher;
