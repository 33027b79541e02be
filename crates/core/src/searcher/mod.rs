//! Track search across catalogs.
//!
//! The searcher turns a track into catalog queries, scores what comes back
//! with a [`TrackMatcher`](crate::matcher::TrackMatcher) and ranks it.

mod adaptive;
mod config;
mod types;

pub use adaptive::Searcher;
pub use config::{SearcherConfig, EARLY_STOP_THRESHOLD};
pub use types::{ScoredTrack, SearchOutcome};
