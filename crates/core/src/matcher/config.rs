//! Matcher configuration types.

use serde::{Deserialize, Serialize};

/// Default acceptance threshold: `matches` requires a score above this.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Scoring weights and thresholds.
///
/// Name, artist and album weights are relative to each other; only the
/// components both tracks can be compared on take part in the average.
/// Duration blends into that average with its own weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_name_weight")]
    pub name_weight: f64,
    #[serde(default = "default_artist_weight")]
    pub artist_weight: f64,
    #[serde(default = "default_album_weight")]
    pub album_weight: f64,
    /// Share of the final score given to the duration bonus (0.0-1.0).
    #[serde(default = "default_duration_weight")]
    pub duration_weight: f64,
    /// Length difference (seconds) at which the duration bonus reaches zero.
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance_secs: u32,
    /// Artist pairs scoring below this are treated as unmatched.
    #[serde(default = "default_artist_pair_floor")]
    pub artist_pair_floor: f64,
    /// Scores strictly above this are considered the same track.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

fn default_name_weight() -> f64 {
    0.6
}

fn default_artist_weight() -> f64 {
    0.3
}

fn default_album_weight() -> f64 {
    0.1
}

fn default_duration_weight() -> f64 {
    0.1
}

fn default_duration_tolerance() -> u32 {
    10
}

fn default_artist_pair_floor() -> f64 {
    0.5
}

fn default_match_threshold() -> f64 {
    MATCH_THRESHOLD
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            name_weight: default_name_weight(),
            artist_weight: default_artist_weight(),
            album_weight: default_album_weight(),
            duration_weight: default_duration_weight(),
            duration_tolerance_secs: default_duration_tolerance(),
            artist_pair_floor: default_artist_pair_floor(),
            match_threshold: default_match_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: MatcherConfig = toml::from_str("").unwrap();
        assert_eq!(config, MatcherConfig::default());
        assert_eq!(config.match_threshold, MATCH_THRESHOLD);
    }

    #[test]
    fn test_partial_override() {
        let config: MatcherConfig = toml::from_str("match_threshold = 0.5").unwrap();
        assert_eq!(config.match_threshold, 0.5);
        assert_eq!(config.name_weight, 0.6);
    }
}
