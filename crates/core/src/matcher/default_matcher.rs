//! Heuristic track matcher.
//!
//! Scores two tracks by comparing name, artists, albums and length.
//! Works purely on metadata, no I/O.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matcher::config::MatcherConfig;
use crate::matcher::traits::TrackMatcher;
use crate::model::{AliasedValue, Track};
use crate::normalize::{normalize, ratio, strip_brackets, title_variants};

/// Per-component scores behind a similarity value.
///
/// `None` means the component could not be compared (no data on either side)
/// and took no part in the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name: f64,
    pub artists: Option<f64>,
    pub albums: Option<f64>,
    pub duration: Option<f64>,
    pub score: f64,
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
        }
        write!(
            f,
            "{:.2} (name {:.2}, artists {}, albums {}, duration {})",
            self.score,
            self.name,
            part(self.artists),
            part(self.albums),
            part(self.duration)
        )
    }
}

/// Default metadata matcher.
///
/// - Name: best ratio over every spelling pair, so extra aliases never hurt.
/// - Artists: greedy best-pair assignment, normalized by the larger artist count.
///   Pairs below `artist_pair_floor` count as unmatched.
/// - Albums: best ratio over every album spelling pair, 0 if only one side has albums.
/// - Duration: bonus decaying with the length difference, a tie-breaker only.
#[derive(Debug, Clone, Default)]
pub struct DefaultMatcher {
    config: MatcherConfig,
}

impl DefaultMatcher {
    /// Create a matcher with default weights and thresholds.
    pub fn new() -> Self {
        Self {
            config: MatcherConfig::default(),
        }
    }

    /// Create a matcher with custom config.
    pub fn with_config(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Score two tracks and report every component.
    pub fn explain(&self, a: &Track, b: &Track) -> ScoreBreakdown {
        let name = Self::name_similarity(a, b);
        let artists = self.artist_similarity(&a.artists, &b.artists);
        let albums = Self::album_similarity(&a.albums, &b.albums);
        let duration = self.duration_bonus(a.length, b.length);

        let mut weighted = self.config.name_weight * name;
        let mut total = self.config.name_weight;
        if let Some(s) = artists {
            weighted += self.config.artist_weight * s;
            total += self.config.artist_weight;
        }
        if let Some(s) = albums {
            weighted += self.config.album_weight * s;
            total += self.config.album_weight;
        }

        let base = if total > 0.0 { weighted / total } else { 0.0 };
        // Lengths only pull the score up towards the bonus, never below `base`
        let score = match duration {
            Some(bonus) => base + self.config.duration_weight * (bonus - base).max(0.0),
            None => base,
        };

        ScoreBreakdown {
            name,
            artists,
            albums,
            duration,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Normalized spellings of every artist name on a track.
    fn artist_spellings(track: &Track) -> Vec<String> {
        let mut spellings: Vec<String> = Vec::new();
        for artist in &track.artists {
            for value in artist.all().map(normalize) {
                if !value.is_empty() && !spellings.contains(&value) {
                    spellings.push(value);
                }
            }
        }
        spellings
    }

    fn name_variants(track: &Track) -> Vec<String> {
        let artists = Self::artist_spellings(track);
        let mut variants: Vec<String> = Vec::new();
        for value in track.name.all() {
            for variant in title_variants(value, &artists) {
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
        }
        variants
    }

    fn name_similarity(a: &Track, b: &Track) -> f64 {
        best_ratio(&Self::name_variants(a), &Self::name_variants(b))
    }

    fn spellings(value: &AliasedValue) -> Vec<String> {
        let mut spellings: Vec<String> = Vec::new();
        for v in value.all().map(normalize) {
            if !v.is_empty() && !spellings.contains(&v) {
                spellings.push(v);
            }
        }
        spellings
    }

    fn artist_similarity(&self, a: &[AliasedValue], b: &[AliasedValue]) -> Option<f64> {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return None,
            (true, false) | (false, true) => return Some(0.0),
            _ => {}
        }

        let a: Vec<Vec<String>> = a.iter().map(Self::spellings).collect();
        let b: Vec<Vec<String>> = b.iter().map(Self::spellings).collect();
        // Canonical side order keeps the greedy assignment symmetric under ties
        let (left, right) = if a <= b { (a, b) } else { (b, a) };

        let mut pairs: Vec<(f64, usize, usize)> = Vec::with_capacity(left.len() * right.len());
        for (i, l) in left.iter().enumerate() {
            for (j, r) in right.iter().enumerate() {
                pairs.push((best_ratio(l, r), i, j));
            }
        }
        pairs.sort_by(|x, y| y.0.partial_cmp(&x.0).unwrap_or(Ordering::Equal));

        let mut left_used = vec![false; left.len()];
        let mut right_used = vec![false; right.len()];
        let mut total = 0.0;
        for (score, i, j) in pairs {
            if left_used[i] || right_used[j] {
                continue;
            }
            left_used[i] = true;
            right_used[j] = true;
            // A weak pairing is an unmatched artist, not a partial one
            if score >= self.config.artist_pair_floor {
                total += score;
            }
        }

        Some(total / left.len().max(right.len()) as f64)
    }

    fn album_spellings(albums: &[AliasedValue]) -> Vec<String> {
        let mut spellings: Vec<String> = Vec::new();
        for album in albums {
            for value in album.all() {
                for v in [normalize(value), normalize(&strip_brackets(value))] {
                    if !v.is_empty() && !spellings.contains(&v) {
                        spellings.push(v);
                    }
                }
            }
        }
        spellings
    }

    fn album_similarity(a: &[AliasedValue], b: &[AliasedValue]) -> Option<f64> {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => None,
            (true, false) | (false, true) => Some(0.0),
            _ => Some(best_ratio(
                &Self::album_spellings(a),
                &Self::album_spellings(b),
            )),
        }
    }

    /// 1.0 for equal lengths, decaying quadratically to 0 at the tolerance.
    fn duration_bonus(&self, a: Option<u32>, b: Option<u32>) -> Option<f64> {
        let (a, b) = (a?, b?);
        let diff = a.abs_diff(b) as f64;
        let tolerance = self.config.duration_tolerance_secs as f64;
        if tolerance <= 0.0 {
            return Some(if diff == 0.0 { 1.0 } else { 0.0 });
        }
        Some((1.0 - (diff / tolerance).powi(2)).max(0.0))
    }
}

/// Highest ratio across every pair of spellings.
fn best_ratio(a: &[String], b: &[String]) -> f64 {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| ratio(x, y)))
        .fold(0.0, f64::max)
}

impl TrackMatcher for DefaultMatcher {
    fn name(&self) -> &str {
        "default"
    }

    fn similarity(&self, a: &Track, b: &Track) -> f64 {
        self.explain(a, b).score
    }

    fn match_threshold(&self) -> f64 {
        self.config.match_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogKind, CatalogUri};

    fn track(name: &str, artists: &[&str]) -> Track {
        Track::new(name).with_artists(artists.iter().copied())
    }

    fn library() -> Vec<Track> {
        vec![
            track("My Hero (TV Size)", &["MAN WITH A MISSION"]),
            track("My Hero - MAN WITH A MISSION ( Inuyashiki OP )", &["MAN WITH A MISSION"]),
            track("Gurenge", &["LiSA"]).with_length(239),
            track("Unravel", &["TK from Ling tosite sigure"])
                .with_albums(["Fantastic Magic"])
                .with_length(238),
            track("Bohemian Rhapsody", &["Queen"]).with_albums(["A Night at the Opera"]),
            track("Under Pressure", &["Queen", "David Bowie"]),
            track("Under Pressure", &["David Bowie", "Queen"]).with_length(248),
            track("Silence", &[]),
        ]
    }

    #[test]
    fn test_symmetry() {
        let matcher = DefaultMatcher::new();
        let tracks = library();
        for a in &tracks {
            for b in &tracks {
                assert_eq!(matcher.similarity(a, b), matcher.similarity(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_self_identity() {
        let matcher = DefaultMatcher::new();
        for t in library() {
            assert_eq!(matcher.similarity(&t, &t), 1.0, "{t}");
            assert!(matcher.matches(&t, &t));
        }
    }

    #[test]
    fn test_score_within_bounds() {
        let matcher = DefaultMatcher::new();
        let tracks = library();
        for a in &tracks {
            for b in &tracks {
                let s = matcher.similarity(a, b);
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn test_alias_duplicating_primary_changes_nothing() {
        let matcher = DefaultMatcher::new();
        let original = track("Gurenge", &["LiSA"]);
        let mut aliased = original.clone();
        aliased.name.aliases.push("Gurenge".to_string());

        for other in library() {
            assert_eq!(
                matcher.similarity(&original, &other),
                matcher.similarity(&aliased, &other)
            );
        }
    }

    #[test]
    fn test_alias_best_match_wins() {
        let matcher = DefaultMatcher::new();
        let native = track("紅蓮華", &["LiSA"]);
        let romanized = track("Gurenge", &["LiSA"]);
        let mut both = native.clone();
        both.name.add_alias("Gurenge");

        assert!(!matcher.matches(&native, &romanized));
        assert!(matcher.matches(&both, &romanized));
    }

    #[test]
    fn test_tv_size_matches_map_title() {
        let matcher = DefaultMatcher::new();
        let a = track("My Hero (TV Size)", &["MAN WITH A MISSION"]);
        let candidate = track(
            "My Hero - MAN WITH A MISSION ( Inuyashiki OP )",
            &["MAN WITH A MISSION"],
        );
        assert!(matcher.matches(&a, &candidate));
        assert!(matcher.similarity(&a, &candidate) >= 0.8);
    }

    #[test]
    fn test_duration_bonus_prefers_close_lengths() {
        let matcher = DefaultMatcher::new();
        let a = track("Hero", &["LiSA"]).with_length(92);
        let close = track("Hero of the Day", &["LiSA"]).with_length(95);
        let far = track("Hero of the Day", &["LiSA"]).with_length(240);

        assert!(matcher.similarity(&a, &close) > matcher.similarity(&a, &far));
    }

    #[test]
    fn test_distant_lengths_never_disqualify() {
        let matcher = DefaultMatcher::new();
        let pairs = [
            ("Hero", "Hero of the Day"),
            ("Hero", "Hero of the Day Tonight"),
            ("Sakura", "Sakura Sakura Song Medley"),
        ];

        for (left, right) in pairs {
            let a = track(left, &["LiSA"]);
            let b = track(right, &["LiSA"]);
            let without_lengths = matcher.similarity(&a, &b);
            assert!(matcher.matches(&a, &b), "{left} vs {right}");

            let a = a.with_length(92);
            let b = b.with_length(240);
            let breakdown = matcher.explain(&a, &b);
            assert_eq!(breakdown.duration, Some(0.0));
            assert_eq!(breakdown.score, without_lengths);
            assert!(matcher.matches(&a, &b), "{left} vs {right} at 92s/240s");
        }

        let exact = track("My Hero", &["MAN WITH A MISSION"]);
        assert!(matcher.matches(&exact.clone().with_length(92), &exact.with_length(240)));
    }

    #[test]
    fn test_missing_album_on_one_side_contributes_zero() {
        let matcher = DefaultMatcher::new();
        let with_album = track("Bohemian Rhapsody", &["Queen"]).with_albums(["A Night at the Opera"]);
        let without = track("Bohemian Rhapsody", &["Queen"]);

        let breakdown = matcher.explain(&with_album, &without);
        assert_eq!(breakdown.albums, Some(0.0));
        assert!(breakdown.score < 1.0);
        assert!(matcher.similarity(&without, &without) >= breakdown.score);
    }

    #[test]
    fn test_artist_order_is_ignored() {
        let matcher = DefaultMatcher::new();
        let a = track("Under Pressure", &["Queen", "David Bowie"]);
        let b = track("Under Pressure", &["David Bowie", "Queen"]);
        assert_eq!(matcher.similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_unmatched_artists_reduce_score() {
        let matcher = DefaultMatcher::new();
        let duet = track("Under Pressure", &["Queen", "David Bowie"]);
        let solo = track("Under Pressure", &["Queen"]);

        let breakdown = matcher.explain(&duet, &solo);
        assert_eq!(breakdown.artists, Some(0.5));
        assert!(matcher.matches(&duet, &solo));
    }

    #[test]
    fn test_different_tracks_do_not_match() {
        let matcher = DefaultMatcher::new();
        let a = track("Bohemian Rhapsody", &["Queen"]);
        let b = track("Gurenge", &["LiSA"]);
        assert!(!matcher.matches(&a, &b));
        assert!(matcher.similarity(&a, &b) < 0.4);
    }

    #[test]
    fn test_same_name_different_artist_rejected() {
        let matcher = DefaultMatcher::new();
        let a = track("Hurt", &["Nine Inch Nails"]);
        let b = track("Hurt", &["Christina Aguilera"]);
        assert!(!matcher.matches(&a, &b));
    }

    #[test]
    fn test_artist_credit_variant_still_matches() {
        let matcher = DefaultMatcher::new();
        let a = track("Halo", &["Beyoncé"]);
        let b = track("Halo", &["Beyonce Knowles"]);
        assert!(matcher.matches(&a, &b));
    }

    #[test]
    fn test_identifiers_do_not_affect_score() {
        let matcher = DefaultMatcher::new();
        let a = track("Gurenge", &["LiSA"]);
        let b = a.clone().with_uri(CatalogUri::new(CatalogKind::Ytm, "abc"));
        assert_eq!(matcher.similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_custom_threshold() {
        let matcher = DefaultMatcher::with_config(MatcherConfig {
            match_threshold: 0.99,
            ..Default::default()
        });
        let a = track("Under Pressure", &["Queen", "David Bowie"]);
        let b = track("Under Pressure", &["Queen"]);
        assert!(!matcher.matches(&a, &b));
    }

    #[test]
    fn test_breakdown_display() {
        let matcher = DefaultMatcher::new();
        let a = track("Gurenge", &["LiSA"]).with_length(239);
        let text = matcher.explain(&a, &a).to_string();
        assert_eq!(text, "1.00 (name 1.00, artists 1.00, albums -, duration 1.00)");
    }
}
