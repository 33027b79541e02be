//! Catalog capabilities and adapters.
//!
//! A catalog is any remote source of track metadata. Capabilities are split
//! into separate traits so an adapter only implements what its API offers.

mod beatsaver;
mod http;
mod musicbrainz;

pub use beatsaver::{BeatSaverCatalog, BeatSaverConfig};
pub use musicbrainz::{MusicBrainzCatalog, MusicBrainzConfig};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{CatalogKind, CatalogUri, Track};

/// Errors that can occur when talking to a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured.
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// Identifier belongs to another catalog.
    #[error("{got} identifier passed to {expected} catalog")]
    WrongCatalog {
        expected: CatalogKind,
        got: CatalogKind,
    },
}

/// Identity shared by every catalog adapter.
pub trait Catalog: Send + Sync {
    /// Name of this catalog for logging and cache namespacing.
    fn name(&self) -> &str;

    /// Identifier space this catalog's tracks live in.
    fn kind(&self) -> CatalogKind;

    /// Reject identifiers from other catalogs.
    fn check_kind(&self, uri: &CatalogUri) -> Result<(), CatalogError> {
        if uri.kind != self.kind() {
            return Err(CatalogError::WrongCatalog {
                expected: self.kind(),
                got: uri.kind,
            });
        }
        Ok(())
    }
}

/// Free-text track search.
#[async_trait]
pub trait Searchable: Catalog {
    /// Queries to try for `track`, most specific first.
    fn query_generator(&self, track: &Track) -> Vec<String> {
        default_queries(track)
    }

    /// Run one query. Every returned track carries this catalog's identifier.
    async fn search_query(&self, query: &str) -> Result<Vec<Track>, CatalogError>;
}

/// Lookup of a single track by identifier.
#[async_trait]
pub trait TrackPullable: Catalog {
    async fn pull_track(&self, uri: &CatalogUri) -> Result<Track, CatalogError>;
}

/// Listing of a remote playlist.
#[async_trait]
pub trait PlaylistPullable: Catalog {
    /// Every track currently in the playlist, in remote order.
    async fn pull_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError>;
}

/// `"name - artist artist"` for the primary name and each alias, then the bare name.
pub fn default_queries(track: &Track) -> Vec<String> {
    let artists = track
        .artists
        .iter()
        .map(|a| a.value.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut queries: Vec<String> = Vec::new();
    let mut push = |query: String| {
        if !query.trim().is_empty() && !queries.contains(&query) {
            queries.push(query);
        }
    };

    for name in track.name.all().map(str::trim).filter(|n| !n.is_empty()) {
        if artists.is_empty() {
            push(name.to_string());
        } else {
            push(format!("{} - {}", name, artists));
        }
    }
    let primary = track.name.value.trim();
    if !primary.is_empty() {
        push(primary.to_string());
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AliasedValue;

    #[test]
    fn test_default_queries() {
        let track = Track::new(AliasedValue::with_aliases("紅蓮華", ["Gurenge"]))
            .with_artists(["LiSA"]);
        assert_eq!(
            default_queries(&track),
            vec![
                "紅蓮華 - LiSA".to_string(),
                "Gurenge - LiSA".to_string(),
                "紅蓮華".to_string(),
            ]
        );
    }

    #[test]
    fn test_default_queries_without_artists() {
        let track = Track::new("Silence");
        assert_eq!(default_queries(&track), vec!["Silence".to_string()]);
    }

    #[test]
    fn test_default_queries_nameless() {
        let track = Track::default().with_artists(["LiSA"]);
        assert!(default_queries(&track).is_empty());
    }
}
