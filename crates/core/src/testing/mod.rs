//! Testing utilities and mock implementations.
//!
//! This module provides a mock catalog implementing every capability trait,
//! allowing searcher, reconciler and evaluation tests without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use unitunes_core::testing::{MockCatalog, fixtures};
//!
//! let catalog = MockCatalog::new(CatalogKind::Ytm).with_queries(["first", "second"]);
//! catalog.set_results("first", vec![fixtures::remote_track(CatalogKind::Ytm, "id", "Song", &["Artist"])]).await;
//! catalog.fail_query("second", "must not be issued").await;
//! ```

mod mock_catalog;

pub use mock_catalog::MockCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::model::{CatalogKind, CatalogUri, Playlist, Track};

    /// A local track with name and artists only.
    pub fn local_track(name: &str, artists: &[&str]) -> Track {
        Track::new(name).with_artists(artists.iter().copied())
    }

    /// A catalog track carrying a single identifier, as returned by a search or pull.
    pub fn remote_track(kind: CatalogKind, id: &str, name: &str, artists: &[&str]) -> Track {
        local_track(name, artists).with_uri(CatalogUri::new(kind, id))
    }

    /// The Beat Saber map 27b65 as returned by a pull.
    pub fn my_hero_map() -> Track {
        let mut track = remote_track(
            CatalogKind::BeatSaber,
            "27b65",
            "My Hero (TV Size)",
            &["MAN WITH A MISSION"],
        )
        .with_length(92);
        track
            .name
            .add_alias("My Hero (TV Size) [Inuyashiki Opening] - MAN WITH A MISSION");
        track
    }

    /// The first Beat Saber search result for "my hero MAN WITH A MISSION".
    pub fn my_hero_search_result() -> Track {
        remote_track(
            CatalogKind::BeatSaber,
            "1a2b3",
            "My Hero - MAN WITH A MISSION ( Inuyashiki OP )",
            &["MAN WITH A MISSION"],
        )
    }

    /// A playlist linked to `kind` holding `tracks`.
    pub fn playlist(kind: CatalogKind, playlist_id: &str, tracks: Vec<Track>) -> Playlist {
        let mut playlist = Playlist::new("test playlist");
        playlist.link(kind, playlist_id);
        playlist.tracks = tracks;
        playlist
    }
}
