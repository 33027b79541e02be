use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::CachePolicy;
use crate::catalog::{BeatSaverConfig, MusicBrainzConfig};
use crate::matcher::MatcherConfig;
use crate::searcher::SearcherConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub searcher: SearcherConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub musicbrainz: MusicBrainzConfig,
    #[serde(default)]
    pub beatsaver: BeatSaverConfig,
}

/// Remote call cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// SQLite database file. Relative paths resolve against the working directory.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub policy: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            policy: CachePolicy::default(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("unitunes-cache.db")
}

/// Local playlist storage
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Directory holding one JSON file per playlist.
    #[serde(default = "default_playlist_dir")]
    pub playlist_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            playlist_dir: default_playlist_dir(),
        }
    }
}

fn default_playlist_dir() -> PathBuf {
    PathBuf::from("playlists")
}
