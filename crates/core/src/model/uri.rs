//! Catalog-tagged identifiers.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// The catalogs a track or playlist can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Subscription streaming service.
    Spotify,
    /// Video-platform music service.
    Ytm,
    /// Public metadata database.
    #[serde(rename = "musicbrainz")]
    MusicBrainz,
    /// Rhythm-game map repository.
    #[serde(rename = "beatsaber")]
    BeatSaber,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Spotify,
        CatalogKind::Ytm,
        CatalogKind::MusicBrainz,
        CatalogKind::BeatSaber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Spotify => "spotify",
            CatalogKind::Ytm => "ytm",
            CatalogKind::MusicBrainz => "musicbrainz",
            CatalogKind::BeatSaber => "beatsaber",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spotify" => Ok(CatalogKind::Spotify),
            "ytm" | "youtube-music" | "youtube_music" => Ok(CatalogKind::Ytm),
            "musicbrainz" | "mb" => Ok(CatalogKind::MusicBrainz),
            "beatsaber" | "beatsaver" => Ok(CatalogKind::BeatSaber),
            other => Err(ModelError::UnknownCatalog(other.to_string())),
        }
    }
}

/// A catalog-scoped identifier. Equal only when both kind and id match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogUri {
    pub kind: CatalogKind,
    pub id: String,
}

static SPOTIFY_TRACK: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"open\.spotify\.com/(?:intl-[a-z]+/)?track/(?P<id>[A-Za-z0-9]{22})").unwrap(),
        Regex::new(r"^spotify:track:(?P<id>[A-Za-z0-9]{22})$").unwrap(),
        Regex::new(r"^(?P<id>[A-Za-z0-9]{22})$").unwrap(),
    ]
});

static SPOTIFY_PLAYLIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"open\.spotify\.com/(?:intl-[a-z]+/)?playlist/(?P<id>[A-Za-z0-9]{22})")
            .unwrap(),
        Regex::new(r"^spotify:playlist:(?P<id>[A-Za-z0-9]{22})$").unwrap(),
        Regex::new(r"^(?P<id>[A-Za-z0-9]{22})$").unwrap(),
    ]
});

static YTM_TRACK: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"youtube\.com/watch\?(?:.*&)?v=(?P<id>[A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"youtu\.be/(?P<id>[A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"^(?P<id>[A-Za-z0-9_-]{11})$").unwrap(),
    ]
});

static YTM_PLAYLIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"youtube\.com/(?:playlist|watch)\?(?:.*&)?list=(?P<id>[A-Za-z0-9_-]+)")
            .unwrap(),
        Regex::new(r"^(?P<id>[A-Za-z0-9_-]{12,})$").unwrap(),
    ]
});

const MBID: &str = r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static MB_RECORDING: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(&format!(r"musicbrainz\.org/recording/(?P<id>{})", MBID)).unwrap(),
        Regex::new(&format!(r"^(?P<id>{})$", MBID)).unwrap(),
    ]
});

static MB_COLLECTION: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(&format!(r"musicbrainz\.org/collection/(?P<id>{})", MBID)).unwrap(),
        Regex::new(&format!(r"^(?P<id>{})$", MBID)).unwrap(),
    ]
});

static BEATSAVER_MAP: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"beatsaver\.com/maps/(?P<id>[0-9a-fA-F]{1,8})").unwrap(),
        Regex::new(r"^!bsr\s+(?P<id>[0-9a-fA-F]{1,8})$").unwrap(),
        Regex::new(r"^(?P<id>[0-9a-fA-F]{1,8})$").unwrap(),
    ]
});

static BEATSAVER_PLAYLIST: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"beatsaver\.com/playlists/(?P<id>[0-9]+)").unwrap(),
        Regex::new(r"^(?P<id>[0-9]+)$").unwrap(),
    ]
});

fn extract(patterns: &[Regex], input: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|caps| caps.name("id"))
        .map(|m| m.as_str().to_string())
}

impl CatalogUri {
    pub fn new(kind: CatalogKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Parse a track identifier from a bare id or a full catalog URL.
    pub fn parse_track(kind: CatalogKind, input: &str) -> Result<Self, ModelError> {
        let input = input.trim();
        let patterns: &[Regex] = match kind {
            CatalogKind::Spotify => &SPOTIFY_TRACK,
            CatalogKind::Ytm => &YTM_TRACK,
            CatalogKind::MusicBrainz => &MB_RECORDING,
            CatalogKind::BeatSaber => &BEATSAVER_MAP,
        };

        let id = extract(patterns, input).ok_or_else(|| ModelError::InvalidUri {
            kind,
            input: input.to_string(),
        })?;

        // Beat Saver keys and MBIDs are case-insensitive
        let id = match kind {
            CatalogKind::MusicBrainz | CatalogKind::BeatSaber => id.to_lowercase(),
            _ => id,
        };

        Ok(Self { kind, id })
    }

    /// Web URL of the catalog entry.
    pub fn url(&self) -> String {
        match self.kind {
            CatalogKind::Spotify => format!("https://open.spotify.com/track/{}", self.id),
            CatalogKind::Ytm => format!("https://music.youtube.com/watch?v={}", self.id),
            CatalogKind::MusicBrainz => format!("https://musicbrainz.org/recording/{}", self.id),
            CatalogKind::BeatSaber => format!("https://beatsaver.com/maps/{}", self.id),
        }
    }
}

/// Parse a playlist identifier from a bare id or a full catalog URL.
pub fn parse_playlist_id(kind: CatalogKind, input: &str) -> Result<String, ModelError> {
    let input = input.trim();
    let patterns: &[Regex] = match kind {
        CatalogKind::Spotify => &SPOTIFY_PLAYLIST,
        CatalogKind::Ytm => &YTM_PLAYLIST,
        CatalogKind::MusicBrainz => &MB_COLLECTION,
        CatalogKind::BeatSaber => &BEATSAVER_PLAYLIST,
    };

    extract(patterns, input).ok_or_else(|| ModelError::InvalidUri {
        kind,
        input: input.to_string(),
    })
}

impl fmt::Display for CatalogUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
