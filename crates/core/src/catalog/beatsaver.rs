//! Beat Saver map repository.
//!
//! Maps are treated as tracks: the song metadata of a map describes the
//! recording it was charted to.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::read_json;
use super::{Catalog, CatalogError, PlaylistPullable, Searchable, TrackPullable};
use crate::cache::{cached_call, CacheKey, CachePolicy, CacheStore};
use crate::model::{AliasedValue, CatalogKind, CatalogUri, Track};

/// Beat Saver client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatSaverConfig {
    /// Base URL (default: https://api.beatsaver.com).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Result pages fetched per search query.
    #[serde(default = "default_search_pages")]
    pub search_pages: u32,
    /// Upper bound on playlist pages fetched by a pull.
    #[serde(default = "default_playlist_page_limit")]
    pub playlist_page_limit: u32,
}

fn default_search_pages() -> u32 {
    1
}

fn default_playlist_page_limit() -> u32 {
    100
}

impl Default for BeatSaverConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            search_pages: default_search_pages(),
            playlist_page_limit: default_playlist_page_limit(),
        }
    }
}

/// Searchable, track- and playlist-pullable view of Beat Saver.
pub struct BeatSaverCatalog {
    client: Client,
    base_url: String,
    search_pages: u32,
    playlist_page_limit: u32,
    cache: Option<Arc<dyn CacheStore>>,
    cache_policy: CachePolicy,
}

impl BeatSaverCatalog {
    pub fn new(config: BeatSaverConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(format!("unitunes/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.beatsaver.com".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            search_pages: config.search_pages.max(1),
            playlist_page_limit: config.playlist_page_limit.max(1),
            cache: None,
            cache_policy: CachePolicy::Use,
        })
    }

    /// Route every remote call through `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        self.cache = Some(cache);
        self.cache_policy = policy;
        self
    }

    async fn fetch_search_page(&self, query: &str, page: u32) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/search/text/{}", self.base_url, page);
        debug!(query, page, "Beat Saver search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("sortOrder", "Relevance")])
            .send()
            .await?;

        let result: BsSearchResponse = read_json(self.name(), response, "map search").await?;
        Ok(result.docs.into_iter().map(Track::from).collect())
    }

    async fn fetch_map(&self, id: &str) -> Result<Track, CatalogError> {
        let url = format!("{}/maps/id/{}", self.base_url, urlencoding::encode(id));
        debug!(id, "Beat Saver get map");

        let response = self.client.get(&url).send().await?;
        let map: BsMap = read_json(self.name(), response, id).await?;
        Ok(map.into())
    }

    async fn fetch_playlist_page(&self, id: &str, page: u32) -> Result<Vec<Track>, CatalogError> {
        let url = format!(
            "{}/playlists/id/{}/{}",
            self.base_url,
            urlencoding::encode(id),
            page
        );
        debug!(id, page, "Beat Saver get playlist page");

        let response = self.client.get(&url).send().await?;
        let result: BsPlaylistPage = read_json(self.name(), response, id).await?;
        Ok(result.maps.into_iter().map(|entry| entry.map.into()).collect())
    }
}

impl Catalog for BeatSaverCatalog {
    fn name(&self) -> &str {
        "beatsaber"
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::BeatSaber
    }
}

#[async_trait]
impl Searchable for BeatSaverCatalog {
    async fn search_query(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let mut tracks = Vec::new();
        for page in 0..self.search_pages {
            let key = CacheKey::new(self.name(), format!("search:{}:{}", query, page));
            let results = cached_call(self.cache.as_deref(), &key, self.cache_policy, || {
                self.fetch_search_page(query, page)
            })
            .await?;

            if results.is_empty() {
                break;
            }
            tracks.extend(results);
        }
        Ok(tracks)
    }
}

#[async_trait]
impl TrackPullable for BeatSaverCatalog {
    async fn pull_track(&self, uri: &CatalogUri) -> Result<Track, CatalogError> {
        self.check_kind(uri)?;
        let key = CacheKey::new(self.name(), format!("map:{}", uri.id));
        cached_call(self.cache.as_deref(), &key, self.cache_policy, || {
            self.fetch_map(&uri.id)
        })
        .await
    }
}

#[async_trait]
impl PlaylistPullable for BeatSaverCatalog {
    async fn pull_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError> {
        let mut tracks = Vec::new();
        for page in 0..self.playlist_page_limit {
            let key = CacheKey::new(self.name(), format!("playlist:{}:{}", playlist_id, page));
            let results = cached_call(self.cache.as_deref(), &key, self.cache_policy, || {
                self.fetch_playlist_page(playlist_id, page)
            })
            .await?;

            if results.is_empty() {
                break;
            }
            tracks.extend(results);
        }
        debug!(playlist_id, count = tracks.len(), "Pulled Beat Saver playlist");
        Ok(tracks)
    }
}

// ============================================================================
// Beat Saver API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct BsSearchResponse {
    #[serde(default)]
    docs: Vec<BsMap>,
}

#[derive(Debug, Deserialize)]
struct BsPlaylistPage {
    #[serde(default)]
    maps: Vec<BsPlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct BsPlaylistEntry {
    map: BsMap,
}

#[derive(Debug, Deserialize)]
struct BsMap {
    id: String,
    /// Title given by the mapper, often "Song - Artist (Anime OP)".
    #[serde(default)]
    name: String,
    metadata: BsMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BsMetadata {
    /// Seconds.
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    song_name: String,
    #[serde(default)]
    song_sub_name: String,
    #[serde(default)]
    song_author_name: String,
}

impl From<BsMap> for Track {
    fn from(map: BsMap) -> Self {
        let meta = map.metadata;
        let primary = if meta.song_name.trim().is_empty() {
            map.name.clone()
        } else {
            meta.song_name.clone()
        };

        let mut name = AliasedValue::new(primary);
        if !meta.song_sub_name.trim().is_empty() {
            name.add_alias(format!("{} {}", meta.song_name, meta.song_sub_name));
        }
        name.add_alias(map.name);

        let artists = if meta.song_author_name.trim().is_empty() {
            Vec::new()
        } else {
            vec![AliasedValue::new(meta.song_author_name)]
        };

        Track {
            name,
            artists,
            albums: Vec::new(),
            length: (meta.duration > 0).then_some(meta.duration),
            uris: vec![CatalogUri::new(CatalogKind::BeatSaber, map.id.to_lowercase())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "id": "27b65",
        "name": "My Hero (TV Size) [Inuyashiki Opening] - MAN WITH A MISSION",
        "uploader": {"id": 58338, "name": "Joetastic"},
        "metadata": {
            "bpm": 180,
            "duration": 92,
            "songName": "My Hero (TV Size)",
            "songSubName": "",
            "songAuthorName": "MAN WITH A MISSION",
            "levelAuthorName": "Joetastic"
        },
        "automapper": false,
        "ranked": false,
        "tags": ["j-rock", "anime", "balanced"]
    }"#;

    #[test]
    fn test_map_parsing() {
        let map: BsMap = serde_json::from_str(MAP).unwrap();
        let track = Track::from(map);

        assert_eq!(track.name.value, "My Hero (TV Size)");
        assert_eq!(
            track.name.aliases,
            vec!["My Hero (TV Size) [Inuyashiki Opening] - MAN WITH A MISSION".to_string()]
        );
        assert_eq!(track.artists[0].value, "MAN WITH A MISSION");
        assert_eq!(track.length, Some(92));
        assert_eq!(track.uri(CatalogKind::BeatSaber).unwrap().id, "27b65");
    }

    #[test]
    fn test_sub_name_becomes_alias() {
        let map = BsMap {
            id: "ABC1".to_string(),
            name: "Unravel".to_string(),
            metadata: BsMetadata {
                duration: 0,
                song_name: "Unravel".to_string(),
                song_sub_name: "(TV Size)".to_string(),
                song_author_name: String::new(),
            },
        };
        let track = Track::from(map);

        assert_eq!(track.name.aliases, vec!["Unravel (TV Size)".to_string()]);
        assert!(track.artists.is_empty());
        assert_eq!(track.length, None);
        assert_eq!(track.uri(CatalogKind::BeatSaber).unwrap().id, "abc1");
    }

    #[test]
    fn test_search_and_playlist_pages() {
        let search: BsSearchResponse =
            serde_json::from_str(&format!(r#"{{"docs": [{}], "info": {{}}}}"#, MAP)).unwrap();
        assert_eq!(search.docs.len(), 1);

        let page: BsPlaylistPage = serde_json::from_str(&format!(
            r#"{{"playlist": {{"playlistId": 1}}, "maps": [{{"map": {}, "order": 1.0}}]}}"#,
            MAP
        ))
        .unwrap();
        assert_eq!(page.maps.len(), 1);

        let empty: BsPlaylistPage = serde_json::from_str(r#"{"playlist": {}}"#).unwrap();
        assert!(empty.maps.is_empty());
    }

    #[test]
    fn test_default_queries_used_for_search() {
        let catalog = BeatSaverCatalog::new(BeatSaverConfig::default()).unwrap();
        let track = Track::new("My Hero").with_artists(["MAN WITH A MISSION"]);
        assert_eq!(
            catalog.query_generator(&track),
            vec![
                "My Hero - MAN WITH A MISSION".to_string(),
                "My Hero".to_string()
            ]
        );
    }
}
