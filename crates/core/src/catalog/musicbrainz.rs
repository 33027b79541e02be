//! MusicBrainz recording catalog.
//!
//! MusicBrainz requires:
//! - User-Agent header with application name/version and contact info
//! - Rate limiting: 1 request per second

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::http::read_json;
use super::{Catalog, CatalogError, Searchable, TrackPullable};
use crate::cache::{cached_call, CacheKey, CachePolicy, CacheStore};
use crate::model::{AliasedValue, CatalogKind, CatalogUri, Track};

/// MusicBrainz client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicBrainzConfig {
    /// User-Agent string (required by MusicBrainz).
    /// Format: "AppName/Version ( contact@example.com )"
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Rate limit delay in milliseconds (default: 1100 for 1 req/sec).
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,
    /// Recordings requested per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Base URL (default: https://musicbrainz.org/ws/2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_user_agent() -> String {
    format!(
        "unitunes/{} ( https://github.com/unitunes/unitunes )",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_rate_limit() -> u64 {
    1100
}

fn default_search_limit() -> u32 {
    10
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            rate_limit_ms: default_rate_limit(),
            search_limit: default_search_limit(),
            base_url: None,
        }
    }
}

/// Searchable, track-pullable view of MusicBrainz recordings.
pub struct MusicBrainzCatalog {
    client: Client,
    base_url: String,
    search_limit: u32,
    last_request: Mutex<Option<Instant>>,
    rate_limit: Duration,
    cache: Option<Arc<dyn CacheStore>>,
    cache_policy: CachePolicy,
}

impl MusicBrainzCatalog {
    pub fn new(config: MusicBrainzConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://musicbrainz.org/ws/2".to_string());

        Ok(Self {
            client,
            base_url,
            search_limit: config.search_limit.clamp(1, 100),
            last_request: Mutex::new(None),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
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

    /// Wait for rate limit if needed.
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.rate_limit {
                let wait_time = self.rate_limit - elapsed;
                debug!("MusicBrainz rate limit: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    async fn fetch_search(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        self.wait_for_rate_limit().await;

        let url = format!("{}/recording", self.base_url);
        let limit = self.search_limit.to_string();
        debug!(query, limit = self.search_limit, "MusicBrainz recording search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("fmt", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let result: MbSearchResponse = read_json(self.name(), response, "recording search").await?;
        Ok(result.recordings.into_iter().map(Track::from).collect())
    }

    async fn fetch_recording(&self, mbid: &str) -> Result<Track, CatalogError> {
        self.wait_for_rate_limit().await;

        let url = format!("{}/recording/{}", self.base_url, urlencoding::encode(mbid));
        debug!(mbid, "MusicBrainz get recording");

        let response = self
            .client
            .get(&url)
            .query(&[("inc", "artists releases aliases"), ("fmt", "json")])
            .send()
            .await?;

        let recording: MbRecording = read_json(self.name(), response, mbid).await?;
        Ok(recording.into())
    }
}

/// Backslash-escape Lucene query syntax.
fn escape_lucene(text: &str) -> String {
    // Backslash first so later escapes are not doubled
    let mut escaped = text.replace('\\', "\\\\");
    for special in [
        "+", "-", "&&", "||", "!", "(", ")", "{", "}", "[", "]", "^", "\"", "~", "*", "?", ":",
        "/",
    ] {
        escaped = escaped.replace(special, &format!("\\{}", special));
    }
    escaped
}

/// Fielded recording query: `recording:"…" OR artist:"…" OR release:"…"`.
/// Fields without data are left out.
fn recording_query(name: &str, track: &Track) -> String {
    let artists = track
        .artists
        .iter()
        .map(|a| a.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let albums = track
        .albums
        .iter()
        .map(|a| a.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    [
        ("recording", name),
        ("artist", artists.as_str()),
        ("release", albums.as_str()),
    ]
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field, value)| format!("{}:\"{}\"", field, escape_lucene(value.trim())))
        .collect::<Vec<_>>()
        .join(" OR ")
}

impl Catalog for MusicBrainzCatalog {
    fn name(&self) -> &str {
        "musicbrainz"
    }

    fn kind(&self) -> CatalogKind {
        CatalogKind::MusicBrainz
    }
}

#[async_trait]
impl Searchable for MusicBrainzCatalog {
    /// One fielded query per name spelling.
    fn query_generator(&self, track: &Track) -> Vec<String> {
        let mut queries: Vec<String> = Vec::new();
        for name in track.name.all().filter(|n| !n.trim().is_empty()) {
            let query = recording_query(name, track);
            if !queries.contains(&query) {
                queries.push(query);
            }
        }
        queries
    }

    async fn search_query(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let key = CacheKey::new(
            self.name(),
            format!("search_recordings:{}:{}", query, self.search_limit),
        );
        cached_call(self.cache.as_deref(), &key, self.cache_policy, || {
            self.fetch_search(query)
        })
        .await
    }
}

#[async_trait]
impl TrackPullable for MusicBrainzCatalog {
    async fn pull_track(&self, uri: &CatalogUri) -> Result<Track, CatalogError> {
        self.check_kind(uri)?;
        let key = CacheKey::new(self.name(), format!("get_recording:{}", uri.id));
        cached_call(self.cache.as_deref(), &key, self.cache_policy, || {
            self.fetch_recording(&uri.id)
        })
        .await
    }
}

// ============================================================================
// MusicBrainz API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct MbSearchResponse {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Debug, Deserialize)]
struct MbRecording {
    id: String,
    title: String,
    /// Milliseconds.
    #[serde(default)]
    length: Option<u64>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(default)]
    releases: Vec<MbRelease>,
    #[serde(default)]
    aliases: Vec<MbAlias>,
}

#[derive(Debug, Deserialize)]
struct MbArtistCredit {
    /// Name as credited on this recording.
    #[serde(default)]
    name: Option<String>,
    artist: MbArtist,
}

#[derive(Debug, Deserialize)]
struct MbArtist {
    #[serde(default)]
    name: String,
    #[serde(default)]
    aliases: Vec<MbAlias>,
}

#[derive(Debug, Deserialize)]
struct MbRelease {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct MbAlias {
    name: String,
}

impl From<MbArtistCredit> for AliasedValue {
    fn from(credit: MbArtistCredit) -> Self {
        let credited = credit
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| credit.artist.name.clone());
        let mut value = AliasedValue::new(credited);
        value.add_alias(credit.artist.name);
        for alias in credit.artist.aliases {
            value.add_alias(alias.name);
        }
        value
    }
}

impl From<MbRecording> for Track {
    fn from(mb: MbRecording) -> Self {
        let name = AliasedValue::with_aliases(mb.title, mb.aliases.into_iter().map(|a| a.name));

        let mut albums: Vec<AliasedValue> = Vec::new();
        for release in mb.releases {
            if release.title.trim().is_empty() || albums.iter().any(|a| a.value == release.title) {
                continue;
            }
            albums.push(AliasedValue::new(release.title));
        }

        Track {
            name,
            artists: mb.artist_credit.into_iter().map(AliasedValue::from).collect(),
            albums,
            length: mb.length.map(|ms| (ms / 1000) as u32),
            uris: vec![CatalogUri::new(
                CatalogKind::MusicBrainz,
                mb.id.to_lowercase(),
            )],
        }
    }
}
