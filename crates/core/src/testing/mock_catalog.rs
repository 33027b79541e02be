//! Mock catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{
    default_queries, Catalog, CatalogError, PlaylistPullable, Searchable, TrackPullable,
};
use crate::model::{CatalogKind, CatalogUri, Track};

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<Track>> + Send + Sync>;

/// Mock implementation of every catalog capability.
///
/// Provides controllable behavior for testing:
/// - Scripted results per query, or a handler computing them
/// - Track and playlist lookups by id
/// - Recorded queries for assertions
/// - Failures on a given query, or on the next call
///
/// # Example
///
/// ```rust,ignore
/// use unitunes_core::testing::{MockCatalog, fixtures};
/// use unitunes_core::model::CatalogKind;
///
/// let catalog = MockCatalog::new(CatalogKind::BeatSaber);
/// catalog
///     .set_results("My Hero - MAN WITH A MISSION", vec![fixtures::my_hero_map()])
///     .await;
///
/// let results = searcher.search(&catalog, &query_track, None).await?;
/// assert_eq!(catalog.recorded_queries().await.len(), 1);
/// ```
pub struct MockCatalog {
    name: String,
    kind: CatalogKind,
    /// Fixed query list; `None` uses the default generator.
    queries: Option<Vec<String>>,
    /// Results per exact query string.
    results: Arc<RwLock<HashMap<String, Vec<Track>>>>,
    /// Tracks by catalog id.
    tracks: Arc<RwLock<HashMap<String, Track>>>,
    /// Playlists by id.
    playlists: Arc<RwLock<HashMap<String, Vec<Track>>>>,
    /// Recorded search queries.
    searches: Arc<RwLock<Vec<String>>>,
    /// Recorded track pulls.
    pulls: Arc<RwLock<Vec<CatalogUri>>>,
    /// Queries that fail with an API error.
    failing_queries: Arc<RwLock<HashMap<String, String>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// Query handler for dynamic result generation.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCatalog")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("queries", &self.queries)
            .field("results", &"<results>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl MockCatalog {
    /// Create an empty mock catalog of the given kind.
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            name: format!("mock-{}", kind),
            kind,
            queries: None,
            results: Arc::new(RwLock::new(HashMap::new())),
            tracks: Arc::new(RwLock::new(HashMap::new())),
            playlists: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            pulls: Arc::new(RwLock::new(Vec::new())),
            failing_queries: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Generate exactly these queries for every track.
    pub fn with_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = Some(queries.into_iter().map(Into::into).collect());
        self
    }

    /// Set the results returned for `query`.
    pub async fn set_results(&self, query: &str, results: Vec<Track>) {
        self.results.write().await.insert(query.to_string(), results);
    }

    /// Make `query` fail with an API error.
    pub async fn fail_query(&self, query: &str, message: &str) {
        self.failing_queries
            .write()
            .await
            .insert(query.to_string(), message.to_string());
    }

    /// Set an error to be returned on the next call.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a handler computing results for queries without scripted results.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<Track>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Make a track available to `pull_track`, keyed by its identifier for this catalog.
    pub async fn add_track(&self, track: Track) {
        if let Some(uri) = track.uri(self.kind) {
            let id = uri.id.clone();
            self.tracks.write().await.insert(id, track);
        }
    }

    /// Set the contents of a remote playlist.
    pub async fn set_playlist(&self, playlist_id: &str, tracks: Vec<Track>) {
        self.playlists
            .write()
            .await
            .insert(playlist_id.to_string(), tracks);
    }

    /// Get recorded search queries, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.searches.read().await.clone()
    }

    /// Get recorded track pulls, in order.
    pub async fn recorded_pulls(&self) -> Vec<CatalogUri> {
        self.pulls.read().await.clone()
    }

    /// Clear recorded queries and pulls.
    pub async fn clear_recorded(&self) {
        self.searches.write().await.clear();
        self.pulls.write().await.clear();
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }
}

impl Catalog for MockCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CatalogKind {
        self.kind
    }
}

#[async_trait]
impl Searchable for MockCatalog {
    fn query_generator(&self, track: &Track) -> Vec<String> {
        match &self.queries {
            Some(queries) => queries.clone(),
            None => default_queries(track),
        }
    }

    async fn search_query(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        self.searches.write().await.push(query.to_string());

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if let Some(message) = self.failing_queries.read().await.get(query) {
            return Err(CatalogError::ApiError {
                status: 500,
                message: message.clone(),
            });
        }

        if let Some(results) = self.results.read().await.get(query) {
            return Ok(results.clone());
        }
        if let Some(handler) = self.query_handler.read().await.as_ref() {
            if let Some(results) = handler(query) {
                return Ok(results);
            }
        }
        Ok(Vec::new())
    }
}

#[async_trait]
impl TrackPullable for MockCatalog {
    async fn pull_track(&self, uri: &CatalogUri) -> Result<Track, CatalogError> {
        self.pulls.write().await.push(uri.clone());

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        self.check_kind(uri)?;

        self.tracks
            .read()
            .await
            .get(&uri.id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(uri.to_string()))
    }
}

#[async_trait]
impl PlaylistPullable for MockCatalog {
    async fn pull_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        self.playlists
            .read()
            .await
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(playlist_id.to_string()))
    }
}
