//! Adaptive multi-query searcher.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use super::config::SearcherConfig;
use super::types::{ScoredTrack, SearchOutcome};
use crate::catalog::{CatalogError, Searchable};
use crate::matcher::TrackMatcher;
use crate::metrics;
use crate::model::{CatalogKind, Track};

/// Finds the tracks on a catalog that best match a given track.
///
/// Queries run one at a time, in the order the catalog generates them, and
/// stop as soon as a candidate is good enough. Remote calls are the expensive
/// part, so most well-tagged tracks resolve with a single query.
pub struct Searcher {
    matcher: Arc<dyn TrackMatcher>,
    config: SearcherConfig,
}

impl Searcher {
    pub fn new(matcher: Arc<dyn TrackMatcher>) -> Self {
        Self::with_config(matcher, SearcherConfig::default())
    }

    pub fn with_config(matcher: Arc<dyn TrackMatcher>, config: SearcherConfig) -> Self {
        Self { matcher, config }
    }

    pub fn matcher(&self) -> &dyn TrackMatcher {
        self.matcher.as_ref()
    }

    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    /// Candidates for `track` on `catalog`, best first, at most `limit` of them.
    pub async fn search(
        &self,
        catalog: &dyn Searchable,
        track: &Track,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredTrack>, CatalogError> {
        Ok(self.search_outcome(catalog, track, limit).await?.results)
    }

    /// The top candidate, if it is a match.
    pub async fn best_match(
        &self,
        catalog: &dyn Searchable,
        track: &Track,
    ) -> Result<Option<ScoredTrack>, CatalogError> {
        let results = self.search(catalog, track, Some(1)).await?;
        Ok(results
            .into_iter()
            .next()
            .filter(|best| self.matcher.matches(track, &best.track)))
    }

    /// Full search, reporting the queries sent alongside the ranking.
    ///
    /// A track without a name, or one the catalog cannot build a query for,
    /// yields an empty outcome without any remote call. Catalog errors are
    /// returned as is.
    pub async fn search_outcome(
        &self,
        catalog: &dyn Searchable,
        track: &Track,
        limit: Option<usize>,
    ) -> Result<SearchOutcome, CatalogError> {
        if !track.has_name() {
            debug!(catalog = catalog.name(), "Skipping search for nameless track");
            return Ok(SearchOutcome::default());
        }

        let queries: Vec<String> = catalog
            .query_generator(track)
            .into_iter()
            .filter(|q| !q.trim().is_empty())
            .take(self.config.max_queries as usize)
            .collect();

        if queries.is_empty() {
            debug!(catalog = catalog.name(), track = %track, "No usable query");
            return Ok(SearchOutcome::default());
        }

        let kind = catalog.kind();
        let mut outcome = SearchOutcome::default();

        for query in &queries {
            outcome.queries_tried.push(query.clone());
            metrics::SEARCH_QUERIES
                .with_label_values(&[catalog.name()])
                .inc();

            let found = catalog.search_query(query).await?;
            debug!(
                catalog = catalog.name(),
                query = %query,
                results = found.len(),
                "Search query"
            );

            if found.is_empty() {
                continue; // Try next query
            }

            for candidate in found {
                if outcome
                    .results
                    .iter()
                    .any(|seen| same_entry(&seen.track, &candidate, kind))
                {
                    continue;
                }
                let score = self.matcher.similarity(track, &candidate);
                outcome.results.push(ScoredTrack {
                    track: candidate,
                    score,
                });
            }

            if outcome
                .results
                .iter()
                .any(|r| r.score >= self.config.early_stop_threshold)
            {
                break;
            }
        }

        outcome.early_stopped = outcome.queries_tried.len() < queries.len();
        if outcome.early_stopped {
            metrics::SEARCH_EARLY_STOPS
                .with_label_values(&[catalog.name()])
                .inc();
        }

        // Stable: equal scores keep discovery order
        outcome
            .results
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        if let Some(best) = outcome.results.first() {
            metrics::MATCH_CONFIDENCE
                .with_label_values(&[catalog.name()])
                .observe(best.score);
            debug!(
                catalog = catalog.name(),
                best = %best.track,
                score = best.score,
                queries = outcome.queries_tried.len(),
                "Search finished"
            );
        }

        if let Some(limit) = limit {
            outcome.results.truncate(limit);
        }
        Ok(outcome)
    }
}

/// Two results are the same catalog entry if they share the catalog's identifier.
fn same_entry(a: &Track, b: &Track, kind: CatalogKind) -> bool {
    match (a.uri(kind), b.uri(kind)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
