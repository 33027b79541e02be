//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Searcher (queries issued, early stops, best match confidence)
//! - Cache gate (hits and misses)
//! - Reconciler and evaluation outcomes

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Searcher
// =============================================================================

/// Queries sent to a catalog by the searcher.
pub static SEARCH_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "unitunes_search_queries_total",
            "Total search queries issued",
        ),
        &["catalog"],
    )
    .unwrap()
});

/// Searches that stopped before exhausting their queries.
pub static SEARCH_EARLY_STOPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "unitunes_search_early_stops_total",
            "Searches stopped early on a confident candidate",
        ),
        &["catalog"],
    )
    .unwrap()
});

/// Best candidate score per search.
pub static MATCH_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "unitunes_match_confidence",
            "Distribution of best candidate similarity scores",
        )
        .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
        &["catalog"],
    )
    .unwrap()
});

// =============================================================================
// Cache
// =============================================================================

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unitunes_cache_lookups_total", "Total cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Reconcile & evaluation
// =============================================================================

/// Playlist changes applied by the reconciler.
pub static RECONCILE_CHANGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "unitunes_reconcile_changes_total",
            "Playlist track changes applied during reconciliation",
        ),
        &["change"], // "merged", "added", "unlinked", "deleted"
    )
    .unwrap()
});

/// Evaluation cases by outcome.
pub static EVAL_CASES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("unitunes_eval_cases_total", "Evaluated resolution cases"),
        &["outcome"], // "correct", "missing", "wrong", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Searcher
        Box::new(SEARCH_QUERIES.clone()),
        Box::new(SEARCH_EARLY_STOPS.clone()),
        Box::new(MATCH_CONFIDENCE.clone()),
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        // Reconcile & evaluation
        Box::new(RECONCILE_CHANGES.clone()),
        Box::new(EVAL_CASES.clone()),
    ]
}
