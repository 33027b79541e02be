pub mod cache;
pub mod catalog;
pub mod config;
pub mod eval;
pub mod matcher;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod searcher;
pub mod testing;

pub use cache::{cached_call, CacheError, CacheKey, CachePolicy, CacheStore, MemoryCache, SqliteCache};
pub use catalog::{
    default_queries, BeatSaverCatalog, BeatSaverConfig, Catalog, CatalogError,
    MusicBrainzCatalog, MusicBrainzConfig, PlaylistPullable, Searchable, TrackPullable,
};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
};
pub use eval::{evaluate, get_prediction, EvalCase, EvaluationReport, Verdict};
pub use matcher::{DefaultMatcher, MatcherConfig, ScoreBreakdown, TrackMatcher, MATCH_THRESHOLD};
pub use model::{
    parse_playlist_id, AliasedValue, CatalogKind, CatalogUri, ModelError, Playlist, Track,
};
pub use reconcile::{
    merge_new_tracks, new_tracks, reconcile, remove_tracks, removed_tracks, ReconcileError,
    ReconcileReport,
};
pub use searcher::{ScoredTrack, SearchOutcome, Searcher, SearcherConfig, EARLY_STOP_THRESHOLD};
