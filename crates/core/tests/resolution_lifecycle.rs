//! Track resolution integration tests.
//!
//! These tests drive the searcher against mock catalogs the way the CLI does:
//! pull from one catalog -> search another -> pick the best match.

use std::sync::Arc;

use tempfile::TempDir;

use unitunes_core::{
    cached_call, get_prediction, load_config_from_str,
    testing::{fixtures, MockCatalog},
    validate_config, CacheKey, CachePolicy, CacheStore, CatalogError, CatalogKind, CatalogUri,
    DefaultMatcher, Searcher, SqliteCache, Track, TrackMatcher,
};

/// Test helper holding a searcher and a cache database in a temp dir.
struct TestHarness {
    searcher: Searcher,
    cache: Arc<SqliteCache>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache = Arc::new(
            SqliteCache::new(&temp_dir.path().join("cache.db")).expect("Failed to open cache"),
        );
        Self {
            searcher: Searcher::new(Arc::new(DefaultMatcher::new())),
            cache,
            _temp_dir: temp_dir,
        }
    }
}

#[tokio::test]
async fn test_my_hero_resolves_on_first_query() {
    let harness = TestHarness::new();
    let beatsaber = MockCatalog::new(CatalogKind::BeatSaber);
    beatsaber
        .set_results(
            "My Hero - MAN WITH A MISSION",
            vec![
                fixtures::my_hero_search_result(),
                fixtures::remote_track(CatalogKind::BeatSaber, "9f9f", "Hero", &["Skillet"]),
            ],
        )
        .await;
    beatsaber.fail_query("My Hero", "second query must not be issued").await;

    let query = fixtures::local_track("My Hero", &["MAN WITH A MISSION"]);
    let outcome = harness
        .searcher
        .search_outcome(&beatsaber, &query, Some(3))
        .await
        .unwrap();

    assert!(outcome.early_stopped);
    assert_eq!(outcome.queries_tried, vec!["My Hero - MAN WITH A MISSION"]);

    let best = outcome.best().unwrap();
    assert!(best.track.name.value.contains("My Hero"));
    assert_eq!(best.track.artists[0].value, "MAN WITH A MISSION");
    assert!(harness.searcher.matcher().matches(&query, &best.track));
    assert!(best.score >= 0.8);
}

#[tokio::test]
async fn test_pulled_map_resolves_to_recording() {
    let harness = TestHarness::new();
    let beatsaber = MockCatalog::new(CatalogKind::BeatSaber);
    beatsaber.add_track(fixtures::my_hero_map()).await;

    let musicbrainz = MockCatalog::new(CatalogKind::MusicBrainz);
    musicbrainz
        .set_query_handler(|query| {
            query.starts_with("My Hero (TV Size)").then(|| {
                vec![
                    fixtures::remote_track(
                        CatalogKind::MusicBrainz,
                        "c0ffee00-0000-4000-8000-000000000001",
                        "Hero",
                        &["Chad Kroeger"],
                    ),
                    fixtures::remote_track(
                        CatalogKind::MusicBrainz,
                        "c0ffee00-0000-4000-8000-000000000002",
                        "My Hero",
                        &["MAN WITH A MISSION"],
                    )
                    .with_length(93),
                ]
            })
        })
        .await;

    let prediction = get_prediction(
        &beatsaber,
        &musicbrainz,
        &harness.searcher,
        &CatalogUri::new(CatalogKind::BeatSaber, "27b65"),
    )
    .await
    .unwrap();

    assert_eq!(
        prediction,
        Some(CatalogUri::new(
            CatalogKind::MusicBrainz,
            "c0ffee00-0000-4000-8000-000000000002"
        ))
    );
}

#[tokio::test]
async fn test_failed_search_leaves_track_untouched() {
    let harness = TestHarness::new();
    let catalog = MockCatalog::new(CatalogKind::Ytm);
    catalog.set_next_error(CatalogError::RateLimitExceeded).await;

    let track = fixtures::remote_track(CatalogKind::Spotify, "sp1", "Gurenge", &["LiSA"]);
    let before = track.clone();

    let result = harness.searcher.best_match(&catalog, &track).await;
    assert!(matches!(result, Err(CatalogError::RateLimitExceeded)));
    assert_eq!(track, before);
}

#[tokio::test]
async fn test_cached_results_survive_reopen() {
    let harness = TestHarness::new();
    let key = CacheKey::new("ytm", "search:gurenge");
    let remote = vec![fixtures::remote_track(CatalogKind::Ytm, "yt1", "Gurenge", &["LiSA"])];

    let store: &dyn CacheStore = harness.cache.as_ref();
    let first: Vec<Track> = cached_call(Some(store), &key, CachePolicy::Use, || async {
        Ok(remote.clone())
    })
    .await
    .unwrap();
    assert_eq!(first, remote);

    let reopened = SqliteCache::new(&harness._temp_dir.path().join("cache.db")).unwrap();
    let store: &dyn CacheStore = &reopened;
    let second: Vec<Track> = cached_call(Some(store), &key, CachePolicy::Use, || async {
        Err(CatalogError::NotConfigured("remote must not be called".to_string()))
    })
    .await
    .unwrap();
    assert_eq!(second, remote);
}

#[tokio::test]
async fn test_config_drives_searcher() {
    let config = load_config_from_str(
        r#"
[searcher]
max_queries = 1
"#,
    )
    .unwrap();
    validate_config(&config).unwrap();

    let searcher = Searcher::with_config(
        Arc::new(DefaultMatcher::with_config(config.matcher.clone())),
        config.searcher.clone(),
    );
    let catalog = MockCatalog::new(CatalogKind::Ytm);
    let track = fixtures::local_track("Gurenge", &["LiSA"]);

    let results = searcher.search(&catalog, &track, None).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(catalog.recorded_queries().await, vec!["Gurenge - LiSA"]);
}

#[test]
fn test_nameless_track_never_hits_the_catalog() {
    let harness = TestHarness::new();
    let catalog = MockCatalog::new(CatalogKind::Ytm);
    let track = Track::default().with_uri(CatalogUri::new(CatalogKind::Spotify, "sp1"));

    let results =
        tokio_test::block_on(harness.searcher.search(&catalog, &track, None)).unwrap();
    assert!(results.is_empty());
    assert!(tokio_test::block_on(catalog.recorded_queries()).is_empty());
}
