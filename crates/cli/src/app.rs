//! Shared state handed to every command.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use unitunes_core::{
    CachePolicy, CacheStore, Config, DefaultMatcher, Searcher, SqliteCache, TrackMatcher,
};

use crate::catalogs::Catalogs;
use crate::library::Library;

pub struct App {
    pub config: Config,
    pub library: Library,
    pub catalogs: Catalogs,
    pub searcher: Searcher,
}

impl App {
    pub fn from_config(config: Config) -> Result<Self> {
        let cache: Option<Arc<dyn CacheStore>> = match config.cache.policy {
            CachePolicy::Bypass => {
                info!("Remote call cache bypassed");
                None
            }
            policy => {
                let store = SqliteCache::new(&config.cache.path).with_context(|| {
                    format!("Failed to open cache at {:?}", config.cache.path)
                })?;
                info!("Remote call cache at {:?} ({:?})", config.cache.path, policy);
                Some(Arc::new(store))
            }
        };

        let catalogs = Catalogs::from_config(&config, cache)?;
        let matcher: Arc<dyn TrackMatcher> =
            Arc::new(DefaultMatcher::with_config(config.matcher.clone()));
        let searcher = Searcher::with_config(matcher, config.searcher.clone());
        let library = Library::new(&config.library.playlist_dir);

        Ok(Self {
            config,
            library,
            catalogs,
            searcher,
        })
    }
}
