use anyhow::{Context, Result};

use unitunes_core::{CacheStore, SqliteCache};

use crate::app::App;

/// Remove cached responses, all of them or one catalog's.
pub fn clear(app: &App, catalog: Option<&str>) -> Result<()> {
    let path = &app.config.cache.path;
    if !path.exists() {
        println!("No cache at {:?}", path);
        return Ok(());
    }

    let store = SqliteCache::new(path).with_context(|| format!("Failed to open {:?}", path))?;
    let removed = store.clear(catalog)?;
    println!("Removed {} cached responses", removed);
    Ok(())
}
