//! Catalog adapters available to commands, looked up by kind.

use std::sync::Arc;

use anyhow::{Context, Result};

use unitunes_core::{
    BeatSaverCatalog, CacheStore, CatalogError, CatalogKind, Config, MusicBrainzCatalog,
    PlaylistPullable, Searchable, TrackPullable,
};

pub struct Catalogs {
    musicbrainz: MusicBrainzCatalog,
    beatsaver: BeatSaverCatalog,
}

impl Catalogs {
    pub fn from_config(config: &Config, cache: Option<Arc<dyn CacheStore>>) -> Result<Self> {
        let mut musicbrainz = MusicBrainzCatalog::new(config.musicbrainz.clone())
            .context("Failed to create MusicBrainz client")?;
        let mut beatsaver = BeatSaverCatalog::new(config.beatsaver.clone())
            .context("Failed to create Beat Saver client")?;

        if let Some(cache) = cache {
            let policy = config.cache.policy;
            musicbrainz = musicbrainz.with_cache(Arc::clone(&cache), policy);
            beatsaver = beatsaver.with_cache(cache, policy);
        }

        Ok(Self {
            musicbrainz,
            beatsaver,
        })
    }

    pub fn searchable(&self, kind: CatalogKind) -> Result<&dyn Searchable, CatalogError> {
        match kind {
            CatalogKind::MusicBrainz => Ok(&self.musicbrainz),
            CatalogKind::BeatSaber => Ok(&self.beatsaver),
            other => Err(unsupported(other, "search")),
        }
    }

    pub fn track_pullable(&self, kind: CatalogKind) -> Result<&dyn TrackPullable, CatalogError> {
        match kind {
            CatalogKind::MusicBrainz => Ok(&self.musicbrainz),
            CatalogKind::BeatSaber => Ok(&self.beatsaver),
            other => Err(unsupported(other, "track pull")),
        }
    }

    pub fn playlist_pullable(
        &self,
        kind: CatalogKind,
    ) -> Result<&dyn PlaylistPullable, CatalogError> {
        match kind {
            CatalogKind::BeatSaber => Ok(&self.beatsaver),
            other => Err(unsupported(other, "playlist pull")),
        }
    }
}

fn unsupported(kind: CatalogKind, capability: &str) -> CatalogError {
    CatalogError::NotConfigured(format!("{} has no {} support", kind, capability))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_by_kind() {
        let catalogs = Catalogs::from_config(&Config::default(), None).unwrap();

        assert_eq!(
            catalogs.searchable(CatalogKind::BeatSaber).unwrap().kind(),
            CatalogKind::BeatSaber
        );
        assert!(catalogs.track_pullable(CatalogKind::MusicBrainz).is_ok());
        assert!(catalogs.playlist_pullable(CatalogKind::BeatSaber).is_ok());

        assert!(matches!(
            catalogs.playlist_pullable(CatalogKind::MusicBrainz),
            Err(CatalogError::NotConfigured(_))
        ));
        assert!(catalogs.searchable(CatalogKind::Spotify).is_err());
        assert!(catalogs.track_pullable(CatalogKind::Ytm).is_err());
    }
}
