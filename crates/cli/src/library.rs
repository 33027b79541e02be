//! Local playlists, one pretty-printed JSON file each.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use unitunes_core::Playlist;

pub struct Library {
    dir: PathBuf,
}

impl Library {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            bail!("Invalid playlist name {:?}", name);
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).map(|p| p.exists()).unwrap_or(false)
    }

    pub fn load(&self, name: &str) -> Result<Playlist> {
        let path = self.path(name)?;
        if !path.exists() {
            bail!("{} is not a playlist", name);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Write `playlist` to the file named after it, replacing any previous version.
    pub fn save(&self, playlist: &Playlist) -> Result<PathBuf> {
        let path = self.path(&playlist.name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {:?}", self.dir))?;

        let json = serde_json::to_string_pretty(playlist)?;
        // Write then rename so an interrupted save leaves the old file intact
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {:?}", path))?;

        debug!(playlist = %playlist.name, path = ?path, "Saved playlist");
        Ok(path)
    }

    /// Playlist names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {:?}", self.dir))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
