//! Track and playlist records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CatalogKind, CatalogUri, ModelError};
use crate::normalize::normalize;

/// A string attribute with alternate spellings that are equally valid
/// (romanized vs native title, "feat." variants, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AliasedValue {
    /// Primary spelling, used for display and query generation.
    pub value: String,
    /// Alternate spellings, in insertion order, without duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl AliasedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(value: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut aliased = Self::new(value);
        for alias in aliases {
            aliased.add_alias(alias);
        }
        aliased
    }

    /// Primary value followed by every alias.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.value.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Add an alternate spelling. Exact duplicates of a known value are ignored.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if alias.trim().is_empty() || self.all().any(|v| v == alias) {
            return;
        }
        self.aliases.push(alias);
    }

    /// Accumulate every spelling known to `other`.
    pub fn merge(&mut self, other: &AliasedValue) {
        for value in other.all() {
            self.add_alias(value);
        }
    }

    /// True if any spelling of one equals any spelling of the other after normalization.
    pub fn is_compatible(&self, other: &AliasedValue) -> bool {
        let ours: Vec<String> = self
            .all()
            .map(normalize)
            .filter(|v| !v.is_empty())
            .collect();
        other
            .all()
            .map(normalize)
            .any(|theirs| !theirs.is_empty() && ours.contains(&theirs))
    }

    pub fn is_empty(&self) -> bool {
        self.all().all(|v| v.trim().is_empty())
    }
}

impl From<&str> for AliasedValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AliasedValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for AliasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A track as known locally or as returned by a catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    pub name: AliasedValue,
    /// Insertion order is kept for display; matching ignores it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<AliasedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub albums: Vec<AliasedValue>,
    /// Length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// At most one identifier per catalog kind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<CatalogUri>,
}

impl Track {
    pub fn new(name: impl Into<AliasedValue>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_artists<I, A>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AliasedValue>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_albums<I, A>(mut self, albums: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AliasedValue>,
    {
        self.albums = albums.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_length(mut self, seconds: u32) -> Self {
        self.length = Some(seconds);
        self
    }

    pub fn with_uri(mut self, uri: CatalogUri) -> Self {
        self.add_uri(uri);
        self
    }

    /// Identifier for the given catalog, if resolved against it.
    pub fn uri(&self, kind: CatalogKind) -> Option<&CatalogUri> {
        self.uris.iter().find(|u| u.kind == kind)
    }

    /// A track without identifiers is a query or a local-only record.
    pub fn is_resolved(&self) -> bool {
        !self.uris.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Attach an identifier. An existing identifier of the same kind is never
    /// overwritten; returns whether the identifier was added.
    pub fn add_uri(&mut self, uri: CatalogUri) -> bool {
        if self.uri(uri.kind).is_some() {
            return false;
        }
        self.uris.push(uri);
        true
    }

    /// Drop the identifier for `kind`, returning it if present.
    pub fn remove_uri(&mut self, kind: CatalogKind) -> Option<CatalogUri> {
        let idx = self.uris.iter().position(|u| u.kind == kind)?;
        Some(self.uris.remove(idx))
    }

    /// Union identifiers and aliases from another record describing the same track.
    pub fn merge(&mut self, other: &Track) {
        self.name.merge(&other.name);

        for artist in &other.artists {
            match self.artists.iter_mut().find(|a| a.is_compatible(artist)) {
                Some(existing) => existing.merge(artist),
                None => self.artists.push(artist.clone()),
            }
        }

        for album in &other.albums {
            match self.albums.iter_mut().find(|a| a.is_compatible(album)) {
                Some(existing) => existing.merge(album),
                None => self.albums.push(album.clone()),
            }
        }

        if self.length.is_none() {
            self.length = other.length;
        }

        for uri in &other.uris {
            self.add_uri(uri.clone());
        }
    }

    /// Reject records that carry nothing to resolve from.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.has_name() && !self.is_resolved() {
            return Err(ModelError::AmbiguousTrack);
        }
        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.artists.is_empty() {
            let artists: Vec<&str> = self.artists.iter().map(|a| a.value.as_str()).collect();
            write!(f, " - {}", artists.join(", "))?;
        }
        if let Some(album) = self.albums.first() {
            write!(f, " ({})", album)?;
        }
        if let Some(length) = self.length {
            write!(f, " [{}:{:02}]", length / 60, length % 60)?;
        }
        Ok(())
    }
}

/// A playlist and the catalog playlists it is synced with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display/export order; diffing ignores it.
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Catalog-native playlist ids, one per catalog.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub uris: BTreeMap<CatalogKind, String>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn find_uri(&self, kind: CatalogKind) -> Option<&str> {
        self.uris.get(&kind).map(String::as_str)
    }

    pub fn link(&mut self, kind: CatalogKind, playlist_id: impl Into<String>) {
        self.uris.insert(kind, playlist_id.into());
    }
}
