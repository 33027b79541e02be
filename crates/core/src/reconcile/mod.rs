//! Playlist reconciliation against a catalog pull.
//!
//! A pull is the full current contents of the catalog playlist. Diffing is
//! done on that catalog's identifiers only: local order and metadata never
//! cause a change.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::matcher::TrackMatcher;
use crate::metrics;
use crate::model::{CatalogKind, CatalogUri, Playlist, Track};

/// Errors that can occur when reconciling a playlist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// A pulled track has no identifier for the catalog it came from.
    #[error("Pulled track \"{track}\" has no {kind} identifier")]
    MissingIdentifier { kind: CatalogKind, track: String },
}

/// What [`merge_new_tracks`] did with each new track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeSummary {
    /// Local tracks that absorbed a new remote track, as they are after the merge.
    pub merged: Vec<Track>,
    /// Remote tracks appended as new local tracks.
    pub added: Vec<Track>,
}

/// What [`remove_tracks`] did with each removed track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemovalSummary {
    /// Local tracks that lost the identifier but are still linked elsewhere.
    pub unlinked: Vec<Track>,
    /// Local tracks deleted because no identifier was left.
    pub deleted: Vec<Track>,
}

/// Outcome of a full reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub kind: Option<CatalogKind>,
    pub merged: Vec<Track>,
    pub added: Vec<Track>,
    pub unlinked: Vec<Track>,
    pub deleted: Vec<Track>,
}

impl ReconcileReport {
    /// True if the pull changed nothing.
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
            && self.added.is_empty()
            && self.unlinked.is_empty()
            && self.deleted.is_empty()
    }
}

fn local_uris(playlist: &Playlist, kind: CatalogKind) -> HashSet<&CatalogUri> {
    playlist.tracks.iter().filter_map(|t| t.uri(kind)).collect()
}

/// Remote tracks whose identifier no local track has yet.
///
/// Tracks repeated within the pull are returned once.
pub fn new_tracks(playlist: &Playlist, kind: CatalogKind, remote: &[Track]) -> Vec<Track> {
    let known = local_uris(playlist, kind);
    let mut seen: HashSet<&CatalogUri> = HashSet::new();

    remote
        .iter()
        .filter(|track| match track.uri(kind) {
            Some(uri) => !known.contains(uri) && seen.insert(uri),
            None => false,
        })
        .cloned()
        .collect()
}

/// Local tracks linked to `kind` whose identifier is absent from the pull.
pub fn removed_tracks(playlist: &Playlist, kind: CatalogKind, remote: &[Track]) -> Vec<Track> {
    let pulled: HashSet<&CatalogUri> = remote.iter().filter_map(|t| t.uri(kind)).collect();

    playlist
        .tracks
        .iter()
        .filter(|track| matches!(track.uri(kind), Some(uri) if !pulled.contains(uri)))
        .cloned()
        .collect()
}

/// Fold new remote tracks into the playlist.
///
/// Each track merges into the best matching local track that has no `kind`
/// identifier yet (first in playlist order on ties), or is appended.
pub fn merge_new_tracks(
    playlist: &mut Playlist,
    kind: CatalogKind,
    new: &[Track],
    matcher: &dyn TrackMatcher,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for remote in new {
        let mut best: Option<(usize, f64)> = None;
        for (idx, local) in playlist.tracks.iter().enumerate() {
            if local.uri(kind).is_some() || !matcher.matches(local, remote) {
                continue;
            }
            let score = matcher.similarity(local, remote);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) => {
                let local = &mut playlist.tracks[idx];
                debug!(local = %local, remote = %remote, score, "Merging into local track");
                local.merge(remote);
                summary.merged.push(local.clone());
            }
            None => {
                debug!(remote = %remote, "Adding new track");
                playlist.tracks.push(remote.clone());
                summary.added.push(remote.clone());
            }
        }
    }

    summary
}

/// Unlink removed tracks from `kind`, deleting those left with no identifier.
pub fn remove_tracks(playlist: &mut Playlist, kind: CatalogKind, removed: &[Track]) -> RemovalSummary {
    let gone: HashSet<CatalogUri> = removed.iter().filter_map(|t| t.uri(kind)).cloned().collect();
    let mut summary = RemovalSummary::default();

    let mut kept = Vec::with_capacity(playlist.tracks.len());
    for mut track in playlist.tracks.drain(..) {
        let is_gone = track.uri(kind).is_some_and(|uri| gone.contains(uri));
        if !is_gone {
            kept.push(track);
            continue;
        }

        track.remove_uri(kind);
        if track.is_resolved() {
            debug!(track = %track, catalog = %kind, "Unlinking track");
            summary.unlinked.push(track.clone());
            kept.push(track);
        } else {
            debug!(track = %track, catalog = %kind, "Deleting track");
            summary.deleted.push(track);
        }
    }
    playlist.tracks = kept;

    summary
}

/// Bring `playlist` in line with a pull from `kind`.
///
/// Every pulled track must carry a `kind` identifier; otherwise nothing is
/// changed. Applying the same pull twice reports no changes the second time.
pub fn reconcile(
    playlist: &mut Playlist,
    kind: CatalogKind,
    remote: &[Track],
    matcher: &dyn TrackMatcher,
) -> Result<ReconcileReport, ReconcileError> {
    if let Some(track) = remote.iter().find(|t| t.uri(kind).is_none()) {
        return Err(ReconcileError::MissingIdentifier {
            kind,
            track: track.to_string(),
        });
    }

    let new = new_tracks(playlist, kind, remote);
    let removed = removed_tracks(playlist, kind, remote);

    let merge = merge_new_tracks(playlist, kind, &new, matcher);
    let removal = remove_tracks(playlist, kind, &removed);

    let report = ReconcileReport {
        kind: Some(kind),
        merged: merge.merged,
        added: merge.added,
        unlinked: removal.unlinked,
        deleted: removal.deleted,
    };

    for (change, count) in [
        ("merged", report.merged.len()),
        ("added", report.added.len()),
        ("unlinked", report.unlinked.len()),
        ("deleted", report.deleted.len()),
    ] {
        metrics::RECONCILE_CHANGES
            .with_label_values(&[change])
            .inc_by(count as u64);
    }

    info!(
        playlist = %playlist.name,
        catalog = %kind,
        pulled = remote.len(),
        merged = report.merged.len(),
        added = report.added.len(),
        unlinked = report.unlinked.len(),
        deleted = report.deleted.len(),
        "Reconciled playlist"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::DefaultMatcher;
    use crate::testing::fixtures::{local_track, playlist, remote_track};

    const YTM: CatalogKind = CatalogKind::Ytm;

    #[test]
    fn test_new_tracks_ignores_known_and_duplicate_uris() {
        let known = remote_track(YTM, "a", "Gurenge", &["LiSA"]);
        let pl = playlist(YTM, "pl", vec![known.clone()]);
        let fresh = remote_track(YTM, "b", "Homura", &["LiSA"]);

        let new = new_tracks(&pl, YTM, &[known, fresh.clone(), fresh.clone()]);
        assert_eq!(new, vec![fresh]);
    }

    #[test]
    fn test_removed_tracks_only_considers_kind() {
        let linked = remote_track(YTM, "a", "Gurenge", &["LiSA"]);
        let other_catalog = remote_track(CatalogKind::Spotify, "s", "Homura", &["LiSA"]);
        let local_only = local_track("Unravel", &["TK"]);
        let pl = playlist(YTM, "pl", vec![linked.clone(), other_catalog, local_only]);

        assert_eq!(removed_tracks(&pl, YTM, &[]), vec![linked]);
    }

    #[test]
    fn test_merge_prefers_matching_unlinked_local_track() {
        let matcher = DefaultMatcher::new();
        let mut pl = playlist(
            YTM,
            "pl",
            vec![
                local_track("Bohemian Rhapsody", &["Queen"]),
                local_track("Gurenge", &["LiSA"]),
            ],
        );
        let remote = remote_track(YTM, "yt1", "Gurenge", &["LiSA"]);

        let summary = merge_new_tracks(&mut pl, YTM, &[remote], &matcher);

        assert_eq!(summary.merged.len(), 1);
        assert!(summary.added.is_empty());
        assert_eq!(pl.tracks.len(), 2);
        assert_eq!(pl.tracks[1].uri(YTM).unwrap().id, "yt1");
    }

    #[test]
    fn test_merge_skips_tracks_already_linked() {
        let matcher = DefaultMatcher::new();
        let mut pl = playlist(YTM, "pl", vec![remote_track(YTM, "old", "Gurenge", &["LiSA"])]);
        let remote = remote_track(YTM, "new", "Gurenge", &["LiSA"]);

        let summary = merge_new_tracks(&mut pl, YTM, &[remote], &matcher);

        assert_eq!(summary.added.len(), 1);
        assert_eq!(pl.tracks.len(), 2);
        assert_eq!(pl.tracks[0].uri(YTM).unwrap().id, "old");
    }

    #[test]
    fn test_remove_unlinks_or_deletes() {
        let shared = remote_track(YTM, "a", "Gurenge", &["LiSA"])
            .with_uri(CatalogUri::new(CatalogKind::Spotify, "sp"));
        let only_ytm = remote_track(YTM, "b", "Homura", &["LiSA"]);
        let mut pl = playlist(YTM, "pl", vec![shared.clone(), only_ytm.clone()]);

        let summary = remove_tracks(&mut pl, YTM, &[shared, only_ytm]);

        assert_eq!(summary.unlinked.len(), 1);
        assert_eq!(summary.deleted.len(), 1);
        assert_eq!(pl.tracks.len(), 1);
        assert!(pl.tracks[0].uri(YTM).is_none());
        assert_eq!(pl.tracks[0].uri(CatalogKind::Spotify).unwrap().id, "sp");
    }

    #[test]
    fn test_reconcile_rejects_unidentified_remote_tracks() {
        let matcher = DefaultMatcher::new();
        let mut pl = playlist(YTM, "pl", vec![local_track("Gurenge", &["LiSA"])]);
        let before = pl.clone();

        let err = reconcile(&mut pl, YTM, &[local_track("Homura", &["LiSA"])], &matcher)
            .unwrap_err();

        assert!(matches!(err, ReconcileError::MissingIdentifier { kind: YTM, .. }));
        assert_eq!(pl, before);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let matcher = DefaultMatcher::new();
        let mut pl = playlist(YTM, "pl", vec![local_track("Gurenge", &["LiSA"])]);
        let pull = vec![
            remote_track(YTM, "a", "Gurenge", &["LiSA"]),
            remote_track(YTM, "b", "Homura", &["LiSA"]),
        ];

        let first = reconcile(&mut pl, YTM, &pull, &matcher).unwrap();
        assert_eq!(first.merged.len(), 1);
        assert_eq!(first.added.len(), 1);

        let snapshot = pl.clone();
        let second = reconcile(&mut pl, YTM, &pull, &matcher).unwrap();
        assert!(second.is_empty());
        assert_eq!(pl, snapshot);
    }
}
