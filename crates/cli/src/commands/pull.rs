use anyhow::{Context, Result};
use tracing::{info, warn};

use unitunes_core::{reconcile, CatalogKind, ReconcileReport, Track};

use crate::app::App;

/// Pull each playlist from its linked catalogs, reconcile and save.
///
/// A failed pull aborts before the playlist is saved, leaving the file as it was.
pub async fn run(
    app: &App,
    playlists: &[String],
    only: &[CatalogKind],
    verbose: bool,
) -> Result<()> {
    let names = if playlists.is_empty() {
        app.library.names()?
    } else {
        playlists.to_vec()
    };

    for name in names {
        let mut playlist = app.library.load(&name)?;
        let links: Vec<(CatalogKind, String)> = playlist
            .uris
            .iter()
            .filter(|(kind, _)| only.is_empty() || only.contains(kind))
            .map(|(kind, id)| (*kind, id.clone()))
            .collect();

        if links.is_empty() {
            warn!(playlist = %name, "No linked catalog to pull from");
            continue;
        }

        let mut changed = false;
        for (kind, remote_id) in links {
            let catalog = app.catalogs.playlist_pullable(kind)?;
            info!(playlist = %name, catalog = %kind, remote_id = %remote_id, "Pulling");

            let remote = catalog
                .pull_tracks(&remote_id)
                .await
                .with_context(|| format!("Failed to pull {} playlist {}", kind, remote_id))?;

            let report = reconcile(&mut playlist, kind, &remote, app.searcher.matcher())?;
            print!("{}", summarize(&name, &report, verbose));
            changed |= !report.is_empty();
        }

        if changed {
            app.library.save(&playlist)?;
        }
    }
    Ok(())
}

fn summarize(name: &str, report: &ReconcileReport, verbose: bool) -> String {
    let kind = report.kind.map(|k| k.as_str()).unwrap_or("?");
    let mut out = format!(
        "{} <- {}: {} new ({} merged, {} added), {} removed ({} unlinked, {} deleted)\n",
        name,
        kind,
        report.merged.len() + report.added.len(),
        report.merged.len(),
        report.added.len(),
        report.unlinked.len() + report.deleted.len(),
        report.unlinked.len(),
        report.deleted.len(),
    );

    if verbose {
        let sections: [(&str, &[Track]); 4] = [
            ("merged", &report.merged),
            ("added", &report.added),
            ("unlinked", &report.unlinked),
            ("deleted", &report.deleted),
        ];
        for (label, tracks) in sections {
            for track in tracks {
                out.push_str(&format!("  {:<8} {}\n", label, track));
            }
        }
    }
    out
}
