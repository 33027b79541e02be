use anyhow::Result;
use futures::{stream, StreamExt};
use tracing::info;

use unitunes_core::{CatalogError, CatalogKind, DefaultMatcher, ScoredTrack, Track};

use super::fit;
use crate::app::App;
use crate::progress;

const COLUMN: usize = 48;

pub struct SearchOptions {
    pub show_all: bool,
    pub only_failed: bool,
    pub explain: bool,
    pub limit: usize,
    pub link: bool,
    pub concurrency: usize,
}

/// Search `kind` for every playlist track not yet linked to it and print the
/// uncertain or failed resolutions.
pub async fn run(app: &App, kind: CatalogKind, name: &str, options: &SearchOptions) -> Result<()> {
    let mut playlist = app.library.load(name)?;
    let catalog = app.catalogs.searchable(kind)?;

    let pending: Vec<usize> = (0..playlist.tracks.len())
        .filter(|&idx| playlist.tracks[idx].uri(kind).is_none())
        .collect();
    info!(
        playlist = %name,
        catalog = %kind,
        pending = pending.len(),
        linked = playlist.tracks.len() - pending.len(),
        "Searching"
    );

    let pb = progress::create_progress_bar(pending.len() as u64, "Searching");
    let searcher = &app.searcher;
    let tracks = &playlist.tracks;
    let results: Vec<Result<Vec<ScoredTrack>, CatalogError>> = stream::iter(pending.iter())
        .map(|&idx| {
            let pb = pb.clone();
            async move {
                let result = searcher
                    .search(catalog, &tracks[idx], Some(options.limit.max(1)))
                    .await;
                pb.inc(1);
                result
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    let explainer = DefaultMatcher::with_config(app.config.matcher.clone());
    let uncertain_below = app.searcher.config().early_stop_threshold;
    let mut found = 0;
    let mut to_link: Vec<(usize, Track)> = Vec::new();

    println!(
        "{:<width$}  {:<width$}  {:>5}",
        "Original",
        "Predicted",
        "Score",
        width = COLUMN
    );

    for (&idx, result) in pending.iter().zip(results) {
        let candidates = result?;
        let original = &playlist.tracks[idx];
        let prediction = candidates
            .first()
            .filter(|best| app.searcher.matcher().matches(original, &best.track));

        let shown: &[ScoredTrack] = match prediction {
            Some(best) => {
                found += 1;
                to_link.push((idx, best.track.clone()));
                if options.only_failed || (!options.show_all && best.score >= uncertain_below) {
                    continue;
                }
                &candidates[..1]
            }
            None => {
                if !(options.show_all || options.only_failed) {
                    continue;
                }
                println!("{:<width$}", fit(&original.to_string(), COLUMN), width = COLUMN);
                &candidates
            }
        };

        for (n, candidate) in shown.iter().enumerate() {
            let left = if prediction.is_some() && n == 0 {
                fit(&original.to_string(), COLUMN)
            } else {
                String::new()
            };
            println!(
                "{:<width$}  {:<width$}  {:>5.2}",
                left,
                fit(&candidate.track.to_string(), COLUMN),
                candidate.score,
                width = COLUMN
            );
            if options.explain {
                println!("{:<width$}  {}", "", explainer.explain(original, &candidate.track), width = COLUMN);
            }
        }
    }

    println!();
    println!("{} tracks found", found);
    println!("{} tracks not found", pending.len() - found);

    if options.link && !to_link.is_empty() {
        for (idx, remote) in &to_link {
            playlist.tracks[*idx].merge(remote);
        }
        app.library.save(&playlist)?;
        println!("Linked {} tracks to {}", to_link.len(), kind);
    }
    Ok(())
}
