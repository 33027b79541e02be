use anyhow::{bail, Result};

use unitunes_core::{parse_playlist_id, CatalogKind, Playlist};

use crate::app::App;

pub fn view(app: &App, name: &str) -> Result<()> {
    let playlist = app.library.load(name)?;
    print!("{}", render(&playlist));
    Ok(())
}

fn render(playlist: &Playlist) -> String {
    let mut out = format!("{}\n", playlist.name);
    if !playlist.description.is_empty() {
        out.push_str(&format!("{}\n", playlist.description));
    }
    for (kind, id) in &playlist.uris {
        out.push_str(&format!("  linked to {} playlist {}\n", kind, id));
    }
    out.push('\n');

    for (idx, track) in playlist.tracks.iter().enumerate() {
        out.push_str(&format!("{:>4}. {}\n", idx + 1, track));
        for uri in &track.uris {
            out.push_str(&format!("        {}\n", uri.url()));
        }
    }
    out
}

pub fn add(app: &App, name: &str, description: &str) -> Result<()> {
    if app.library.exists(name) {
        bail!("Playlist {} already exists", name);
    }

    let mut playlist = Playlist::new(name);
    playlist.description = description.to_string();
    let path = app.library.save(&playlist)?;
    println!("Created {} at {:?}", name, path);
    Ok(())
}

pub fn link(app: &App, name: &str, kind: CatalogKind, remote: &str) -> Result<()> {
    let mut playlist = app.library.load(name)?;
    let id = parse_playlist_id(kind, remote)?;

    if let Some(previous) = playlist.find_uri(kind) {
        if previous != id {
            println!("Replacing {} link {} with {}", kind, previous, id);
        }
    }
    playlist.link(kind, id.clone());
    app.library.save(&playlist)?;
    println!("Linked {} to {} playlist {}", name, kind, id);
    Ok(())
}

pub fn list(app: &App) -> Result<()> {
    for name in app.library.names()? {
        let playlist = app.library.load(&name)?;
        let links: Vec<&str> = playlist.uris.keys().map(|k| k.as_str()).collect();
        println!(
            "{} ({} tracks) [{}]",
            name,
            playlist.tracks.len(),
            links.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitunes_core::{CatalogUri, Track};

    #[test]
    fn test_render_lists_links_and_track_urls() {
        let mut playlist = Playlist::new("anime");
        playlist.link(CatalogKind::BeatSaber, "12345");
        playlist.tracks.push(
            Track::new("Gurenge")
                .with_artists(["LiSA"])
                .with_uri(CatalogUri::new(CatalogKind::BeatSaber, "1a2b3")),
        );

        let text = render(&playlist);
        assert!(text.starts_with("anime\n"));
        assert!(text.contains("linked to beatsaber playlist 12345"));
        assert!(text.contains("   1. Gurenge - LiSA"));
        assert!(text.contains("https://beatsaver.com/maps/1a2b3"));
    }
}
