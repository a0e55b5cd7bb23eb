/// Track-listing database: parse albums and their songs from plain text.
///
/// Format:
///   --- Album: <name>
///   -- Track 1: <title>
///   - (Deluxe) Track 14: <title>
///
/// Slashes are stripped from every line. Anything that is not an album header
/// or a track line is ignored.
use anyhow::{Context, Result};
use tracing::{debug, info};

const ALBUM_PREFIX: &str = "--- Album:";
const TRACK_PREFIXES: [&str; 2] = ["-- Track", "- (Deluxe)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub tracks: Vec<String>,
}

/// Parse database text into albums, in file order.
///
/// A repeated album header starts that album's track list over.
pub fn parse_database(text: &str) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();
    let mut current: Option<usize> = None;

    for raw in text.lines() {
        let line = raw.replace('/', "");
        let line = line.trim();

        if let Some(name) = line.strip_prefix(ALBUM_PREFIX) {
            let name = name.trim().to_string();
            let idx = match albums.iter().position(|a| a.name == name) {
                Some(idx) => {
                    albums[idx].tracks.clear();
                    idx
                }
                None => {
                    albums.push(Album { name, tracks: Vec::new() });
                    albums.len() - 1
                }
            };
            current = Some(idx);
        } else if TRACK_PREFIXES.iter().any(|p| line.starts_with(p)) {
            let Some(idx) = current else { continue };
            // Everything after the first colon, so titles may contain colons.
            if let Some((_, title)) = line.split_once(':') {
                let title = title.trim();
                if !title.is_empty() {
                    albums[idx].tracks.push(title.to_string());
                }
            }
        }
    }

    albums
}

/// Look up an album by exact name, falling back to a case-insensitive match.
pub fn find_album<'a>(albums: &'a [Album], name: &str) -> Option<&'a Album> {
    let name = name.trim();
    albums
        .iter()
        .find(|a| a.name == name)
        .or_else(|| albums.iter().find(|a| a.name.eq_ignore_ascii_case(name)))
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load and parse a database from a local path or an http(s) URL.
pub async fn load_database(source: &str) -> Result<Vec<Album>> {
    let text = if is_url(source) {
        debug!(url = source, "Fetching track database");
        reqwest::get(source)
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to fetch database from {source}"))?
            .text()
            .await
            .with_context(|| format!("Failed to read database body from {source}"))?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read database file {source}"))?
    };

    let albums = parse_database(&text);
    info!(albums = albums.len(), source, "Loaded track database");
    Ok(albums)
}
