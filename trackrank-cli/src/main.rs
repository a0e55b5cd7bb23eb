mod config;
mod database;
mod output;
mod prompt;

use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trackrank_core::{RankError, RankingSession, SessionState, Side};

use crate::database::{find_album, load_database, Album};
use crate::output::OutputFormat;
use crate::prompt::Outcome;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "trackrank", version, about = "Rank an album's songs by picking favorites two at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Rank the songs of an album (or any list) head to head
    Rank(RankArgs),
    /// List the albums in the track database
    Albums(AlbumsArgs),
    /// Create a default config file at ~/.config/trackrank/config.toml
    Init,
}

#[derive(Parser)]
struct AlbumsArgs {
    /// Track database: local path or http(s) URL
    #[arg(long)]
    database: Option<String>,

    /// Path to config file (default: ~/.config/trackrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser)]
struct RankArgs {
    /// Track database: local path or http(s) URL
    #[arg(long)]
    database: Option<String>,

    /// Album to rank. Prompts for one when omitted.
    #[arg(long)]
    album: Option<String>,

    /// File with one item per line, or a JSON array of strings
    #[arg(long, conflicts_with = "album")]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item", conflicts_with = "album")]
    inline_items: Vec<String>,

    /// Heading used for results when ranking --items/--item lists
    #[arg(long, default_value = "List")]
    title: String,

    /// Shuffle the starting order before ranking
    #[arg(long)]
    shuffle: bool,

    /// Seed for --shuffle, makes the starting order repeatable
    #[arg(long)]
    seed: Option<u64>,

    /// Recorded answers to apply before prompting, e.g. "LRRL"
    #[arg(long)]
    replay: Option<String>,

    /// Result format: "table", "json" or "text"
    #[arg(long)]
    format: Option<String>,

    /// Also write the shareable text ranking to this file
    #[arg(long)]
    save_to: Option<PathBuf>,

    /// Write every decision as JSON lines to this file
    #[arg(long)]
    save_decisions: Option<PathBuf>,

    /// Path to config file (default: ~/.config/trackrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "trackrank=debug,trackrank_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Parse a string as either a JSON array of strings or plain text (one item per line).
fn parse_items_from_str(content: &str) -> Vec<String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let items: Vec<String> = serde_json::from_str(trimmed)
            .unwrap_or_else(|e| bail(format!("File looks like JSON but failed to parse: {e}")));
        items.into_iter().filter(|s| !s.trim().is_empty()).collect()
    } else {
        trimmed
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Items from --items and --item. Empty when neither was given.
fn load_custom_items(args: &RankArgs) -> Vec<String> {
    let mut items = Vec::new();

    if let Some(ref path) = args.items {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        items = parse_items_from_str(&content);
    }

    items.extend(args.inline_items.iter().cloned());
    items
}

/// True when the user asked for a custom list, even one that turns out empty.
fn has_custom_items(args: &RankArgs) -> bool {
    args.items.is_some() || !args.inline_items.is_empty()
}

fn shuffle_items(items: &mut [String], seed: u64) {
    items.shuffle(&mut StdRng::seed_from_u64(seed));
}

/// Seed for the starting shuffle, or `None` when not shuffling.
///
/// Always concrete when shuffling so a quit session can be resumed in the same order.
fn resolve_shuffle_seed(shuffle: bool, seed: Option<u64>) -> Option<u64> {
    shuffle.then(|| seed.unwrap_or_else(rand::random::<u64>))
}

/// Build a session over `items`, shuffling first when a seed is given.
fn start_session(
    mut items: Vec<String>,
    shuffle_seed: Option<u64>,
) -> Result<RankingSession<String>, RankError> {
    if let Some(seed) = shuffle_seed {
        shuffle_items(&mut items, seed);
        debug!(seed, "Shuffled starting order");
    }
    let mut session = RankingSession::new();
    session.start(items)?;
    Ok(session)
}

/// Keep asking for an album until one with enough songs is picked.
///
/// An album with fewer than two songs is a notice, not an error: the user
/// goes back to album selection.
fn pick_album_session<R: BufRead, W: Write>(
    albums: &[Album],
    input: &mut R,
    output: &mut W,
    shuffle_seed: Option<u64>,
) -> anyhow::Result<Option<(String, RankingSession<String>)>> {
    loop {
        let Some(album) = prompt::choose_album(albums, input, output)? else {
            return Ok(None);
        };
        match start_session(album.tracks.clone(), shuffle_seed) {
            Ok(session) => return Ok(Some((album.name.clone(), session))),
            Err(RankError::InsufficientItems { got }) => {
                writeln!(output, "Not enough songs to rank in {} ({got}). Pick another album.", album.name)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Flags that restart a quit session at the same point: same starting order, same answers.
fn resume_flags(sides: &[Side], shuffle_seed: Option<u64>) -> String {
    let replay: String = sides.iter().map(|s| s.as_char()).collect();
    match shuffle_seed {
        Some(seed) => format!("--shuffle --seed {seed} --replay {replay}"),
        None => format!("--replay {replay}"),
    }
}

async fn load_albums(database: Option<String>, config_path: &std::path::Path) -> Vec<Album> {
    let source = database.unwrap_or_else(|| {
        bail(format!("No database specified. Pass --database or set it in {}", config_path.display()));
    });
    load_database(&source)
        .await
        .unwrap_or_else(|e| bail(format!("{e:#}")))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => {
            init_tracing(args.verbose);
            run_rank(args).await;
        }
        Commands::Albums(args) => {
            init_tracing(args.verbose);
            run_albums(args).await;
        }
        Commands::Init => {
            let path = config::config_path();
            config::create_default_config(&path);
            println!("Created config at {}", path.display());
            println!("Edit it to set your default database, output format, etc.");
        }
    }
}

async fn run_albums(args: AlbumsArgs) {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);
    let albums = load_albums(args.database.or(cfg.database), &config_path).await;

    if albums.is_empty() {
        println!("No albums found.");
        return;
    }
    for album in &albums {
        println!("{} ({} tracks)", album.name, album.tracks.len());
    }
}

async fn run_rank(args: RankArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let shuffle = args.shuffle || cfg.shuffle.unwrap_or(false);
    let shuffle_seed = resolve_shuffle_seed(shuffle, args.seed);
    let format_name = args.format.clone().or(cfg.output).unwrap_or_else(|| "table".to_string());
    let format = OutputFormat::parse(&format_name).unwrap_or_else(|| {
        bail(format!("Unknown format \"{format_name}\". Use \"table\", \"json\" or \"text\"."))
    });
    let replay = match args.replay.as_deref() {
        Some(s) => Side::parse_sequence(s).unwrap_or_else(|e| bail(format!("--replay: {e}"))),
        None => Vec::new(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    // Prompts go to stderr so stdout carries only the result.
    let mut prompts = io::stderr();

    let (title, mut session) = if has_custom_items(&args) {
        let session = start_session(load_custom_items(&args), shuffle_seed).unwrap_or_else(|e| bail(e));
        (args.title.clone(), session)
    } else {
        let albums = load_albums(args.database.clone().or(cfg.database), &config_path).await;
        match args.album.as_deref() {
            Some(name) => {
                let album = find_album(&albums, name)
                    .unwrap_or_else(|| bail(format!("No album named \"{name}\" in the database")));
                let session = start_session(album.tracks.clone(), shuffle_seed)
                    .unwrap_or_else(|e| bail(format!("{}: {e}", album.name)));
                (album.name.clone(), session)
            }
            None => {
                if !io::stdin().is_terminal() {
                    bail("No album given. Pass --album when input is not a terminal.");
                }
                match pick_album_session(&albums, &mut input, &mut prompts, shuffle_seed) {
                    Ok(Some(picked)) => picked,
                    Ok(None) => return,
                    Err(e) => bail(e),
                }
            }
        }
    };

    info!(title = %title, items = session.items().len(), "Ranking started");

    for (i, &side) in replay.iter().enumerate() {
        if let Err(e) = session.choose(side) {
            bail(format!("--replay answer {} ({side}): {e}", i + 1));
        }
    }
    if !replay.is_empty() {
        debug!(applied = replay.len(), "Replayed recorded answers");
    }

    if session.state() == SessionState::AwaitingChoice {
        match prompt::run_session(&mut session, &mut input, &mut prompts) {
            Ok(Outcome::Complete) => {}
            Ok(Outcome::Quit) => {
                eprintln!(
                    "\nStopped after {} answers. Resume with {}",
                    session.decisions_made(),
                    resume_flags(&session.sides(), shuffle_seed),
                );
                return;
            }
            Err(e) => bail(e),
        }
    }

    let progress = session.progress();
    let history = session.history().to_vec();
    let names = session.items().to_vec();
    let order = session.into_final_order().unwrap_or_else(|| bail("Ranking did not complete"));

    match format {
        OutputFormat::Table => print!("{}", output::render_table(&title, &order, progress.decisions_made)),
        OutputFormat::Text => print!("{}", output::render_share_text(&title, &order)),
        OutputFormat::Json => {
            let json = output::render_json(&title, &order, progress.decisions_made, progress.max_decisions)
                .unwrap_or_else(|e| bail(format!("Failed to serialize results: {e}")));
            println!("{json}");
        }
    }

    if let Some(ref path) = args.save_to {
        std::fs::write(path, output::render_share_text(&title, &order))
            .unwrap_or_else(|e| bail(format!("Failed to write {}: {e}", path.display())));
        info!(path = %path.display(), "Saved ranking");
    }

    if let Some(ref path) = args.save_decisions {
        let mut lines = output::render_decision_lines(&history, &names).join("\n");
        lines.push('\n');
        std::fs::write(path, lines)
            .unwrap_or_else(|e| bail(format!("Failed to write {}: {e}", path.display())));
        info!(path = %path.display(), decisions = history.len(), "Saved decisions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn albums() -> Vec<Album> {
        vec![
            Album { name: "Single".into(), tracks: vec!["Only".into()] },
            Album { name: "Red".into(), tracks: vec!["State of Grace".into(), "Red".into(), "22".into()] },
        ]
    }

    #[test]
    fn test_parse_items_plain_and_json() {
        assert_eq!(parse_items_from_str("a\n\n  b \n"), vec!["a", "b"]);
        assert_eq!(parse_items_from_str("[\"x\", \" \", \"y\"]"), vec!["x", "y"]);
    }

    #[test]
    fn test_seeded_shuffle_is_repeatable() {
        let base: Vec<String> = (0..20).map(|i| format!("Track {i}")).collect();
        let mut a = base.clone();
        let mut b = base.clone();
        shuffle_items(&mut a, 7);
        shuffle_items(&mut b, 7);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        let mut expected = base;
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_start_session_rejects_single_item() {
        let err = start_session(vec!["OnlySong".into()], None).unwrap_err();
        assert_eq!(err, RankError::InsufficientItems { got: 1 });
    }

    #[test]
    fn test_pick_album_returns_to_selection_on_short_album() {
        let albums = albums();
        let mut output = Vec::new();
        let picked = pick_album_session(&albums, &mut Cursor::new("1\n2\n"), &mut output, None)
            .unwrap()
            .unwrap();
        assert_eq!(picked.0, "Red");
        assert_eq!(picked.1.state(), SessionState::AwaitingChoice);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Not enough songs to rank in Single (1)"));
    }

    #[test]
    fn test_pick_album_quit() {
        let albums = albums();
        let picked = pick_album_session(&albums, &mut Cursor::new("q\n"), &mut Vec::new(), None).unwrap();
        assert!(picked.is_none());
    }

    #[test]
    fn test_shuffle_seed_is_always_concrete_when_shuffling() {
        assert_eq!(resolve_shuffle_seed(false, Some(3)), None);
        assert_eq!(resolve_shuffle_seed(true, Some(3)), Some(3));
        assert!(resolve_shuffle_seed(true, None).is_some());
    }

    #[test]
    fn test_resumed_shuffled_session_matches_original() {
        let items: Vec<String> = (0..10).map(|i| format!("T{i}")).collect();
        let seed = resolve_shuffle_seed(true, None);

        let mut first = start_session(items.clone(), seed).unwrap();
        for side in [Side::Left, Side::Right, Side::Left] {
            first.choose(side).unwrap();
        }
        let sides = first.sides();

        let mut resumed = start_session(items, seed).unwrap();
        assert_eq!(first.items(), resumed.items());
        for &side in &sides {
            resumed.choose(side).unwrap();
        }
        assert_eq!(first.current_pair(), resumed.current_pair());

        while first.state() == SessionState::AwaitingChoice {
            first.choose(Side::Right).unwrap();
            resumed.choose(Side::Right).unwrap();
        }
        assert_eq!(first.final_order(), resumed.final_order());
    }

    #[test]
    fn test_resume_flags() {
        let sides = [Side::Left, Side::Right];
        assert_eq!(resume_flags(&sides, None), "--replay LR");
        assert_eq!(resume_flags(&sides, Some(42)), "--shuffle --seed 42 --replay LR");
    }

    #[test]
    fn test_empty_items_file_is_insufficient_not_album_fallback() {
        let path = std::env::temp_dir().join(format!("trackrank-items-{}.txt", std::process::id()));
        std::fs::write(&path, "\n  \n\n").unwrap();
        let cli = Cli::try_parse_from(["trackrank", "rank", "--items", path.to_str().unwrap()]).unwrap();
        let Commands::Rank(args) = cli.command else { panic!("expected rank command") };

        assert!(has_custom_items(&args));
        let items = load_custom_items(&args);
        std::fs::remove_file(&path).unwrap();
        assert!(items.is_empty());
        let err = start_session(items, None).unwrap_err();
        assert_eq!(err, RankError::InsufficientItems { got: 0 });
    }

    #[test]
    fn test_no_custom_items_uses_album_path() {
        let cli = Cli::try_parse_from(["trackrank", "rank", "--album", "Red"]).unwrap();
        let Commands::Rank(args) = cli.command else { panic!("expected rank command") };
        assert!(!has_custom_items(&args));
    }

    #[test]
    fn test_format_flag_parses() {
        let cli = Cli::try_parse_from(["trackrank", "rank", "--item", "a", "--item", "b", "--format", "json"]).unwrap();
        let Commands::Rank(args) = cli.command else { panic!("expected rank command") };
        assert_eq!(args.format.as_deref().and_then(OutputFormat::parse), Some(OutputFormat::Json));
        assert!(has_custom_items(&args));
    }
}
