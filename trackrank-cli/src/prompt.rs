/// Interactive terminal prompts: album selection and head-to-head questions.
///
/// Everything here is generic over `BufRead`/`Write` so the loop can be driven
/// by stdin/stdout or by in-memory buffers in tests.
use std::fmt::Display;
use std::io::{BufRead, Write};

use anyhow::Result;
use trackrank_core::{Progress, RankingSession, Side, Turn};

use crate::database::{find_album, Album};

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    /// The user quit, or input ran out, before the ranking finished.
    Quit,
}

enum Answer {
    Pick(Side),
    Quit,
}

fn is_quit(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "q" | "quit" | "exit")
}

/// Read one trimmed line. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// One-line progress summary shown above each question.
pub fn progress_line(progress: &Progress) -> String {
    format!(
        "Pass {} | {} answered (at most {} total, {:.0}%)",
        progress.pass,
        progress.decisions_made,
        progress.max_decisions,
        progress.fraction() * 100.0,
    )
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    left: &str,
    right: &str,
    progress: &Progress,
) -> Result<Option<Answer>> {
    writeln!(output)?;
    writeln!(output, "{}", progress_line(progress))?;
    writeln!(output, "  1) {left}")?;
    writeln!(output, "  2) {right}")?;

    loop {
        write!(output, "Which do you prefer? [1/l, 2/r, q to quit] ")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if is_quit(&line) {
            return Ok(Some(Answer::Quit));
        }
        match line.parse::<Side>() {
            Ok(side) => return Ok(Some(Answer::Pick(side))),
            Err(_) => writeln!(output, "Please answer 1 (left) or 2 (right).")?,
        }
    }
}

/// Ask questions until the session completes or the user quits.
pub fn run_session<T, R, W>(
    session: &mut RankingSession<T>,
    input: &mut R,
    output: &mut W,
) -> Result<Outcome>
where
    T: Display,
    R: BufRead,
    W: Write,
{
    loop {
        let (left, right) = match session.turn() {
            Turn::Compare { left, right } => (left.to_string(), right.to_string()),
            Turn::Complete(_) => return Ok(Outcome::Complete),
        };

        match ask(input, output, &left, &right, &session.progress())? {
            Some(Answer::Pick(side)) => {
                session.choose(side)?;
            }
            Some(Answer::Quit) | None => return Ok(Outcome::Quit),
        }
    }
}

/// List albums and let the user pick one by number or name.
///
/// Returns `None` if the user quits or input runs out.
pub fn choose_album<'a, R: BufRead, W: Write>(
    albums: &'a [Album],
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'a Album>> {
    writeln!(output, "Albums:")?;
    for (i, album) in albums.iter().enumerate() {
        writeln!(output, "{:>3}) {} ({} tracks)", i + 1, album.name, album.tracks.len())?;
    }

    loop {
        write!(output, "Pick an album [number or name, q to quit] ")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if is_quit(&line) {
            return Ok(None);
        }

        let by_number = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| albums.get(i));
        match by_number.or_else(|| find_album(albums, &line)) {
            Some(album) => return Ok(Some(album)),
            None => writeln!(output, "No album matches \"{line}\".")?,
        }
    }
}
