/// Output formatting: terminal table, JSON, and shareable text.
use serde::Serialize;
use trackrank_core::Decision;

/// How the final ranking is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Text,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    name: &'a str,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    album: &'a str,
    items: Vec<JsonRankedItem<'a>>,
    decisions: usize,
    max_decisions: usize,
}

/// Render the final order as a numbered terminal table.
pub fn render_table(album: &str, order: &[String], decisions: usize) -> String {
    let name_width = order.iter().map(|s| s.chars().count()).max().unwrap_or(4).max(4);
    let mut out = String::new();

    out.push_str(&format!("  # | {:<name_width$}\n", "Song"));
    out.push_str(&format!("----|-{}\n", "-".repeat(name_width)));
    for (i, name) in order.iter().enumerate() {
        out.push_str(&format!("{:>3} | {}\n", i + 1, name));
    }
    out.push_str(&format!(
        "\n{} songs from {} ranked in {} decisions\n",
        order.len(),
        album,
        decisions,
    ));
    out
}

/// Render the final order as pretty JSON.
pub fn render_json(album: &str, order: &[String], decisions: usize, max_decisions: usize) -> serde_json::Result<String> {
    let items = order
        .iter()
        .enumerate()
        .map(|(i, name)| JsonRankedItem { rank: i + 1, name })
        .collect();

    serde_json::to_string_pretty(&JsonOutput {
        album,
        items,
        decisions,
        max_decisions,
    })
}

/// Plain text suitable for pasting elsewhere.
pub fn render_share_text(album: &str, order: &[String]) -> String {
    let mut out = format!("My {album} Ranking:\n\n");
    for (i, name) in order.iter().enumerate() {
        out.push_str(&format!("#{} {}\n", i + 1, name));
    }
    out
}

/// One JSON line per decision, naming both candidates and the pick.
pub fn render_decision_lines(decisions: &[Decision], names: &[String]) -> Vec<String> {
    decisions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            serde_json::json!({
                "step": i + 1,
                "left": names[d.left],
                "right": names[d.right],
                "choice": d.side,
                "winner": names[d.winner()],
            })
            .to_string()
        })
        .collect()
}
