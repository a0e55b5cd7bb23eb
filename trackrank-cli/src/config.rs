/// Config file loading and creation for the trackrank CLI.
///
/// Config lives at ~/.config/trackrank/config.toml.
/// All fields are optional — CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct TrackrankConfig {
    /// Path or http(s) URL of the track database.
    pub database: Option<String>,
    pub shuffle: Option<bool>,
    /// "table", "json" or "text".
    pub output: Option<String>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# trackrank configuration
# All values here can be overridden by CLI flags.

# Track database: local path or http(s) URL.
# Albums start with \"--- Album: <name>\", songs with \"-- Track N: <title>\".
# database = \"/path/to/database.txt\"

# Shuffle the starting order before ranking (use --seed to make it repeatable)
# shuffle = false

# Result format: \"table\", \"json\" or \"text\"
# output = \"table\"
";

/// Returns the default config path: ~/.config/trackrank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("trackrank").join("config.toml")
}

pub fn parse_config(content: &str) -> Result<TrackrankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> TrackrankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => TrackrankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
