//! Herald Configuration
//!
//! Loads and saves the agent's configuration from `~/.herald/herald.json`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::{default_config, HeraldConfig};

/// Config file name within the herald directory.
const CONFIG_FILENAME: &str = "herald.json";

/// Environment fallback for the board API token.
pub const BOARD_TOKEN_ENV: &str = "HERALD_BOARD_TOKEN";

/// Returns the herald state directory: `~/.herald`.
pub fn get_herald_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
    home.join(".herald")
}

/// Returns the full path to the config file: `~/.herald/herald.json`.
pub fn get_config_path() -> PathBuf {
    get_herald_dir().join(CONFIG_FILENAME)
}

/// Load the herald config from disk.
///
/// Reads `~/.herald/herald.json`, merges empty fields with defaults, and
/// falls back to `HERALD_BOARD_TOKEN` if the file does not carry a board
/// token. The generation API key is resolved later by the provider
/// factory, which knows the per-provider environment variables.
///
/// Returns `None` if the config file does not exist or cannot be parsed.
pub fn load_config() -> Option<HeraldConfig> {
    let mut config = load_config_from(&get_config_path())?;

    if config.board_api_token.is_empty() {
        if let Ok(token) = std::env::var(BOARD_TOKEN_ENV) {
            config.board_api_token = token;
        }
    }

    Some(config)
}

/// Load and merge a config from an explicit path.
pub fn load_config_from(path: &Path) -> Option<HeraldConfig> {
    if !path.exists() {
        return None;
    }

    let contents = fs::read_to_string(path).ok()?;
    let mut config: HeraldConfig = serde_json::from_str(&contents).ok()?;

    // Merge defaults for fields left empty or zero
    let defaults = default_config();

    if config.board_api_url.is_empty() {
        config.board_api_url = defaults.board_api_url;
    }
    if config.generation_provider.is_empty() {
        config.generation_provider = defaults.generation_provider;
    }
    if config.max_generation_tokens == 0 {
        config.max_generation_tokens = defaults.max_generation_tokens;
    }
    if config.persona.is_empty() {
        config.persona = defaults.persona;
    }
    if config.category.is_empty() {
        config.category = defaults.category;
    }
    if config.heartbeat_interval_secs == 0 {
        config.heartbeat_interval_secs = defaults.heartbeat_interval_secs;
    }
    if config.post_cooldown_minutes == 0 {
        config.post_cooldown_minutes = defaults.post_cooldown_minutes;
    }
    if config.comment_window_minutes == 0 {
        config.comment_window_minutes = defaults.comment_window_minutes;
    }
    if config.version.is_empty() {
        config.version = defaults.version;
    }

    Some(config)
}

/// Save the herald config to disk at `~/.herald/herald.json`.
pub fn save_config(config: &HeraldConfig) -> Result<()> {
    save_config_to(&get_config_path(), config)
}

/// Save a config to an explicit path.
///
/// Creates the parent directory with mode 0o700 if it does not exist.
/// The config file is written with mode 0o600 since it carries API keys.
pub fn save_config_to(path: &Path, config: &HeraldConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create herald directory")?;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }

    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, &json).context("Failed to write config file")?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Write a default config file if none exists yet.
///
/// Returns the config path and whether a fresh file was written. An
/// existing file is never overwritten.
pub fn write_default_config() -> Result<(PathBuf, bool)> {
    let path = get_config_path();
    if path.exists() {
        return Ok((path, false));
    }

    save_config_to(&path, &default_config())?;
    Ok((path, true))
}
