//! Application-level configuration loading for the game tuning knobs.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DURBAR_BACK_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Players required before a round may start.
    pub min_players: usize,
    /// Room capacity.
    pub max_players: usize,
    /// Rounds per game.
    pub max_rounds: u32,
    /// Chat backlog bound per room.
    pub chat_history_limit: usize,
    /// Seconds a voting phase may run before unvoted players abstain.
    pub vote_timeout_secs: u64,
    /// Seconds between a round result and the next round (or the game end).
    pub intermission_secs: u64,
    /// Minimum votes the accused must carry for the thief to count as caught.
    pub catch_quorum: usize,
    /// Locale tag rooms start with until the host picks another.
    pub default_language: String,
    /// Start the first round automatically when `min_players` is reached.
    pub auto_start: bool,
    /// Cap on concurrently live rooms; creation beyond it is rejected.
    pub max_rooms: usize,
    /// Directory the static client bundle is served from.
    pub static_dir: String,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded game configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 8,
            max_rounds: 10,
            chat_history_limit: 50,
            vote_timeout_secs: 60,
            intermission_secs: 5,
            catch_quorum: 2,
            default_language: "gu".into(),
            auto_start: false,
            max_rooms: 256,
            static_dir: "public".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file. Every field is optional;
/// omitted fields keep their default.
struct RawConfig {
    min_players: Option<usize>,
    max_players: Option<usize>,
    max_rounds: Option<u32>,
    chat_history_limit: Option<usize>,
    vote_timeout_secs: Option<u64>,
    intermission_secs: Option<u64>,
    catch_quorum: Option<usize>,
    default_language: Option<String>,
    auto_start: Option<bool>,
    max_rooms: Option<usize>,
    static_dir: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let mut config = Self {
            min_players: raw.min_players.unwrap_or(defaults.min_players),
            max_players: raw.max_players.unwrap_or(defaults.max_players),
            max_rounds: raw.max_rounds.unwrap_or(defaults.max_rounds),
            chat_history_limit: raw.chat_history_limit.unwrap_or(defaults.chat_history_limit),
            vote_timeout_secs: raw.vote_timeout_secs.unwrap_or(defaults.vote_timeout_secs),
            intermission_secs: raw.intermission_secs.unwrap_or(defaults.intermission_secs),
            catch_quorum: raw.catch_quorum.unwrap_or(defaults.catch_quorum),
            default_language: raw.default_language.unwrap_or(defaults.default_language),
            auto_start: raw.auto_start.unwrap_or(defaults.auto_start),
            max_rooms: raw.max_rooms.unwrap_or(defaults.max_rooms),
            static_dir: raw.static_dir.unwrap_or(defaults.static_dir),
        };

        // Role assignment needs the four base roles; a smaller minimum can
        // not produce a valid round.
        if config.min_players < 4 {
            warn!(
                min_players = config.min_players,
                "min_players below 4 is not playable; clamping"
            );
            config.min_players = 4;
        }
        if config.max_players < config.min_players {
            warn!(
                max_players = config.max_players,
                min_players = config.min_players,
                "max_players below min_players; clamping"
            );
            config.max_players = config.min_players;
        }

        config
    }
}

/// Resolve the config path, preferring the environment override.
fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
