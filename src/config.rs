//! Runtime configuration loaded from an optional JSON file.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::data::DEFAULT_PUZZLES_PATH;
use crate::engine::{DEFAULT_POINTS_PER_CORRECT, DEFAULT_QUESTION_SECONDS, Rules};
use crate::leaderboard::DEFAULT_TOP_N;

/// Default location on disk where the game looks for its JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/brain-teaser.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BRAIN_TEASER_CONFIG_PATH";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub puzzles_path: PathBuf,
    pub question_seconds: u32,
    pub points_per_correct: u32,
    pub leaderboard_limit: usize,
    /// WebSocket URL of the hosted leaderboard; `None` keeps scores in memory.
    pub leaderboard_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl GameConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
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

    pub fn rules(&self) -> Rules {
        Rules {
            question_seconds: self.question_seconds,
            points_per_correct: self.points_per_correct,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            puzzles_path: PathBuf::from(DEFAULT_PUZZLES_PATH),
            question_seconds: DEFAULT_QUESTION_SECONDS,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
            leaderboard_limit: DEFAULT_TOP_N,
            leaderboard_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
