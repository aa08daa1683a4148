//! Client-side settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Logging and session settings.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Names the session in logs and in the saved replay.
    pub session_id: Option<String>,
    /// Also write logs to a daily `skirmish.log` under the log directory.
    pub log_to_file: bool,
    /// Overrides the platform cache directory for log files.
    pub log_dir: Option<PathBuf>,
    /// Where to store the finished battle, if anywhere.
    pub replay_dir: Option<PathBuf>,
    /// Store replays as JSON rather than bincode.
    pub replay_json: bool,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(session) = read_env("SKIRMISH_SESSION") {
            config.session_id = Some(session);
        }
        if let Some(enabled) = read_env("SKIRMISH_LOG_FILE") {
            config.log_to_file = enabled;
        }
        if let Some(dir) = read_env::<PathBuf>("SKIRMISH_LOG_DIR") {
            config.log_dir = Some(dir);
            config.log_to_file = true;
        }

        if let Some(dir) = read_env("SKIRMISH_REPLAY_DIR") {
            config.replay_dir = Some(dir);
        }
        if let Some(json) = read_env("SKIRMISH_REPLAY_JSON") {
            config.replay_json = json;
        }

        config
    }

    /// Session name, generated from the current time when not configured.
    pub fn session(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("session_%Y%m%d_%H%M%S").to_string())
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
