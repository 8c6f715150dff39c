use crate::error::{
    BoardError,
    Result,
};
use serde::Deserialize;
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(800);

/// Endpoint paths, relative to the board's base URL.
///
/// Deployments have moved these around; any subset can be overridden from a
/// JSON file and the rest keep their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub status: String,
    pub can_start: String,
    pub start_game: String,
    pub stop_game: String,
    pub set_score: String,
    pub set_turn: String,
    pub scoring_event: String,
    pub register_player: String,
    pub unregister_player: String,
    pub activate_tournament: String,
    pub deactivate_tournament: String,
    pub activate_game: String,
    pub update_registry: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            status: "/status/game".to_string(),
            can_start: "/status/can_start".to_string(),
            start_game: "/control/gbegin".to_string(),
            stop_game: "/control/gend".to_string(),
            set_score: "/control/setscore".to_string(),
            set_turn: "/control/setturn".to_string(),
            scoring_event: "/control/event".to_string(),
            register_player: "/control/pregister".to_string(),
            unregister_player: "/control/punregister".to_string(),
            activate_tournament: "/control/activateTournament".to_string(),
            deactivate_tournament: "/control/deactivateTournament".to_string(),
            activate_game: "/control/activateGame".to_string(),
            update_registry: "/cbcentral/update".to_string(),
        }
    }
}

impl Endpoints {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| BoardError::Config {
            message: format!("reading endpoints file {}: {err}", path.display()),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            endpoints: Endpoints::default(),
        }
    }
}

impl BoardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// The timeout bounds each request, not a whole tick. A stopped tick makes
    /// two requests in a row and may take up to twice the timeout; ticks that
    /// overrun are delayed, never run concurrently. A single request still has
    /// to fit within one interval.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(BoardError::Config {
                message: message.to_string(),
            })
        };
        if self.base_url.trim().is_empty() {
            return fail("base URL is empty");
        }
        if self.poll_interval.is_zero() {
            return fail("poll interval must be positive");
        }
        if self.request_timeout.is_zero() {
            return fail("request timeout must be positive");
        }
        if self.request_timeout >= self.poll_interval {
            return fail("request timeout must be shorter than the poll interval");
        }
        Ok(())
    }
}

/// Where the rolling log file goes; the terminal belongs to the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "web-board.log".to_string(),
            level: "info".to_string(),
        }
    }
}
