use crate::snapshot::PlayerIndex;
use thiserror::Error;

/// Failures talking to the scoreboard or interpreting what it sent back.
///
/// The poller absorbs every one of these: a failed tick leaves the view as it was.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("scoreboard request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("scoreboard did not answer within {millis} ms")]
    Timeout { millis: u64 },

    #[error("scoreboard answered {url} with status {status:?}")]
    Server { url: String, status: String },

    #[error("malformed scoreboard payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("player index {0} is outside the four seats")]
    InvalidPlayer(i64),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("command refused locally: {0}")]
    Refused(#[from] Refusal),
}

/// Why a control command was not sent.
///
/// These mirror checks the server performs anyway; they only spare the user a
/// round-trip that would be rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    #[error("no game status has been received yet")]
    NoSnapshot,
    #[error("a game is not running")]
    GameNotRunning,
    #[error("a game is in progress")]
    GameInProgress,
    #[error("the game cannot be started yet")]
    CannotStart,
    #[error("player {0} is not registered")]
    PlayerNotRegistered(PlayerIndex),
    #[error("player {0} has been eliminated")]
    PlayerEliminated(PlayerIndex),
    #[error("a tournament is already active")]
    TournamentActive,
    #[error("no tournament is active")]
    NoTournament,
}

pub type Result<T, E = BoardError> = std::result::Result<T, E>;
