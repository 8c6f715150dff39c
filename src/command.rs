use crate::{
    config::Endpoints,
    error::Refusal,
    snapshot::{
        GameSnapshot,
        GameStatus,
        PlayerIndex,
        Score,
    },
};
use std::fmt;

/// A control request for the scoreboard. Sent as a GET, answer ignored beyond its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    StartGame,
    StopGame,
    SetScore { player: PlayerIndex, score: Score },
    SetTurn { player: PlayerIndex },
    ScoringEvent { player: PlayerIndex, event: String },
    RegisterPlayer { player: PlayerIndex, player_id: String },
    UnregisterPlayer { player: PlayerIndex },
    ActivateTournament { tournament_id: String },
    DeactivateTournament,
    ActivateGame { game_id: String },
    UpdateRegistry,
}

impl Command {
    pub fn path(&self, endpoints: &Endpoints) -> String {
        match self {
            Command::StartGame => endpoints.start_game.clone(),
            Command::StopGame => endpoints.stop_game.clone(),
            Command::SetScore { player, score } => {
                format!("{}/{player},{}", endpoints.set_score, score.value())
            }
            Command::SetTurn { player } => format!("{}/{player}", endpoints.set_turn),
            Command::ScoringEvent { player, event } => {
                format!("{}/{player},{event}", endpoints.scoring_event)
            }
            Command::RegisterPlayer { player, player_id } => {
                format!("{}/{player},{player_id}", endpoints.register_player)
            }
            Command::UnregisterPlayer { player } => {
                format!("{}/{player}", endpoints.unregister_player)
            }
            Command::ActivateTournament { tournament_id } => {
                format!("{}/{tournament_id}", endpoints.activate_tournament)
            }
            Command::DeactivateTournament => endpoints.deactivate_tournament.clone(),
            Command::ActivateGame { game_id } => {
                format!("{}/{game_id}", endpoints.activate_game)
            }
            Command::UpdateRegistry => endpoints.update_registry.clone(),
        }
    }

    /// Local precondition check against the last snapshot seen.
    ///
    /// Passing it does not mean the server will accept the command.
    pub fn check(&self, last: Option<&GameSnapshot>) -> Result<(), Refusal> {
        let snapshot = last.ok_or(Refusal::NoSnapshot)?;
        let status = snapshot.status;
        match self {
            Command::StartGame => {
                if status != GameStatus::Stopped {
                    return Err(Refusal::GameInProgress);
                }
                if snapshot.can_start != Some(true) {
                    return Err(Refusal::CannotStart);
                }
                Ok(())
            }
            Command::StopGame => {
                if status.in_progress() {
                    Ok(())
                } else {
                    Err(Refusal::GameNotRunning)
                }
            }
            Command::SetScore { player, .. }
            | Command::SetTurn { player }
            | Command::ScoringEvent { player, .. } => {
                if status != GameStatus::Started {
                    return Err(Refusal::GameNotRunning);
                }
                if !snapshot.player(*player).registered {
                    return Err(Refusal::PlayerNotRegistered(*player));
                }
                if snapshot.is_eliminated(*player) {
                    return Err(Refusal::PlayerEliminated(*player));
                }
                Ok(())
            }
            Command::RegisterPlayer { .. }
            | Command::UnregisterPlayer { .. }
            | Command::UpdateRegistry => not_in_progress(status),
            Command::ActivateTournament { .. } => {
                not_in_progress(status)?;
                if snapshot.tournament.is_some() {
                    return Err(Refusal::TournamentActive);
                }
                Ok(())
            }
            Command::DeactivateTournament | Command::ActivateGame { .. } => {
                not_in_progress(status)?;
                if snapshot.tournament.is_none() {
                    return Err(Refusal::NoTournament);
                }
                Ok(())
            }
        }
    }
}

fn not_in_progress(status: GameStatus) -> Result<(), Refusal> {
    if status.in_progress() {
        Err(Refusal::GameInProgress)
    } else {
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::StartGame => write!(f, "start game"),
            Command::StopGame => write!(f, "stop game"),
            Command::SetScore { player, score } => {
                write!(f, "set score of player {player} to {}", score.value())
            }
            Command::SetTurn { player } => write!(f, "give turn to player {player}"),
            Command::ScoringEvent { player, event } => {
                write!(f, "scoring event {event} for player {player}")
            }
            Command::RegisterPlayer { player, player_id } => {
                write!(f, "register {player_id} in seat {player}")
            }
            Command::UnregisterPlayer { player } => write!(f, "unregister seat {player}"),
            Command::ActivateTournament { tournament_id } => {
                write!(f, "activate tournament {tournament_id}")
            }
            Command::DeactivateTournament => write!(f, "deactivate tournament"),
            Command::ActivateGame { game_id } => write!(f, "activate tournament game {game_id}"),
            Command::UpdateRegistry => write!(f, "update registry"),
        }
    }
}
