use crate::error::{
    BoardError,
    Result,
};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
};

/// Number of seats on the scoreboard.
pub const SEATS: usize = 4;

/// A seat on the scoreboard, always within `[0, SEATS)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerIndex(u8);

impl PlayerIndex {
    pub fn new(index: usize) -> Result<Self> {
        if index < SEATS {
            Ok(Self(index as u8))
        } else {
            Err(BoardError::InvalidPlayer(index as i64))
        }
    }

    pub fn all() -> impl Iterator<Item = PlayerIndex> {
        (0..SEATS as u8).map(PlayerIndex)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for PlayerIndex {
    type Error = BoardError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value)
            .map_err(|_| BoardError::InvalidPlayer(value))
            .and_then(PlayerIndex::new)
    }
}

impl fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player's score as reported by the server.
///
/// The server uses `-10` as a marker for a player that is out of the game; it is
/// never a real score and renders as `-`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    pub const ELIMINATED: Score = Score(-10);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn is_eliminated(self) -> bool {
        self == Self::ELIMINATED
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eliminated() {
            write!(f, "-")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Stopped,
    Started,
    Paused,
    Finished,
}

impl GameStatus {
    /// Started or paused: the seats are locked and referee controls are live.
    pub fn in_progress(self) -> bool {
        matches!(self, GameStatus::Started | GameStatus::Paused)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Stopped => "stopped",
            GameStatus::Started => "started",
            GameStatus::Paused => "paused",
            GameStatus::Finished => "finished",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Player {
    pub registered: bool,
    pub display_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tournament {
    pub name: String,
    /// Tournament game currently selected on the server, if any.
    pub game_id: Option<String>,
}

/// The server's view of the game at one poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub players: [Player; SEATS],
    pub scores: BTreeMap<PlayerIndex, Score>,
    pub serving: Option<PlayerIndex>,
    pub tournament: Option<Tournament>,
    pub remaining_time_secs: u32,
    pub sequence: Option<u64>,
    /// Only queried while the game is stopped.
    pub can_start: Option<bool>,
}

impl GameSnapshot {
    pub fn player(&self, index: PlayerIndex) -> &Player {
        &self.players[index.get()]
    }

    pub fn score(&self, index: PlayerIndex) -> Option<Score> {
        self.scores.get(&index).copied()
    }

    pub fn is_eliminated(&self, index: PlayerIndex) -> bool {
        self.score(index).is_some_and(Score::is_eliminated)
    }

    /// Registered and not carrying the elimination marker.
    pub fn is_active(&self, index: PlayerIndex) -> bool {
        self.player(index).registered && !self.is_eliminated(index)
    }

    /// Highest score above the elimination marker; the lowest seat wins ties.
    pub fn winner(&self) -> Option<PlayerIndex> {
        let mut best: Option<(PlayerIndex, Score)> = None;
        for (&index, &score) in &self.scores {
            if score <= Score::ELIMINATED {
                continue;
            }
            match best {
                Some((_, high)) if score <= high => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| index)
    }
}

#[derive(Deserialize)]
pub(crate) struct StatusEnvelope {
    pub(crate) status: String,
}

#[derive(Deserialize)]
pub(crate) struct CanStartDto {
    #[serde(default)]
    pub(crate) can_start: bool,
}

#[derive(Deserialize)]
pub(crate) struct GameStatusDto {
    game: GameStatus,
    #[serde(default)]
    players: PlayersDto,
    #[serde(default)]
    scores: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    serving: Option<i64>,
    #[serde(default)]
    tournament: serde_json::Value,
    #[serde(default)]
    tournament_str: Option<String>,
    #[serde(default)]
    game_id: serde_json::Value,
    #[serde(default)]
    remaining_time: i64,
    #[serde(default)]
    game_seq: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlayersDto {
    Seats(BTreeMap<String, PlayerDto>),
    List(Vec<PlayerDto>),
}

impl Default for PlayersDto {
    fn default() -> Self {
        PlayersDto::List(Vec::new())
    }
}

#[derive(Deserialize, Default)]
struct PlayerDto {
    #[serde(default)]
    registered: bool,
    #[serde(default)]
    web_txt: String,
}

impl From<PlayerDto> for Player {
    fn from(dto: PlayerDto) -> Self {
        Player {
            registered: dto.registered,
            display_name: dto.web_txt,
        }
    }
}

fn seat_from_key(key: &str) -> Option<PlayerIndex> {
    let raw = key.trim().parse::<i64>().ok()?;
    match PlayerIndex::try_from(raw) {
        Ok(index) => Some(index),
        Err(err) => {
            tracing::debug!(%err, "dropping out-of-range seat from status payload");
            None
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn game_id_from(value: serde_json::Value) -> Option<String> {
    if !is_truthy(&value) {
        return None;
    }
    match value {
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<GameStatusDto> for GameSnapshot {
    fn from(dto: GameStatusDto) -> Self {
        let mut players: [Player; SEATS] = Default::default();
        match dto.players {
            PlayersDto::Seats(seats) => {
                for (key, player) in seats {
                    if let Some(index) = seat_from_key(&key) {
                        players[index.get()] = player.into();
                    }
                }
            }
            PlayersDto::List(list) => {
                for (slot, player) in players.iter_mut().zip(list) {
                    *slot = player.into();
                }
            }
        }

        // the server folds its own `status` key into the score map
        let scores = dto
            .scores
            .into_iter()
            .filter_map(|(key, value)| {
                let index = seat_from_key(&key)?;
                let value = i32::try_from(value.as_i64()?).ok()?;
                Some((index, Score::new(value)))
            })
            .collect();

        let serving = dto
            .serving
            .and_then(|raw| PlayerIndex::try_from(raw).ok());

        let tournament = is_truthy(&dto.tournament).then(|| Tournament {
            name: dto.tournament_str.unwrap_or_default(),
            game_id: game_id_from(dto.game_id),
        });

        GameSnapshot {
            status: dto.game,
            players,
            scores,
            serving,
            tournament,
            remaining_time_secs: u32::try_from(dto.remaining_time.max(0))
                .unwrap_or(u32::MAX),
            sequence: dto.game_seq,
            can_start: None,
        }
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> GameSnapshot {
        serde_json::from_str::<GameStatusDto>(json).unwrap().into()
    }

    fn seat(i: usize) -> PlayerIndex {
        PlayerIndex::new(i).unwrap()
    }

    #[test]
    fn player_index__rejects_seats_outside_the_board() {
        assert!(PlayerIndex::new(3).is_ok());
        assert!(matches!(
            PlayerIndex::new(4),
            Err(BoardError::InvalidPlayer(4))
        ));
        assert!(PlayerIndex::try_from(-1).is_err());
    }

    #[test]
    fn score__renders_elimination_marker_as_dash() {
        assert_eq!(Score::new(7).to_string(), "7");
        assert_eq!(Score::new(-3).to_string(), "-3");
        assert_eq!(Score::ELIMINATED.to_string(), "-");
    }

    #[test]
    fn decode__reads_full_status_payload() {
        // given
        let json = r#"{
            "status": "ok",
            "game": "started",
            "players": {
                "0": {"registered": true, "web_txt": "Ann"},
                "1": {"registered": true, "web_txt": "Bob"},
                "2": {"registered": false, "web_txt": ""},
                "3": {"registered": true, "web_txt": "Dee"}
            },
            "scores": {"0": 5, "1": 3, "2": -10, "3": 0, "status": "ok"},
            "serving": 1,
            "tournament": true,
            "tournament_str": "Spring Cup",
            "game_id": 17,
            "remaining_time": 754,
            "game_seq": 12
        }"#;

        // when
        let snapshot = decode(json);

        // then
        assert_eq!(snapshot.status, GameStatus::Started);
        assert_eq!(snapshot.player(seat(1)).display_name, "Bob");
        assert!(!snapshot.player(seat(2)).registered);
        assert_eq!(snapshot.scores.len(), 4);
        assert_eq!(snapshot.score(seat(2)), Some(Score::ELIMINATED));
        assert_eq!(snapshot.serving, Some(seat(1)));
        assert_eq!(
            snapshot.tournament,
            Some(Tournament {
                name: "Spring Cup".to_string(),
                game_id: Some("17".to_string()),
            })
        );
        assert_eq!(snapshot.remaining_time_secs, 754);
        assert_eq!(snapshot.sequence, Some(12));
    }

    #[test]
    fn decode__drops_out_of_range_seats_and_serving() {
        // given
        let json = r#"{
            "status": "ok",
            "game": "paused",
            "players": {"0": {"registered": true, "web_txt": "Ann"},
                        "7": {"registered": true, "web_txt": "Ghost"}},
            "scores": {"0": 1, "4": 9, "-1": 2},
            "serving": 6
        }"#;

        // when
        let snapshot = decode(json);

        // then
        assert_eq!(snapshot.scores.len(), 1);
        assert_eq!(snapshot.serving, None);
        assert!(snapshot.players.iter().all(|p| p.display_name != "Ghost"));
    }

    #[test]
    fn decode__accepts_players_as_array() {
        let snapshot = decode(
            r#"{"status":"ok","game":"stopped",
                "players":[{"registered":true,"web_txt":"Ann"},{"registered":false,"web_txt":""}]}"#,
        );

        assert!(snapshot.player(seat(0)).registered);
        assert!(!snapshot.player(seat(3)).registered);
    }

    #[test]
    fn decode__treats_falsy_tournament_fields_as_absent() {
        let snapshot = decode(
            r#"{"status":"ok","game":"stopped","tournament":false,"tournament_str":"x","game_id":7}"#,
        );
        assert_eq!(snapshot.tournament, None);

        let snapshot = decode(
            r#"{"status":"ok","game":"stopped","tournament":true,"tournament_str":"x","game_id":0}"#,
        );
        assert_eq!(snapshot.tournament.unwrap().game_id, None);
    }

    #[test]
    fn decode__clamps_negative_remaining_time() {
        let snapshot = decode(r#"{"status":"ok","game":"started","remaining_time":-4}"#);
        assert_eq!(snapshot.remaining_time_secs, 0);
    }

    #[test]
    fn winner__is_highest_live_score_lowest_seat_on_tie() {
        // given
        let mut snapshot = GameSnapshot::default();
        snapshot.scores.insert(seat(0), Score::new(2));
        snapshot.scores.insert(seat(1), Score::new(6));
        snapshot.scores.insert(seat(2), Score::new(6));
        snapshot.scores.insert(seat(3), Score::ELIMINATED);

        // when
        let winner = snapshot.winner();

        // then
        assert_eq!(winner, Some(seat(1)));
    }

    #[test]
    fn winner__is_none_when_everyone_is_eliminated() {
        let mut snapshot = GameSnapshot::default();
        for index in PlayerIndex::all() {
            snapshot.scores.insert(index, Score::ELIMINATED);
        }
        assert_eq!(snapshot.winner(), None);
    }
}
