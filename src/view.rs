//! Declarative description of the referee panel.
//!
//! A [`ViewState`] is what the panel should look like for one snapshot. Two of
//! them diff into the [`UiEffect`]s a renderer has to apply.

use crate::snapshot::{
    GameSnapshot,
    GameStatus,
    PlayerIndex,
};
use std::{
    collections::{
        BTreeMap,
        BTreeSet,
    },
    fmt,
};

/// Scoring-event buttons per seat.
pub const EVENT_BUTTONS: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    StartButton,
    StopButton,
    PauseButton,
    GameSelectTrigger,
    RegistryUpdateTrigger,
    TournamentToggle,
    TournamentDropdown,
    TournamentName,
    GameStatus,
    GameTimer,
    PlayerName(PlayerIndex),
    PlayerDropdown(PlayerIndex),
    PlayerAdd(PlayerIndex),
    ScoreButton(PlayerIndex),
    EventButton(PlayerIndex, u8),
}

impl Element {
    /// Every control that belongs to one seat's referee row.
    pub fn player_controls(index: PlayerIndex) -> impl Iterator<Item = Element> {
        std::iter::once(Element::ScoreButton(index))
            .chain((0..EVENT_BUTTONS).map(move |slot| Element::EventButton(index, slot)))
    }
}

/// Element ids as used by the web page the panel was first built for.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::StartButton => write!(f, "game-start-btn"),
            Element::StopButton => write!(f, "game-stop-btn"),
            Element::PauseButton => write!(f, "game-pause-btn"),
            Element::GameSelectTrigger => write!(f, "game-select-trigger"),
            Element::RegistryUpdateTrigger => write!(f, "registry-update-trigger"),
            Element::TournamentToggle => write!(f, "tournament-toggle"),
            Element::TournamentDropdown => write!(f, "tournamentDropdown"),
            Element::TournamentName => write!(f, "tournament-name"),
            Element::GameStatus => write!(f, "game-status"),
            Element::GameTimer => write!(f, "game-timer"),
            Element::PlayerName(p) => write!(f, "pline-{p}"),
            Element::PlayerDropdown(p) => write!(f, "pline-{p}-drop"),
            Element::PlayerAdd(p) => write!(f, "player-add-{p}"),
            Element::ScoreButton(p) => write!(f, "scoreDropdownBtn{p}"),
            Element::EventButton(p, slot) => write!(f, "p{p}Evt{slot}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Highlight {
    Serving,
    Winner,
}

/// What the tournament toggle does when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleMode {
    Activate,
    Deactivate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEffect {
    SetEnabled {
        element: Element,
        enabled: bool,
    },
    SetText {
        element: Element,
        text: String,
    },
    SetHighlight {
        element: Element,
        highlight: Highlight,
        on: bool,
    },
    SetTournamentToggle(ToggleMode),
    /// Pull the player registry from the central server and reload the panel.
    RefreshRegistry,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    enabled: BTreeMap<Element, bool>,
    text: BTreeMap<Element, String>,
    highlights: BTreeSet<(Element, Highlight)>,
    toggle: Option<ToggleMode>,
}

impl ViewState {
    /// The complete panel for `snapshot`. Every element gets a defined state so
    /// that two derived views always cover the same keys.
    pub fn derive(snapshot: &GameSnapshot) -> Self {
        let mut view = ViewState::default();
        let status = snapshot.status;
        let running = status.in_progress();

        view.set_text(Element::GameStatus, status_label(snapshot));
        view.set_text(Element::GameTimer, format_clock(snapshot.remaining_time_secs));

        let can_start = status == GameStatus::Stopped && snapshot.can_start == Some(true);
        view.set_enabled(Element::StartButton, can_start);
        view.set_enabled(Element::StopButton, running);
        view.set_enabled(Element::PauseButton, running);
        view.set_enabled(Element::GameSelectTrigger, !running);
        view.set_enabled(Element::RegistryUpdateTrigger, !running);
        view.set_enabled(Element::TournamentToggle, !running);

        match &snapshot.tournament {
            None => {
                view.toggle = Some(ToggleMode::Activate);
                view.set_text(Element::TournamentToggle, "Activate tournament");
                view.set_text(Element::TournamentName, "");
                view.set_enabled(Element::TournamentDropdown, false);
            }
            Some(tournament) => {
                view.toggle = Some(ToggleMode::Deactivate);
                view.set_text(Element::TournamentToggle, "Deactivate tournament");
                view.set_text(Element::TournamentName, tournament.name.clone());
                view.set_enabled(Element::TournamentDropdown, true);
            }
        }
        let seat_assignment = status == GameStatus::Stopped
            || snapshot
                .tournament
                .as_ref()
                .is_none_or(|t| t.game_id.is_some());

        let winner = (status == GameStatus::Finished)
            .then(|| snapshot.winner())
            .flatten();

        for index in PlayerIndex::all() {
            let active = snapshot.is_active(index);
            let score = snapshot
                .score(index)
                .map(|s| s.to_string())
                .unwrap_or_default();

            view.set_text(Element::PlayerName(index), snapshot.player(index).display_name.clone());
            view.set_text(Element::ScoreButton(index), score);
            view.set_enabled(Element::PlayerAdd(index), seat_assignment);
            view.set_enabled(Element::PlayerDropdown(index), !running);
            view.set_enabled(Element::PlayerName(index), !running || active);
            for control in Element::player_controls(index) {
                view.set_enabled(control, running && active);
            }

            if running && snapshot.serving == Some(index) {
                view.highlight(Element::PlayerName(index), Highlight::Serving);
                view.highlight(Element::PlayerDropdown(index), Highlight::Serving);
            }
            if winner == Some(index) {
                view.highlight(Element::PlayerName(index), Highlight::Winner);
            }
        }
        view
    }

    /// Effects that turn `self` into `next`.
    pub fn diff(&self, next: &ViewState) -> Vec<UiEffect> {
        let mut effects = Vec::new();

        for (element, text) in &next.text {
            if self.text.get(element) != Some(text) {
                effects.push(UiEffect::SetText {
                    element: *element,
                    text: text.clone(),
                });
            }
        }
        for (element, enabled) in &next.enabled {
            if self.enabled.get(element) != Some(enabled) {
                effects.push(UiEffect::SetEnabled {
                    element: *element,
                    enabled: *enabled,
                });
            }
        }
        for (element, highlight) in self.highlights.difference(&next.highlights) {
            effects.push(UiEffect::SetHighlight {
                element: *element,
                highlight: *highlight,
                on: false,
            });
        }
        for (element, highlight) in next.highlights.difference(&self.highlights) {
            effects.push(UiEffect::SetHighlight {
                element: *element,
                highlight: *highlight,
                on: true,
            });
        }
        if let Some(mode) = next.toggle
            && self.toggle != Some(mode)
        {
            effects.push(UiEffect::SetTournamentToggle(mode));
        }
        effects
    }

    pub fn apply(&mut self, effect: &UiEffect) {
        match effect {
            UiEffect::SetEnabled { element, enabled } => {
                self.enabled.insert(*element, *enabled);
            }
            UiEffect::SetText { element, text } => {
                self.text.insert(*element, text.clone());
            }
            UiEffect::SetHighlight {
                element,
                highlight,
                on,
            } => {
                if *on {
                    self.highlights.insert((*element, *highlight));
                } else {
                    self.highlights.remove(&(*element, *highlight));
                }
            }
            UiEffect::SetTournamentToggle(mode) => self.toggle = Some(*mode),
            UiEffect::RefreshRegistry => {}
        }
    }

    /// `None` for an element no effect has touched yet.
    pub fn is_enabled(&self, element: Element) -> Option<bool> {
        self.enabled.get(&element).copied()
    }

    pub fn text(&self, element: Element) -> &str {
        self.text.get(&element).map(String::as_str).unwrap_or("")
    }

    pub fn is_highlighted(&self, element: Element, highlight: Highlight) -> bool {
        self.highlights.contains(&(element, highlight))
    }

    pub fn toggle(&self) -> Option<ToggleMode> {
        self.toggle
    }

    fn set_enabled(&mut self, element: Element, enabled: bool) {
        self.enabled.insert(element, enabled);
    }

    fn set_text(&mut self, element: Element, text: impl Into<String>) {
        self.text.insert(element, text.into());
    }

    fn highlight(&mut self, element: Element, highlight: Highlight) {
        self.highlights.insert((element, highlight));
    }
}

fn status_label(snapshot: &GameSnapshot) -> String {
    let label = match snapshot.status {
        GameStatus::Started => "Game Started",
        GameStatus::Paused => "Game Paused",
        GameStatus::Stopped | GameStatus::Finished => return "Game not in progress".to_string(),
    };
    match snapshot.sequence {
        Some(seq) => format!("{label} [{seq}]"),
        None => label.to_string(),
    }
}

/// `MM:SS`; minutes keep growing past 99 rather than wrapping.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        Player,
        Score,
        Tournament,
    };

    fn seat(i: usize) -> PlayerIndex {
        PlayerIndex::new(i).unwrap()
    }

    fn four_registered(status: GameStatus) -> GameSnapshot {
        let mut snapshot = GameSnapshot {
            status,
            ..Default::default()
        };
        for (i, player) in snapshot.players.iter_mut().enumerate() {
            *player = Player {
                registered: true,
                display_name: format!("P{i}"),
            };
        }
        snapshot
    }

    #[test]
    fn format_clock__pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(754), "12:34");
    }

    #[test]
    fn element__display_matches_page_ids() {
        assert_eq!(Element::ScoreButton(seat(2)).to_string(), "scoreDropdownBtn2");
        assert_eq!(Element::EventButton(seat(1), 7).to_string(), "p1Evt7");
        assert_eq!(Element::PlayerDropdown(seat(0)).to_string(), "pline-0-drop");
    }

    #[test]
    fn derive__started_label_carries_sequence_number() {
        // given
        let mut snapshot = four_registered(GameStatus::Started);
        snapshot.sequence = Some(3);

        // when
        let view = ViewState::derive(&snapshot);

        // then
        assert_eq!(view.text(Element::GameStatus), "Game Started [3]");
        assert_eq!(view.is_enabled(Element::StopButton), Some(true));
        assert_eq!(view.is_enabled(Element::StartButton), Some(false));
    }

    #[test]
    fn derive__start_button_follows_can_start_only_when_stopped() {
        let mut snapshot = four_registered(GameStatus::Stopped);
        snapshot.can_start = Some(true);
        assert_eq!(
            ViewState::derive(&snapshot).is_enabled(Element::StartButton),
            Some(true)
        );

        snapshot.can_start = None;
        assert_eq!(
            ViewState::derive(&snapshot).is_enabled(Element::StartButton),
            Some(false)
        );

        snapshot.status = GameStatus::Finished;
        snapshot.can_start = Some(true);
        assert_eq!(
            ViewState::derive(&snapshot).is_enabled(Element::StartButton),
            Some(false)
        );
    }

    #[test]
    fn derive__tournament_without_game_locks_seat_assignment_while_running() {
        // given
        let mut snapshot = four_registered(GameStatus::Started);
        snapshot.tournament = Some(Tournament {
            name: "Cup".to_string(),
            game_id: None,
        });

        // when
        let running = ViewState::derive(&snapshot);
        snapshot.status = GameStatus::Stopped;
        let stopped = ViewState::derive(&snapshot);

        // then
        assert_eq!(running.is_enabled(Element::PlayerAdd(seat(0))), Some(false));
        assert_eq!(stopped.is_enabled(Element::PlayerAdd(seat(0))), Some(true));
        assert_eq!(running.toggle(), Some(ToggleMode::Deactivate));
        assert_eq!(running.text(Element::TournamentName), "Cup");
        assert_eq!(running.is_enabled(Element::TournamentToggle), Some(false));
    }

    #[test]
    fn derive__finished_game_highlights_winner_not_server() {
        // given
        let mut snapshot = four_registered(GameStatus::Finished);
        snapshot.serving = Some(seat(0));
        snapshot.scores.insert(seat(0), Score::new(4));
        snapshot.scores.insert(seat(3), Score::new(9));

        // when
        let view = ViewState::derive(&snapshot);

        // then
        assert!(view.is_highlighted(Element::PlayerName(seat(3)), Highlight::Winner));
        assert!(!view.is_highlighted(Element::PlayerName(seat(0)), Highlight::Serving));
        assert_eq!(view.text(Element::ScoreButton(seat(3))), "9");
    }

    #[test]
    fn diff__of_equal_views_is_empty() {
        let view = ViewState::derive(&four_registered(GameStatus::Paused));
        assert!(view.diff(&view.clone()).is_empty());
    }

    #[test]
    fn apply__diff_from_empty_reproduces_view() {
        // given
        let mut snapshot = four_registered(GameStatus::Started);
        snapshot.serving = Some(seat(2));
        let target = ViewState::derive(&snapshot);
        let mut board = ViewState::default();

        // when
        for effect in ViewState::default().diff(&target) {
            board.apply(&effect);
        }

        // then
        assert_eq!(board, target);
    }
}
