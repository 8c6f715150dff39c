//! Terminal rendering adapter.
//!
//! [`Board`] is the "page": it applies [`UiEffect`]s to its element store and
//! turns key presses into [`Command`]s. Drawing reads only from that store.

use crate::{
    command::Command,
    snapshot::{
        GameSnapshot,
        PlayerIndex,
        Score,
    },
    view::{
        EVENT_BUTTONS,
        Element,
        Highlight,
        ToggleMode,
        UiEffect,
        ViewState,
    },
};
use color_eyre::eyre::Result;
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::{
    Stdout,
    stdout,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    SelectSeat(PlayerIndex),
    StartGame,
    StopGame,
    SetTurn,
    ScoreUp,
    ScoreDown,
    ScoringEvent(u8),
    Unregister,
    UpdateRegistry,
    ToggleTournament,
    OpenPrompt(PromptKind),
    PromptInput(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    RegisterPlayer,
    Tournament,
    TournamentGame,
}

impl PromptKind {
    fn title(self) -> &'static str {
        match self {
            PromptKind::RegisterPlayer => "Player id",
            PromptKind::Tournament => "Tournament id",
            PromptKind::TournamentGame => "Tournament game id",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    Prompt {
        kind: PromptKind,
        buffer: String,
    },
}

#[derive(Debug)]
pub struct Board {
    view: ViewState,
    snapshot: Option<GameSnapshot>,
    selected: PlayerIndex,
    mode: Mode,
    message: String,
    registry_refreshes: u32,
}

impl Default for Board {
    fn default() -> Self {
        Board {
            view: ViewState::default(),
            snapshot: None,
            selected: PlayerIndex::default(),
            mode: Mode::Normal,
            message: String::from("Waiting for scoreboard..."),
            registry_refreshes: 0,
        }
    }
}

impl Board {
    pub fn apply(&mut self, snapshot: GameSnapshot, effects: &[UiEffect]) {
        for effect in effects {
            if matches!(effect, UiEffect::RefreshRegistry) {
                self.registry_refreshes += 1;
                self.message = String::from("Game stopped; refreshing registry");
            }
            self.view.apply(effect);
        }
        self.snapshot = Some(snapshot);
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selected(&self) -> PlayerIndex {
        self.selected
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn in_prompt(&self) -> bool {
        matches!(self.mode, Mode::Prompt { .. })
    }

    /// Updates local state and returns the command the event asks for, if any.
    ///
    /// Controls the view has disabled produce nothing, just like a disabled button.
    pub fn handle(&mut self, event: UserEvent) -> Option<Command> {
        let player = self.selected;
        match event {
            UserEvent::Quit => None,
            UserEvent::SelectSeat(index) => {
                self.selected = index;
                None
            }
            UserEvent::StartGame => self
                .enabled(Element::StartButton)
                .then_some(Command::StartGame),
            UserEvent::StopGame => self
                .enabled(Element::StopButton)
                .then_some(Command::StopGame),
            UserEvent::SetTurn => self
                .enabled(Element::ScoreButton(player))
                .then_some(Command::SetTurn { player }),
            UserEvent::ScoreUp | UserEvent::ScoreDown => {
                if !self.enabled(Element::ScoreButton(player)) {
                    return None;
                }
                let current = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.score(player))
                    .map(Score::value)
                    .unwrap_or_default();
                let next = if event == UserEvent::ScoreUp {
                    current.saturating_add(1)
                } else {
                    current.saturating_sub(1)
                };
                Some(Command::SetScore {
                    player,
                    score: Score::new(next),
                })
            }
            UserEvent::ScoringEvent(slot) => self
                .enabled(Element::EventButton(player, slot))
                .then(|| Command::ScoringEvent {
                    player,
                    event: slot.to_string(),
                }),
            UserEvent::Unregister => self
                .enabled(Element::PlayerDropdown(player))
                .then_some(Command::UnregisterPlayer { player }),
            UserEvent::UpdateRegistry => self
                .enabled(Element::RegistryUpdateTrigger)
                .then_some(Command::UpdateRegistry),
            UserEvent::ToggleTournament => {
                if !self.enabled(Element::TournamentToggle) {
                    return None;
                }
                match self.view.toggle() {
                    Some(ToggleMode::Deactivate) => Some(Command::DeactivateTournament),
                    Some(ToggleMode::Activate) => {
                        self.mode = Mode::Prompt {
                            kind: PromptKind::Tournament,
                            buffer: String::new(),
                        };
                        None
                    }
                    None => None,
                }
            }
            UserEvent::OpenPrompt(kind) => {
                let allowed = match kind {
                    PromptKind::RegisterPlayer => self.enabled(Element::PlayerAdd(player)),
                    PromptKind::Tournament => self.enabled(Element::TournamentToggle),
                    PromptKind::TournamentGame => self.enabled(Element::GameSelectTrigger),
                };
                if allowed {
                    self.mode = Mode::Prompt {
                        kind,
                        buffer: String::new(),
                    };
                }
                None
            }
            UserEvent::PromptInput(c) => {
                if let Mode::Prompt { buffer, .. } = &mut self.mode {
                    buffer.push(c);
                }
                None
            }
            UserEvent::PromptBackspace => {
                if let Mode::Prompt { buffer, .. } = &mut self.mode {
                    buffer.pop();
                }
                None
            }
            UserEvent::PromptCancel => {
                self.mode = Mode::Normal;
                None
            }
            UserEvent::PromptSubmit => {
                let Mode::Prompt { kind, buffer } = std::mem::take(&mut self.mode) else {
                    return None;
                };
                let id = buffer.trim().to_string();
                if id.is_empty() {
                    return None;
                }
                Some(match kind {
                    PromptKind::RegisterPlayer => Command::RegisterPlayer {
                        player,
                        player_id: id,
                    },
                    PromptKind::Tournament => Command::ActivateTournament { tournament_id: id },
                    PromptKind::TournamentGame => Command::ActivateGame { game_id: id },
                })
            }
        }
    }

    fn enabled(&self, element: Element) -> bool {
        self.view.is_enabled(element).unwrap_or(false)
    }
}

/// Key mapping. While a prompt is open every printable key goes to it.
///
/// Raw mode swallows SIGINT, so Ctrl-C is handled here as a key.
pub fn interpret_key(board: &Board, key: KeyEvent) -> Option<UserEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UserEvent::Quit);
    }
    if board.in_prompt() {
        return match key.code {
            KeyCode::Esc => Some(UserEvent::PromptCancel),
            KeyCode::Enter => Some(UserEvent::PromptSubmit),
            KeyCode::Backspace => Some(UserEvent::PromptBackspace),
            KeyCode::Char(c) => Some(UserEvent::PromptInput(c)),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c.to_digit(10)? as usize - 1;
            PlayerIndex::new(index).ok().map(UserEvent::SelectSeat)
        }
        KeyCode::Char('s') => Some(UserEvent::StartGame),
        KeyCode::Char('x') => Some(UserEvent::StopGame),
        KeyCode::Char('t') => Some(UserEvent::SetTurn),
        KeyCode::Char('+') | KeyCode::Up => Some(UserEvent::ScoreUp),
        KeyCode::Char('-') | KeyCode::Down => Some(UserEvent::ScoreDown),
        KeyCode::F(n @ 1..=8) => Some(UserEvent::ScoringEvent(n - 1)),
        KeyCode::Char('p') => Some(UserEvent::OpenPrompt(PromptKind::RegisterPlayer)),
        KeyCode::Char('u') => Some(UserEvent::Unregister),
        KeyCode::Char('r') => Some(UserEvent::UpdateRegistry),
        KeyCode::Char('T') => Some(UserEvent::ToggleTournament),
        KeyCode::Char('g') => Some(UserEvent::OpenPrompt(PromptKind::TournamentGame)),
        _ => None,
    }
}

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn terminal_enter() -> Result<Tui> {
    enable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn input_event_stream() -> EventStream {
    EventStream::new()
}

/// Next key press; `None` once the terminal input stream ends.
pub async fn next_key(events: &mut EventStream) -> Result<Option<KeyEvent>> {
    while let Some(event) = events.next().await {
        if let Event::Key(key) = event? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

pub fn draw(terminal: &mut Tui, board: &Board) -> Result<()> {
    terminal.draw(|f| ui(f, board))?;
    Ok(())
}

fn ui(f: &mut Frame, board: &Board) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, rows[0], board.view());
    draw_players(f, rows[1], board);
    draw_controls(f, rows[2], board.view());
    draw_help(f, rows[3]);
    draw_footer(f, rows[4], board);
    if let Mode::Prompt { kind, buffer } = &board.mode {
        draw_prompt(f, *kind, buffer);
    }
}

fn draw_header(f: &mut Frame, area: Rect, view: &ViewState) {
    let tournament = match view.text(Element::TournamentName) {
        "" => String::new(),
        name => format!(" | Tournament: {name}"),
    };
    let line = Line::from(vec![
        Span::styled(
            view.text(Element::GameStatus).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}", view.text(Element::GameTimer))),
        Span::raw(tournament),
    ]);
    let block = Block::default().borders(Borders::ALL).title("Chainball referee");
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_players(f: &mut Frame, area: Rect, board: &Board) {
    let view = board.view();
    let rows: Vec<Row> = PlayerIndex::all()
        .map(|p| {
            let name = Element::PlayerName(p);
            let mut style = Style::default();
            if view.is_enabled(name) == Some(false) {
                style = style.fg(Color::DarkGray);
            }
            if view.is_highlighted(name, Highlight::Serving) {
                style = style.bg(Color::Red).fg(Color::White);
            }
            if view.is_highlighted(name, Highlight::Winner) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
            let marker = if p == board.selected() { ">" } else { " " };
            let events: String = (0..EVENT_BUTTONS)
                .map(|slot| {
                    if view.is_enabled(Element::EventButton(p, slot)) == Some(true) {
                        '●'
                    } else {
                        '·'
                    }
                })
                .collect();
            Row::new(vec![
                Cell::from(format!("{marker}{}", p.get() + 1)),
                Cell::from(view.text(name).to_string()),
                Cell::from(view.text(Element::ScoreButton(p)).to_string()),
                Cell::from(events),
            ])
            .style(style)
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Seat", "Player", "Score", "Events"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("Players"));
    f.render_widget(table, area);
}

fn draw_controls(f: &mut Frame, area: Rect, view: &ViewState) {
    let button = |label: &str, element: Element| {
        let style = if view.is_enabled(element) == Some(true) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!("[{label}] "), style)
    };
    let toggle = match view.text(Element::TournamentToggle) {
        "" => "Tournament",
        label => label,
    };
    let line = Line::from(vec![
        button("Start", Element::StartButton),
        button("Stop", Element::StopButton),
        button("Pause", Element::PauseButton),
        button("Select game", Element::GameSelectTrigger),
        button("Update registry", Element::RegistryUpdateTrigger),
        button(toggle, Element::TournamentToggle),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Controls")),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = "1-4 seat  s start  x stop  t turn  +/- score  F1-F8 event  \
                p register  u unregister  r registry  T tournament  g game  q quit";
    f.render_widget(
        Paragraph::new(help)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn draw_footer(f: &mut Frame, area: Rect, board: &Board) {
    let title = format!("Status (registry refreshes: {})", board.registry_refreshes);
    f.render_widget(
        Paragraph::new(board.message.as_str())
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn draw_prompt(f: &mut Frame, kind: PromptKind, buffer: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(format!("{buffer}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Enter to send, Esc to cancel)", kind.title())),
        ),
        area,
    );
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(vertical[1])[1]
}
