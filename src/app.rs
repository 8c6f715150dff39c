use crate::{
    board_client::BoardClient,
    config::BoardConfig,
    poller::{
        Poller,
        PollerEvent,
        PollerHandle,
    },
    ui::{
        self,
        Board,
        UserEvent,
    },
    view::UiEffect,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use tokio::sync::mpsc;
use tracing::{
    info,
    warn,
};

pub async fn run_app(config: BoardConfig, headless: bool) -> Result<()> {
    config.validate().wrap_err("invalid board configuration")?;
    let client = BoardClient::new(&config).wrap_err("failed to build scoreboard client")?;
    info!(board = %client, headless, "starting referee panel");

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let poller = Poller::new(client, config.poll_interval, event_tx).spawn();
    poller.fetch_now();

    let res = if headless {
        run_headless(event_rx).await
    } else {
        run_tui(&poller, event_rx).await
    };
    poller.shutdown().await?;
    res
}

async fn run_headless(mut events: mpsc::UnboundedReceiver<PollerEvent>) -> Result<()> {
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("poller event channel closed");
                    break;
                };
                log_event(&event);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; exiting");
                break;
            }
        }
    }
    Ok(())
}

fn log_event(event: &PollerEvent) {
    match event {
        PollerEvent::Reconciled { snapshot, effects } => {
            info!(status = %snapshot.status, count = effects.len(), "view changed");
            for effect in effects {
                match effect {
                    UiEffect::SetEnabled { element, enabled } => {
                        info!(%element, enabled, "set enabled")
                    }
                    UiEffect::SetText { element, text } => info!(%element, %text, "set text"),
                    UiEffect::SetHighlight {
                        element,
                        highlight,
                        on,
                    } => info!(%element, ?highlight, on, "set highlight"),
                    UiEffect::SetTournamentToggle(mode) => info!(?mode, "tournament toggle"),
                    UiEffect::RefreshRegistry => info!("registry refresh"),
                }
            }
        }
        PollerEvent::Refused { command, reason } => info!(%command, %reason, "refused"),
        PollerEvent::Sent(command) => info!(%command, "sent"),
    }
}

async fn run_tui(
    poller: &PollerHandle,
    events: mpsc::UnboundedReceiver<PollerEvent>,
) -> Result<()> {
    let mut terminal = ui::terminal_enter().wrap_err("failed to enter terminal UI")?;
    let res = tui_loop(&mut terminal, poller, events).await;
    ui::terminal_exit()?;
    res
}

async fn tui_loop(
    terminal: &mut ui::Tui,
    poller: &PollerHandle,
    mut events: mpsc::UnboundedReceiver<PollerEvent>,
) -> Result<()> {
    let mut board = Board::default();
    let mut input = ui::input_event_stream();
    ui::draw(terminal, &board)?;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(PollerEvent::Reconciled { snapshot, effects }) => {
                        board.apply(snapshot, &effects);
                    }
                    Some(PollerEvent::Refused { command, reason }) => {
                        board.set_message(format!("Not sent ({command}): {reason}"));
                    }
                    Some(PollerEvent::Sent(command)) => {
                        board.set_message(format!("Sent: {command}"));
                    }
                    None => {
                        warn!("poller event channel closed");
                        break;
                    }
                }
            }
            key = ui::next_key(&mut input) => {
                let Some(key) = key? else {
                    break;
                };
                let Some(event) = ui::interpret_key(&board, key) else {
                    continue;
                };
                if event == UserEvent::Quit {
                    break;
                }
                if let Some(command) = board.handle(event) {
                    poller.send(command);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        ui::draw(terminal, &board).wrap_err("draw failed")?;
    }
    Ok(())
}
