use crate::{
    board_client::BoardClient,
    command::Command,
    error::{
        Refusal,
        Result,
    },
    reconcile::Reconciler,
    snapshot::{
        GameSnapshot,
        GameStatus,
    },
    view::UiEffect,
};
use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{
        self,
        MissedTickBehavior,
    },
};
use tracing::{
    debug,
    info,
    warn,
};

pub enum PollerCommand {
    Send(Command),
    FetchNow,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollerEvent {
    /// A poll changed the view. The snapshot is the one the effects lead to.
    Reconciled {
        snapshot: GameSnapshot,
        effects: Vec<UiEffect>,
    },
    Refused {
        command: Command,
        reason: Refusal,
    },
    Sent(Command),
}

/// Drives the fetch/reconcile cycle and forwards control commands.
///
/// Ticks and commands are handled one at a time from a single loop, so a slow
/// poll delays the next one instead of overlapping it.
pub struct Poller {
    client: BoardClient,
    reconciler: Reconciler,
    interval: Duration,
    events: mpsc::UnboundedSender<PollerEvent>,
}

impl Poller {
    pub fn new(
        client: BoardClient,
        interval: Duration,
        events: mpsc::UnboundedSender<PollerEvent>,
    ) -> Self {
        Self {
            client,
            reconciler: Reconciler::new(),
            interval,
            events,
        }
    }

    pub fn spawn(self) -> PollerHandle {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        PollerHandle { commands, task }
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<PollerCommand>) -> Result<()> {
        info!(board = %self.client, interval_ms = self.interval.as_millis() as u64, "poller started");
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else {
                        break;
                    };
                    match cmd {
                        PollerCommand::FetchNow => self.tick().await,
                        PollerCommand::Send(command) => self.dispatch(command).await,
                        PollerCommand::Shutdown => break,
                    }
                }
            }
            if self.events.is_closed() {
                warn!("event receiver dropped; stopping poller");
                break;
            }
        }
        info!("poller stopped");
        Ok(())
    }

    /// One fetch-then-reconcile step. Any failure leaves the view untouched.
    ///
    /// A failed can-start query keeps the answer from the previous stopped poll.
    pub async fn tick(&mut self) {
        let mut snapshot = match self.client.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "status poll failed; view left as is");
                return;
            }
        };
        if snapshot.status == GameStatus::Stopped && snapshot.can_start.is_none() {
            snapshot.can_start = self
                .reconciler
                .last()
                .filter(|last| last.status == GameStatus::Stopped)
                .and_then(|last| last.can_start);
        }
        let effects = self.reconciler.observe(snapshot.clone());
        if effects.is_empty() {
            return;
        }
        debug!(count = effects.len(), "reconciled snapshot");
        let refresh = effects.contains(&UiEffect::RefreshRegistry);
        self.emit(PollerEvent::Reconciled { snapshot, effects });
        if refresh {
            self.send_unchecked(Command::UpdateRegistry).await;
        }
    }

    pub async fn dispatch(&mut self, command: Command) {
        if let Err(reason) = command.check(self.reconciler.last()) {
            info!(%command, %reason, "command refused locally");
            self.emit(PollerEvent::Refused { command, reason });
            return;
        }
        if self.send_unchecked(command).await {
            self.tick().await;
        }
    }

    pub fn last_snapshot(&self) -> Option<&GameSnapshot> {
        self.reconciler.last()
    }

    async fn send_unchecked(&mut self, command: Command) -> bool {
        match self.client.send(&command).await {
            Ok(()) => {
                info!(%command, "command sent");
                self.emit(PollerEvent::Sent(command));
                true
            }
            Err(err) => {
                warn!(%command, %err, "command failed");
                false
            }
        }
    }

    fn emit(&self, event: PollerEvent) {
        if self.events.send(event).is_err() {
            debug!("poller event dropped; receiver closed");
        }
    }
}

pub struct PollerHandle {
    commands: mpsc::UnboundedSender<PollerCommand>,
    task: JoinHandle<Result<()>>,
}

impl PollerHandle {
    pub fn send(&self, command: Command) {
        let _ = self.commands.send(PollerCommand::Send(command));
    }

    pub fn fetch_now(&self) {
        let _ = self.commands.send(PollerCommand::FetchNow);
    }

    pub async fn shutdown(self) -> Result<()> {
        let _ = self.commands.send(PollerCommand::Shutdown);
        match self.task.await {
            Ok(res) => res,
            Err(err) => {
                warn!(%err, "poller task did not finish cleanly");
                Ok(())
            }
        }
    }
}
