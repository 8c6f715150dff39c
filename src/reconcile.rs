use crate::{
    snapshot::{
        GameSnapshot,
        GameStatus,
    },
    view::{
        UiEffect,
        ViewState,
    },
};

/// Effects needed to move the panel from `previous` to `current`.
///
/// With no previous snapshot every element is emitted. Entering the stopped
/// state from any other state adds one [`UiEffect::RefreshRegistry`].
pub fn reconcile(previous: Option<&GameSnapshot>, current: &GameSnapshot) -> Vec<UiEffect> {
    let before = previous.map(ViewState::derive).unwrap_or_default();
    let after = ViewState::derive(current);
    let mut effects = before.diff(&after);
    if entered_stopped(previous, current) {
        effects.push(UiEffect::RefreshRegistry);
    }
    effects
}

fn entered_stopped(previous: Option<&GameSnapshot>, current: &GameSnapshot) -> bool {
    current.status == GameStatus::Stopped
        && previous.is_some_and(|prev| prev.status != GameStatus::Stopped)
}

/// Owns the last snapshot seen so that each tick only has to hand over the new one.
#[derive(Debug, Default)]
pub struct Reconciler {
    last: Option<GameSnapshot>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&GameSnapshot> {
        self.last.as_ref()
    }

    pub fn observe(&mut self, snapshot: GameSnapshot) -> Vec<UiEffect> {
        let effects = reconcile(self.last.as_ref(), &snapshot);
        if let Some(prev) = &self.last
            && prev.status != snapshot.status
        {
            tracing::info!(from = %prev.status, to = %snapshot.status, "game status changed");
        }
        self.last = Some(snapshot);
        effects
    }
}
