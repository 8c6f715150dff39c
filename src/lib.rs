pub mod app;
pub mod board_client;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod reconcile;
pub mod snapshot;
pub mod ui;
pub mod view;

pub use error::{
    BoardError,
    Refusal,
    Result,
};
pub use reconcile::{
    Reconciler,
    reconcile,
};
