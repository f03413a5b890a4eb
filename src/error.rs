//! Error types
//!
//! Lobby errors are user-correctable and surface as notices. Race errors mean
//! the lobby hand-off was skipped or corrupted and the race refuses to start.

use thiserror::Error;

use crate::roster::AgentId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Game {0} not found.")]
    UnknownGame(u32),

    #[error("Select a game first.")]
    NoGameSelected,

    #[error("Skater #{0} does not exist.")]
    UnknownAgent(AgentId),

    #[error("Game is already finalized; cannot bet.")]
    BettingClosed,

    #[error("Already finalized.")]
    AlreadyFinalized,

    #[error("Need at least {need} bets to finalize!")]
    NotEnoughBets { have: usize, need: usize },

    #[error("Game {0} must be finalized before the race can start.")]
    NotFinalized(u32),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaceError {
    #[error("race roster is empty; lobby hand-off missing")]
    EmptyRoster,

    #[error("agent {0} in roster is not a known skater")]
    UnknownAgent(AgentId),
}

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("{name} range must satisfy 0 <= min < max, got [{min}, {max})")]
    Range {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("lap count must be at least 1")]
    NoLaps,
}
