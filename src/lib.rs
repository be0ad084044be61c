//! Squad Arena: tournament registration, squads with an approval workflow,
//! per-squad chat and an admin-maintained match config / leaderboard.

pub mod accounts;
pub mod admin;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod http;
pub mod match_config;
pub mod metrics;
pub mod registry;
pub mod state;

pub use error::{ArenaError, Result};
pub use state::AppState;
