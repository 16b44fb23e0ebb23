//! ClipMill application layer.
//!
//! This crate provides:
//! - The explicit, lifetime-scoped [`AppState`] container
//! - Account and video services built on top of it
//! - The `cmill` CLI binary

pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::{AccountService, VideoService};
pub use state::{Account, AppState, Session};
