//! Seedbot Core - shared pieces used by the Telegram front end.
//!
//! - **auth**: the single-identity authorization guard
//! - **config**: environment-driven configuration
//! - **host**: load, memory and disk reporting for `/status`

pub mod auth;
pub mod config;
pub mod error;
pub mod host;

pub use auth::AuthGuard;
pub use config::BotConfig;
pub use error::{CoreError, Result};
pub use host::{format_status_report, HostProbe, HostStatus, SystemProbe};
