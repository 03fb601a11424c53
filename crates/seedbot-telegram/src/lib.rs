//! Telegram remote control for a Transmission download box.
//!
//! One authorized chat can list, pause, resume and add torrents, check the
//! host's load, memory and disk usage, and gets a message whenever a
//! download finishes.
//!
//! # Environment Variables
//!
//! Required:
//! - `TG_BOT_TOKEN`: Bot token from @BotFather
//! - `AUTHORIZED_CHAT_ID`: The chat allowed to control the bot
//!
//! Optional:
//! - `TRANSMISSION_HOST`, `TRANSMISSION_PORT`: Daemon address (default localhost:9091)
//! - `NOTIFY_INTERVAL_SECS`: Finished-download poll period (default 30)
//!
//! # Commands
//!
//! - `/start` - Greeting
//! - `/help` - Show available commands
//! - `/ping` - Liveness check
//! - `/status` - Load, memory, uptime and disk usage
//! - `/torrents` - List up to ten torrents
//! - `/pause <id>`, `/resume <id>` - Stop or start a torrent
//! - `/add <magnet>` - Add a torrent from a magnet link

pub mod bot;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod messenger;
pub mod notifier;

pub use bot::TorrentBot;
pub use commands::{parse_commands, Command};
pub use error::{Result, TelegramError};
pub use handlers::CommandHandler;
pub use messenger::Messenger;
pub use notifier::{FinishedNotifier, PollOutcome};
