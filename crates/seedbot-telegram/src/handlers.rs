//! Command handlers for the Telegram bot.

use std::sync::Arc;

use futures::future::join_all;
use seedbot_core::{format_status_report, AuthGuard, HostProbe};
use seedbot_transmission::{DaemonClient, TorrentId, TorrentRecord, TorrentStatus};
use tracing::{debug, error, info, warn};

use crate::commands::{parse_commands, Command};
use crate::messenger::Messenger;

/// Maximum number of torrents listed by `/torrents`.
pub const MAX_LISTED_TORRENTS: usize = 10;

const MAGNET_PREFIX: &str = "magnet:";

const UNAUTHORIZED_TEXT: &str = "⛔ Unauthorized access";
const WELCOME_TEXT: &str = "🤖 Hi! I'm your download box bot.\nUse /help to see the commands.";
const PONG_TEXT: &str = "🏓 Pong!";
const HELP_TEXT: &str = "📋 Available commands:\n\
/torrents - List active, downloading or paused torrents\n\
/pause <id> - Pause torrent <id>\n\
/resume <id> - Resume torrent <id>\n\
/add <magnet url> - Add a torrent from <magnet url>\n\
/status - Basic system status\n\
/ping - Check that I'm alive";
const STATUS_ERROR_TEXT: &str = "❌ Error getting system status";
const DAEMON_ERROR_TEXT: &str = "❌ Error connecting to Transmission";
const NO_TORRENTS_TEXT: &str = "📭 No active torrents";
const INVALID_MAGNET_TEXT: &str = "❌ Please send a valid magnet link";
const ADD_ERROR_TEXT: &str = "❌ Error adding the torrent";

/// Dispatches recognized commands from inbound messages.
///
/// Stateless apart from its collaborators; every invocation is independent.
pub struct CommandHandler {
    guard: AuthGuard,
    daemon: Arc<dyn DaemonClient>,
    host: Arc<dyn HostProbe>,
    messenger: Arc<dyn Messenger>,
}

impl CommandHandler {
    pub fn new(
        guard: AuthGuard,
        daemon: Arc<dyn DaemonClient>,
        host: Arc<dyn HostProbe>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            guard,
            daemon,
            host,
            messenger,
        }
    }

    /// Handle one inbound text message from `sender`.
    ///
    /// Every command whose pattern matches is executed. They run
    /// concurrently, so a slow command never holds up the others.
    pub async fn handle_text(&self, sender: i64, text: &str) {
        let commands = parse_commands(text);
        if commands.is_empty() {
            debug!(chat_id = sender, "No command in message");
            return;
        }
        join_all(commands.into_iter().map(|command| self.handle(sender, command))).await;
    }

    /// Execute a single command on behalf of `sender`.
    pub async fn handle(&self, sender: i64, command: Command) {
        info!(chat_id = sender, command = command.name(), "Command received");

        if !self.guard.is_authorized(sender) {
            warn!(chat_id = sender, command = command.name(), "Unauthorized chat");
            // Only /start tells a foreign sender anything.
            if command == Command::Start {
                self.reply(sender, UNAUTHORIZED_TEXT).await;
            }
            return;
        }

        match command {
            Command::Start => self.reply(sender, WELCOME_TEXT).await,
            Command::Help => self.reply(sender, HELP_TEXT).await,
            Command::Ping => self.reply(sender, PONG_TEXT).await,
            Command::Status => self.handle_status(sender).await,
            Command::Torrents => self.handle_torrents(sender).await,
            Command::Pause(arg) => self.handle_pause(sender, &arg).await,
            Command::Resume(arg) => self.handle_resume(sender, &arg).await,
            Command::Add(arg) => self.handle_add(sender, &arg).await,
        }
    }

    async fn handle_status(&self, sender: i64) {
        match self.host.collect().await {
            Ok(status) => self.reply(sender, &format_status_report(&status)).await,
            Err(e) => {
                error!(error = %e, "Failed to collect host status");
                self.reply(sender, STATUS_ERROR_TEXT).await;
            }
        }
    }

    async fn handle_torrents(&self, sender: i64) {
        match self.daemon.list().await {
            Ok(torrents) => {
                debug!(count = torrents.len(), "Torrents fetched for listing");
                let text = format_torrent_list(&torrents)
                    .unwrap_or_else(|| NO_TORRENTS_TEXT.to_string());
                self.reply(sender, &text).await;
            }
            Err(e) => {
                error!(error = %e, "Error connecting to Transmission");
                self.reply(sender, DAEMON_ERROR_TEXT).await;
            }
        }
    }

    async fn handle_pause(&self, sender: i64, arg: &str) {
        let Some(id) = self.parse_id(sender, arg).await else {
            return;
        };
        match self.daemon.stop(id).await {
            Ok(()) => self.reply(sender, &format!("⏸ Torrent {} paused", id)).await,
            Err(e) => {
                error!(torrent_id = id, error = %e, "Failed to pause torrent");
                self.reply(sender, &format!("❌ Error pausing torrent {}", id)).await;
            }
        }
    }

    async fn handle_resume(&self, sender: i64, arg: &str) {
        let Some(id) = self.parse_id(sender, arg).await else {
            return;
        };
        match self.daemon.start(id).await {
            Ok(()) => self.reply(sender, &format!("▶ Torrent {} resumed", id)).await,
            Err(e) => {
                error!(torrent_id = id, error = %e, "Failed to resume torrent");
                self.reply(sender, &format!("❌ Error resuming torrent {}", id)).await;
            }
        }
    }

    async fn handle_add(&self, sender: i64, arg: &str) {
        let uri = arg.trim();
        if !uri.starts_with(MAGNET_PREFIX) {
            self.reply(sender, INVALID_MAGNET_TEXT).await;
            return;
        }

        match self.daemon.add_by_uri(uri).await {
            Ok(added) => {
                info!(torrent_id = added.id, name = %added.name, "Torrent added");
                self.reply(
                    sender,
                    &format!("✅ Torrent added:\n{}\nID: {}", added.name, added.id),
                )
                .await;
            }
            Err(e) => {
                error!(error = %e, "Failed to add torrent");
                self.reply(sender, ADD_ERROR_TEXT).await;
            }
        }
    }

    /// Parse a digits-only argument, telling the user when it does not fit an id.
    async fn parse_id(&self, sender: i64, arg: &str) -> Option<TorrentId> {
        match arg.parse::<TorrentId>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(arg, error = %e, "Torrent id out of range");
                self.reply(sender, &format!("❌ Invalid torrent id: {}", arg)).await;
                None
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text).await {
            warn!(chat_id, error = %e, "Failed to send reply");
        }
    }
}

/// Label shown next to each torrent in `/torrents`.
pub fn status_label(status: TorrentStatus) -> &'static str {
    match status {
        TorrentStatus::Downloading => "⬇ downloading",
        TorrentStatus::Stopped => "⏸ paused",
        _ => "📦 active",
    }
}

/// Completion as a percentage with one decimal, ties rounded up.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}", (fraction * 1000.0).round() / 10.0)
}

/// Render the `/torrents` reply, or `None` when there is nothing to list.
pub fn format_torrent_list(torrents: &[TorrentRecord]) -> Option<String> {
    if torrents.is_empty() {
        return None;
    }
    let entries: Vec<String> = torrents
        .iter()
        .take(MAX_LISTED_TORRENTS)
        .map(|t| {
            format!(
                "🧲 {}. {}\n{} – {}%",
                t.id,
                t.name,
                status_label(t.status),
                format_percent(t.percent_done)
            )
        })
        .collect();
    Some(entries.join("\n\n"))
}
