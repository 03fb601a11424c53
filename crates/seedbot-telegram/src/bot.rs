//! Main Telegram bot implementation.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use seedbot_core::{AuthGuard, BotConfig, HostProbe, SystemProbe};
use seedbot_transmission::{DaemonClient, TransmissionClient};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::error::{Result, TelegramError};
use crate::handlers::CommandHandler;
use crate::messenger::Messenger;
use crate::notifier::FinishedNotifier;

/// Telegram front end for the download box.
pub struct TorrentBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Command dispatcher shared by all update handlers.
    handler: Arc<CommandHandler>,
    daemon: Arc<dyn DaemonClient>,
    guard: AuthGuard,
    notify_interval: Duration,
}

impl TorrentBot {
    /// Build the bot and its collaborators from configuration.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let bot = Bot::new(&config.bot_token);

        let mut client = TransmissionClient::new(config.daemon.rpc_url()?);
        if let Some(username) = &config.daemon.username {
            client = client.with_credentials(username.clone(), config.daemon.password.clone());
        }
        info!(url = %client.url(), "Using Transmission RPC endpoint");

        let daemon: Arc<dyn DaemonClient> = Arc::new(client);
        let host: Arc<dyn HostProbe> = Arc::new(SystemProbe::new(config.status_command.clone()));
        let messenger: Arc<dyn Messenger> = Arc::new(bot.clone());
        let guard = AuthGuard::new(config.authorized_chat_id);

        let handler = Arc::new(CommandHandler::new(
            guard,
            Arc::clone(&daemon),
            host,
            messenger,
        ));

        Ok(Self {
            bot,
            handler,
            daemon,
            guard,
            notify_interval: config.notify_interval,
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Run the notifier and the long-polling dispatcher until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "Failed to register command menu");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier = FinishedNotifier::new(
            Arc::clone(&self.daemon),
            Arc::new(self.bot.clone()),
            self.guard.authorized_chat_id(),
        );
        let notifier_task = tokio::spawn(notifier.run(self.notify_interval, shutdown_rx));

        let handler = Arc::clone(&self.handler);
        let tree = Update::filter_message().endpoint(move |msg: Message| {
            let handler = Arc::clone(&handler);
            async move {
                if let Some(text) = msg.text() {
                    handler.handle_text(msg.chat.id.0, text).await;
                }
                respond(())
            }
        });

        info!(chat_id = self.guard.authorized_chat_id(), "Bot is running");

        // No distribution key: updates from the same chat are handled
        // concurrently, so a slow /status never holds up /ping.
        Dispatcher::builder(self.bot.clone(), tree)
            .distribution_function(|_| None::<Infallible>)
            .default_handler(|upd| async move {
                debug!("Ignoring update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Stopping Telegram bot...");
        let _ = shutdown_tx.send(true);
        if let Err(e) = notifier_task.await {
            warn!(error = %e, "Notifier task ended abnormally");
        }

        Ok(())
    }
}
