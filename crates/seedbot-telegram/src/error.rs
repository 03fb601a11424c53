//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] seedbot_core::CoreError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// An outbound message could not be delivered.
    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<teloxide::RequestError> for TelegramError {
    fn from(e: teloxide::RequestError) -> Self {
        TelegramError::SendFailed(e.to_string())
    }
}
