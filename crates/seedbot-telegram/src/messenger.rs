//! Outbound message seam.

use async_trait::async_trait;
use teloxide::prelude::*;

use crate::error::Result;

/// Delivers plain-text messages to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
