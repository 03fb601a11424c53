//! Single-identity authorization.

/// Decides whether an inbound message comes from the one chat allowed to
/// control the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthGuard {
    authorized_chat_id: i64,
}

impl AuthGuard {
    /// Create a guard for the given chat.
    pub fn new(authorized_chat_id: i64) -> Self {
        Self { authorized_chat_id }
    }

    /// True iff `sender` is the authorized chat.
    pub fn is_authorized(&self, sender: i64) -> bool {
        sender == self.authorized_chat_id
    }

    /// The chat that receives notifications.
    pub fn authorized_chat_id(&self) -> i64 {
        self.authorized_chat_id
    }
}
