use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{ChatAction, MessagingCapabilities},
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the command handlers and the
/// presence rotator only see this trait, so tests can substitute recording
/// fakes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;

    /// Presence display surfaces: the status chat's title (primary mode) and
    /// description (secondary mode).
    async fn set_chat_title(&self, chat_id: ChatId, title: &str) -> Result<()>;
    async fn set_chat_description(&self, chat_id: ChatId, description: &str) -> Result<()>;
}
