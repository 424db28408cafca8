//! Telegram update handlers.
//!
//! Only text messages matter to this bot: slash commands go to the command
//! handlers, everything else gets a short hint.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

mod commands;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }

    let _ = bot
        .send_message(
            msg.chat.id,
            "Use /translate, /detect, /languages or /multi. /help shows usage.",
        )
        .await;

    Ok(())
}
