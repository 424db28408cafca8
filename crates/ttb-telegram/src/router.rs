use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use tokio_util::sync::CancellationToken;

use ttb_core::{
    config::Config,
    domain::ChatId,
    messaging::port::MessagingPort,
    presence::PresenceRotator,
    translate::{LanguageTable, Translator},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
    pub translator: Arc<dyn Translator>,
    pub languages: Arc<LanguageTable>,
}

/// Commands registered with the platform command tree on startup.
fn command_tree() -> Vec<BotCommand> {
    vec![
        BotCommand::new("translate", "Translate text to a target language"),
        BotCommand::new("detect", "Detect the language of a text"),
        BotCommand::new("languages", "List supported language codes"),
        BotCommand::new("multi", "Translate into several languages at once"),
        BotCommand::new("help", "Show usage"),
    ]
}

pub async fn run_polling(
    cfg: Arc<Config>,
    token: String,
    translator: Arc<dyn Translator>,
    languages: Arc<LanguageTable>,
) -> anyhow::Result<()> {
    let bot = Bot::new(token);

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("translate bot started: @{}", me.username());
    }
    println!("Supported languages: {}", languages.len());

    if let Err(e) = bot.set_my_commands(command_tree()).await {
        eprintln!("Failed to sync command tree: {e}");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    // The presence rotator runs for the process lifetime once the session is
    // up; it owns its rotation index.
    let rotator = PresenceRotator::new(
        messenger.clone(),
        cfg.status_chat_id.map(ChatId),
        cfg.presence_statuses.clone(),
        cfg.presence_interval,
    );
    let presence_cancel = CancellationToken::new();
    let presence_task = tokio::spawn(rotator.run(presence_cancel.clone()));

    let state = Arc::new(AppState {
        cfg,
        messenger,
        translator,
        languages,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    presence_cancel.cancel();
    let _ = presence_task.await;

    Ok(())
}
