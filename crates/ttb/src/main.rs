use std::sync::Arc;

use clap::Parser;

use ttb_core::{
    config::Config,
    translate::{LanguageTable, Translator},
    update::UpdateChecker,
};
use ttb_google::GoogleTranslator;

/// Placeholder shipped in the hosting panel's startup template; running with
/// it means the operator never configured a real token.
const TOKEN_PLACEHOLDER: &str = "PUTYOURTOKENHERE";

/// Run a translation bot on Telegram.
#[derive(Parser, Debug)]
#[command(name = "ttb", version, about = "Run a translation bot on Telegram")]
struct Args {
    /// Telegram bot token.
    token: String,
}

#[tokio::main]
async fn main() -> Result<(), ttb_core::Error> {
    let args = Args::parse();

    if token_is_placeholder(&args.token) {
        eprintln!("You need to set the bot token in the startup tab.");
        std::process::exit(1);
    }

    ttb_core::logging::init("ttb")?;

    let cfg = Arc::new(Config::load()?);

    // One-shot update check; outcomes are diagnostics, never fatal.
    let _ = UpdateChecker::new(&cfg).check().await;

    let translator = Arc::new(GoogleTranslator::new(cfg.http_timeout));
    let languages = Arc::new(LanguageTable::new(translator.supported_languages()));

    ttb_telegram::router::run_polling(cfg, args.token, translator, languages)
        .await
        .map_err(|e| ttb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

fn token_is_placeholder(token: &str) -> bool {
    token == TOKEN_PLACEHOLDER
}
