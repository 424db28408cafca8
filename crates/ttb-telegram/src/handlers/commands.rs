use std::sync::Arc;

use teloxide::prelude::*;

use ttb_core::{
    domain::{ChatId, LangCode},
    formatting::{escape_html, split_message},
    messaging::{port::MessagingPort, types::ChatAction},
    translate::{parse_code_list, LanguageTable, Translator},
};

use crate::router::AppState;

/// Generic user-facing failure notices. Provider detail stays on the console.
const TRANSLATE_FAILED: &str =
    "Error in translation. Make sure the target language code is valid.";
const DETECT_FAILED: &str = "Error detecting the language. Please try again later.";

const TRANSLATE_USAGE: &str = "Usage: /translate &lt;target_lang&gt; &lt;text&gt;";
const DETECT_USAGE: &str = "Usage: /detect &lt;text&gt;";
const MULTI_USAGE: &str = "Usage: /multi &lt;code1,code2,...&gt; &lt;text&gt;";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    let (cmd, args) = parse_command(text);

    if let Some(user) = msg.from() {
        println!("[CMD] /{cmd} from user {}", user.id.0);
    }

    match cmd.as_str() {
        "translate" => {
            reply_deferred(&state, chat_id, || async {
                translate_reply(state.translator.as_ref(), &args).await
            })
            .await;
        }

        "detect" => {
            reply_deferred(&state, chat_id, || async {
                detect_reply(state.translator.as_ref(), &state.languages, &args).await
            })
            .await;
        }

        "languages" => {
            reply_deferred(&state, chat_id, || async {
                languages_reply(&state.languages)
            })
            .await;
        }

        "multi" => {
            reply_deferred(&state, chat_id, || async {
                multi_reply(state.translator.as_ref(), &args).await
            })
            .await;
        }

        "start" | "help" => {
            let _ = state.messenger.send_html(chat_id, &help_reply()).await;
        }

        _ => {
            let notice = format!("Unknown command: /{}", escape_html(&cmd));
            let _ = state.messenger.send_html(chat_id, &notice).await;
        }
    }

    Ok(())
}

/// Defer-first reply: the placeholder goes out before any provider work so
/// the platform response window is always met, then gets edited with the
/// final content. Long content spills into follow-up messages.
async fn reply_deferred<F, Fut>(state: &AppState, chat_id: ChatId, work: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = String>,
{
    let placeholder = match state.messenger.send_html(chat_id, "⏳ Working...").await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to send placeholder: {e}");
            return;
        }
    };
    let _ = state
        .messenger
        .send_chat_action(chat_id, ChatAction::Typing)
        .await;

    let reply = work().await;

    let limit = state
        .cfg
        .telegram_safe_limit
        .min(state.messenger.capabilities().max_message_len);
    let mut chunks = split_message(&reply, limit).into_iter();
    if let Some(first) = chunks.next() {
        if let Err(e) = state.messenger.edit_html(placeholder, &first).await {
            eprintln!("Failed to edit reply: {e}");
        }
    }
    for chunk in chunks {
        if let Err(e) = state.messenger.send_html(chat_id, &chunk).await {
            eprintln!("Failed to send reply chunk: {e}");
        }
    }
}

fn split_target_and_text(args: &str) -> Option<(LangCode, &str)> {
    let (code, text) = args.split_once(char::is_whitespace)?;
    let code = LangCode::new(code);
    let text = text.trim();
    if code.is_empty() || text.is_empty() {
        return None;
    }
    Some((code, text))
}

async fn translate_reply(translator: &dyn Translator, args: &str) -> String {
    let Some((target, text)) = split_target_and_text(args) else {
        return TRANSLATE_USAGE.to_string();
    };

    match translator.translate(text, &target).await {
        Ok(out) => format!("<b>Translated:</b> {}", escape_html(&out)),
        Err(e) => {
            eprintln!("Translation error: {e}");
            TRANSLATE_FAILED.to_string()
        }
    }
}

async fn detect_reply(
    translator: &dyn Translator,
    languages: &LanguageTable,
    args: &str,
) -> String {
    let text = args.trim();
    if text.is_empty() {
        return DETECT_USAGE.to_string();
    }

    match translator.detect(text).await {
        Ok(code) => {
            let name = languages.name_of(&code).unwrap_or("unknown");
            format!(
                "<b>Detected language:</b> {} ({})",
                escape_html(name),
                escape_html(code.as_str())
            )
        }
        Err(e) => {
            eprintln!("Detection error: {e}");
            DETECT_FAILED.to_string()
        }
    }
}

fn languages_reply(languages: &LanguageTable) -> String {
    let mut lines = vec![format!(
        "<b>Supported languages ({}):</b>",
        languages.len()
    )];
    for (code, name) in languages.iter() {
        lines.push(format!(
            "<code>{}</code> {}",
            escape_html(code),
            escape_html(name)
        ));
    }
    lines.join("\n")
}

/// One independent translation per code: a failure on one code never aborts
/// the others, and output lines follow the input order.
async fn multi_lines(
    translator: &dyn Translator,
    codes: &[LangCode],
    text: &str,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(codes.len());
    for code in codes {
        match translator.translate(text, code).await {
            Ok(out) => lines.push(format!(
                "✅ <b>{}:</b> {}",
                escape_html(code.as_str()),
                escape_html(&out)
            )),
            Err(e) => {
                eprintln!("Translation error for {code}: {e}");
                lines.push(format!(
                    "❌ <b>{}:</b> translation failed",
                    escape_html(code.as_str())
                ));
            }
        }
    }
    lines
}

async fn multi_reply(translator: &dyn Translator, args: &str) -> String {
    let Some((codes_raw, text)) = args.split_once(char::is_whitespace) else {
        return MULTI_USAGE.to_string();
    };
    let text = text.trim();
    if text.is_empty() {
        return MULTI_USAGE.to_string();
    }

    // An empty code list is not an error: the reply just has no result lines.
    let codes = parse_code_list(codes_raw);

    let mut lines = vec!["<b>Translations:</b>".to_string()];
    lines.extend(multi_lines(translator, &codes, text).await);
    lines.join("\n")
}

fn help_reply() -> String {
    [
        "<b>Translate Bot</b>",
        "",
        "/translate &lt;target_lang&gt; &lt;text&gt; - translate text",
        "/detect &lt;text&gt; - detect the language of a text",
        "/languages - list supported language codes",
        "/multi &lt;code1,code2,...&gt; &lt;text&gt; - translate into several languages",
        "/help - this message",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use ttb_core::{
        config::Config,
        domain::{MessageId, MessageRef},
        messaging::{
            port::MessagingPort,
            types::{ChatAction, MessagingCapabilities},
        },
        translate::TranslateError,
    };

    struct FakeTranslator;

    #[async_trait::async_trait]
    impl Translator for FakeTranslator {
        async fn translate(
            &self,
            text: &str,
            target: &LangCode,
        ) -> Result<String, TranslateError> {
            match target.as_str() {
                "xx" => Err(TranslateError::UnsupportedTarget("xx".to_string())),
                code => Ok(format!("{code}:{text}")),
            }
        }

        async fn detect(&self, _text: &str) -> Result<LangCode, TranslateError> {
            Ok(LangCode::new("fr"))
        }

        fn supported_languages(&self) -> &'static [(&'static str, &'static str)] {
            &[("en", "English"), ("fr", "French")]
        }
    }

    struct FailingTranslator;

    #[async_trait::async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _text: &str,
            _target: &LangCode,
        ) -> Result<String, TranslateError> {
            Err(TranslateError::Provider("boom".to_string()))
        }

        async fn detect(&self, _text: &str) -> Result<LangCode, TranslateError> {
            Err(TranslateError::Provider("boom".to_string()))
        }

        fn supported_languages(&self) -> &'static [(&'static str, &'static str)] {
            &[]
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        events: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl MessagingPort for RecordingMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_html: true,
                supports_edit: true,
                supports_chat_actions: true,
                max_message_len: 4096,
            }
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> ttb_core::Result<MessageRef> {
            let mut events = self.events.lock().unwrap();
            events.push(("send".to_string(), html.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(events.len() as i32),
            })
        }

        async fn edit_html(&self, _msg: MessageRef, html: &str) -> ttb_core::Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(("edit".to_string(), html.to_string()));
            Ok(())
        }

        async fn send_chat_action(
            &self,
            _chat_id: ChatId,
            _action: ChatAction,
        ) -> ttb_core::Result<()> {
            Ok(())
        }

        async fn set_chat_title(&self, _chat_id: ChatId, _title: &str) -> ttb_core::Result<()> {
            Ok(())
        }

        async fn set_chat_description(
            &self,
            _chat_id: ChatId,
            _description: &str,
        ) -> ttb_core::Result<()> {
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            status_chat_id: None,
            presence_interval: std::time::Duration::from_secs(40),
            presence_statuses: vec!["ready".to_string()],
            update_base_url: "https://example.com".to_string(),
            update_stage_path: std::path::PathBuf::from("ttb.update"),
            http_timeout: std::time::Duration::from_secs(10),
            telegram_safe_limit: 4000,
        }
    }

    #[test]
    fn parses_command_and_args() {
        assert_eq!(
            parse_command("/translate fr hello world"),
            ("translate".to_string(), "fr hello world".to_string())
        );
        assert_eq!(
            parse_command("/languages@translate_bot"),
            ("languages".to_string(), String::new())
        );
        assert_eq!(
            parse_command("  /DETECT   bonjour  "),
            ("detect".to_string(), "bonjour".to_string())
        );
    }

    #[tokio::test]
    async fn translate_wraps_provider_output() {
        let reply = translate_reply(&FakeTranslator, "fr hello world").await;
        assert_eq!(reply, "<b>Translated:</b> fr:hello world");
    }

    #[tokio::test]
    async fn translate_failure_is_generic() {
        let reply = translate_reply(&FakeTranslator, "xx hello").await;
        assert_eq!(reply, TRANSLATE_FAILED);

        let reply = translate_reply(&FailingTranslator, "fr hello").await;
        assert_eq!(reply, TRANSLATE_FAILED);
    }

    #[tokio::test]
    async fn translate_without_text_shows_usage() {
        assert_eq!(translate_reply(&FakeTranslator, "fr").await, TRANSLATE_USAGE);
        assert_eq!(translate_reply(&FakeTranslator, "").await, TRANSLATE_USAGE);
    }

    #[tokio::test]
    async fn translate_escapes_provider_html() {
        let reply = translate_reply(&FakeTranslator, "fr <b>hi</b>").await;
        assert_eq!(reply, "<b>Translated:</b> fr:&lt;b&gt;hi&lt;/b&gt;");
    }

    #[tokio::test]
    async fn detect_renders_code_and_name() {
        let languages = LanguageTable::new(&[("fr", "French")]);
        let reply = detect_reply(&FakeTranslator, &languages, "bonjour").await;
        assert_eq!(reply, "<b>Detected language:</b> French (fr)");
    }

    #[tokio::test]
    async fn detect_failure_is_generic() {
        let languages = LanguageTable::new(&[]);
        let reply = detect_reply(&FailingTranslator, &languages, "bonjour").await;
        assert_eq!(reply, DETECT_FAILED);
    }

    #[tokio::test]
    async fn multi_keeps_input_order_and_isolates_failures() {
        let codes = parse_code_list("en,xx,fr");
        let lines = multi_lines(&FakeTranslator, &codes, "hello").await;

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "✅ <b>en:</b> en:hello");
        assert_eq!(lines[1], "❌ <b>xx:</b> translation failed");
        assert_eq!(lines[2], "✅ <b>fr:</b> fr:hello");
    }

    #[tokio::test]
    async fn multi_with_empty_code_list_has_no_result_lines() {
        let codes = parse_code_list("");
        let lines = multi_lines(&FakeTranslator, &codes, "hello").await;
        assert!(lines.is_empty());

        let reply = multi_reply(&FakeTranslator, ", hello").await;
        assert_eq!(reply, "<b>Translations:</b>");
    }

    #[test]
    fn languages_listing_has_one_line_per_code() {
        let table = LanguageTable::new(&[("en", "English"), ("fr", "French")]);
        let reply = languages_reply(&table);
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("(2)"));
        assert_eq!(lines[1], "<code>en</code> English");
        assert_eq!(lines[2], "<code>fr</code> French");
    }

    #[tokio::test]
    async fn deferred_reply_sends_placeholder_then_edits() {
        let messenger = Arc::new(RecordingMessenger::default());
        let state = AppState {
            cfg: Arc::new(test_config()),
            messenger: messenger.clone(),
            translator: Arc::new(FakeTranslator),
            languages: Arc::new(LanguageTable::new(&[("en", "English")])),
        };

        reply_deferred(&state, ChatId(1), || async { "done".to_string() }).await;

        let events = messenger.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "send");
        assert!(events[0].1.contains("Working"));
        assert_eq!(events[1], ("edit".to_string(), "done".to_string()));
    }

    #[tokio::test]
    async fn deferred_reply_spills_long_content_into_extra_messages() {
        let messenger = Arc::new(RecordingMessenger::default());
        let mut cfg = test_config();
        cfg.telegram_safe_limit = 200;
        let state = AppState {
            cfg: Arc::new(cfg),
            messenger: messenger.clone(),
            translator: Arc::new(FakeTranslator),
            languages: Arc::new(LanguageTable::new(&[("en", "English")])),
        };

        let long = (0..40)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        reply_deferred(&state, ChatId(1), || async move { long }).await;

        let events = messenger.events.lock().unwrap().clone();
        assert_eq!(events[0].0, "send"); // placeholder
        assert_eq!(events[1].0, "edit"); // first chunk
        assert!(events.len() > 2); // spill
        assert!(events[2..].iter().all(|(kind, _)| kind == "send"));
    }
}
