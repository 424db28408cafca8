use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Program identifier used for manifest lookups and the update payload name.
pub const PROGRAM_ID: &str = "translate-telegram-bot";

const DEFAULT_UPDATE_BASE_URL: &str =
    "https://raw.githubusercontent.com/premade-bots/releases/refs/heads/main";

/// Status lines cycled by the presence rotator when none are configured.
const DEFAULT_STATUSES: &[&str] = &[
    "Translating messages",
    "/translate <lang> <text>",
    "Detecting languages",
    "/languages for the full list",
];

/// Typed configuration, loaded from the environment (plus `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    /// Chat whose title/description the presence rotator updates.
    pub status_chat_id: Option<i64>,
    pub presence_interval: Duration,
    pub presence_statuses: Vec<String>,

    /// Base URL for the update manifest and payload.
    pub update_base_url: String,
    /// Where a newer payload is staged for the external wrapper to apply.
    pub update_stage_path: PathBuf,

    pub http_timeout: Duration,
    pub telegram_safe_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let status_chat_id = env_i64("TTB_STATUS_CHAT_ID");

        let presence_interval =
            Duration::from_secs(env_u64("TTB_PRESENCE_INTERVAL_SECS").unwrap_or(40));
        if presence_interval.is_zero() {
            return Err(Error::Config(
                "TTB_PRESENCE_INTERVAL_SECS must be > 0".to_string(),
            ));
        }

        let presence_statuses = parse_csv(env_str("TTB_PRESENCE_STATUSES")).unwrap_or_else(|| {
            DEFAULT_STATUSES.iter().map(|s| (*s).to_string()).collect()
        });

        let update_base_url = env_str("TTB_UPDATE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPDATE_BASE_URL.to_string());
        let update_stage_path = env_path("TTB_UPDATE_STAGE_PATH")
            .unwrap_or_else(|| PathBuf::from(format!("{PROGRAM_ID}.update")));

        let http_timeout = Duration::from_secs(env_u64("TTB_HTTP_TIMEOUT_SECS").unwrap_or(10));
        if http_timeout.is_zero() {
            return Err(Error::Config(
                "TTB_HTTP_TIMEOUT_SECS must be > 0".to_string(),
            ));
        }

        let telegram_safe_limit = env_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000);
        if telegram_safe_limit < 200 {
            return Err(Error::Config(
                "TELEGRAM_SAFE_LIMIT must be at least 200".to_string(),
            ));
        }

        Ok(Self {
            status_chat_id,
            presence_interval,
            presence_statuses,
            update_base_url,
            update_stage_path,
            http_timeout,
            telegram_safe_limit,
        })
    }

    /// Newline-separated `<program-id>==<version>` listing.
    pub fn manifest_url(&self) -> String {
        format!("{}/versions.txt", self.update_base_url.trim_end_matches('/'))
    }

    /// Full update payload for this program.
    pub fn payload_url(&self) -> String {
        format!("{}/{PROGRAM_ID}", self.update_base_url.trim_end_matches('/'))
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn parse_csv(v: Option<String>) -> Option<Vec<String>> {
    let v = v?;
    let out = v
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
