//! One-shot startup update check.
//!
//! Fetches a plaintext manifest, looks up this program's published version,
//! and on a mismatch stages the full payload for an external wrapper to
//! apply. Every failure here is soft: the bot starts regardless. The running
//! process never overwrites its own code.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::{
    config::{Config, PROGRAM_ID},
    errors::Error,
    Result,
};

/// Version compiled into the binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of the startup check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Staged { version: String, path: PathBuf },
    NotListed,
    CheckFailed,
}

pub struct UpdateChecker {
    http: reqwest::Client,
    manifest_url: String,
    payload_url: String,
    stage_path: PathBuf,
}

impl UpdateChecker {
    pub fn new(cfg: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .expect("reqwest client build");
        Self {
            http,
            manifest_url: cfg.manifest_url(),
            payload_url: cfg.payload_url(),
            stage_path: cfg.update_stage_path.clone(),
        }
    }

    /// Runs the check, printing operator diagnostics as it goes.
    pub async fn check(&self) -> UpdateStatus {
        let manifest = match self.fetch_text(&self.manifest_url).await {
            Ok(m) => m,
            Err(e) => {
                eprintln!("[UPDATE] check failed: {e}");
                return UpdateStatus::CheckFailed;
            }
        };

        let Some(published) = find_manifest_version(&manifest, PROGRAM_ID) else {
            println!("[UPDATE] {PROGRAM_ID} not listed in the manifest");
            return UpdateStatus::NotListed;
        };

        if published == CURRENT_VERSION {
            println!("[UPDATE] up to date ({CURRENT_VERSION})");
            return UpdateStatus::UpToDate;
        }

        println!(
            "[UPDATE] version {published} is available (running {CURRENT_VERSION}), staging..."
        );

        match self.stage_payload().await {
            Ok(path) => {
                println!(
                    "[UPDATE] staged {} - apply it and restart to update",
                    path.display()
                );
                UpdateStatus::Staged {
                    version: published,
                    path,
                }
            }
            Err(e) => {
                eprintln!("[UPDATE] staging failed: {e}");
                UpdateStatus::CheckFailed
            }
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::External(format!("update request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!("update status {}", resp.status())));
        }

        resp.text()
            .await
            .map_err(|e| Error::External(format!("update body error: {e}")))
    }

    async fn stage_payload(&self) -> Result<PathBuf> {
        let resp = self
            .http
            .get(&self.payload_url)
            .send()
            .await
            .map_err(|e| Error::External(format!("payload request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::External(format!(
                "payload status {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::External(format!("payload body error: {e}")))?;

        stage_bytes(&self.stage_path, &bytes).await
    }
}

/// Finds the published version for `program_id` in a newline-separated
/// manifest of `<id>==<version>` lines. Lookup is by prefix match.
pub fn find_manifest_version(manifest: &str, program_id: &str) -> Option<String> {
    for line in manifest.lines() {
        if !line.starts_with(program_id) {
            continue;
        }
        if let Some((_, version)) = line.split_once("==") {
            return Some(version.trim().to_string());
        }
    }
    None
}

/// Writes the payload plus a `<path>.sha256` digest file for the wrapper
/// that applies the update.
async fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::write(path, bytes).await?;

    let digest = Sha256::digest(bytes);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tokio::fs::write(digest_path(path), format!("{digest:x}  {name}\n")).await?;

    Ok(path.to_path_buf())
}

fn digest_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".sha256");
    PathBuf::from(os)
}
