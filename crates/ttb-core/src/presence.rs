//! Presence rotator.
//!
//! Cycles a fixed list of status lines on a fixed interval, alternating the
//! display surface by tick parity. Purely cosmetic: failures are logged and
//! the loop keeps going until the process shuts down.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Display surface used for a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceMode {
    /// Even ticks: the status chat title.
    Title,
    /// Odd ticks: the status chat description.
    Description,
}

/// Status line + surface for tick `k`: the text wraps modulo the list
/// length, the surface alternates by parity.
pub fn status_at(statuses: &[String], tick: usize) -> (&str, PresenceMode) {
    let text = statuses[tick % statuses.len()].as_str();
    let mode = if tick % 2 == 0 {
        PresenceMode::Title
    } else {
        PresenceMode::Description
    };
    (text, mode)
}

pub struct PresenceRotator {
    messenger: Arc<dyn MessagingPort>,
    status_chat: Option<ChatId>,
    statuses: Vec<String>,
    period: Duration,
}

impl PresenceRotator {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        status_chat: Option<ChatId>,
        statuses: Vec<String>,
        period: Duration,
    ) -> Self {
        Self {
            messenger,
            status_chat,
            statuses,
            period,
        }
    }

    /// Runs until `cancel` fires. The rotation index lives here; nothing
    /// else reads or writes it.
    pub async fn run(self, cancel: CancellationToken) {
        if self.statuses.is_empty() {
            eprintln!("[PRESENCE] no statuses configured, rotator idle");
            return;
        }
        if self.status_chat.is_none() {
            println!("[PRESENCE] no status chat configured, rotating console-only");
        }

        let mut tick = interval(self.period);
        let mut index = 0usize;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    self.apply(index).await;
                    index = index.wrapping_add(1);
                }
            }
        }
    }

    async fn apply(&self, tick: usize) {
        let (text, mode) = status_at(&self.statuses, tick);

        let Some(chat) = self.status_chat else {
            println!("[PRESENCE] {mode:?}: {text}");
            return;
        };

        let res = match mode {
            PresenceMode::Title => self.messenger.set_chat_title(chat, text).await,
            PresenceMode::Description => self.messenger.set_chat_description(chat, text).await,
        };

        if let Err(e) = res {
            eprintln!("[PRESENCE] update failed ({mode:?}): {e}");
        }
    }
}
