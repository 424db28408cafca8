//! Core domain + application logic for the Translate Telegram Bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the
//! translation provider live behind ports (traits) implemented in adapter
//! crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod presence;
pub mod translate;
pub mod update;

pub use errors::{Error, Result};
