/// Core error type.
///
/// Adapter crates map their specific errors into this type so the bot core
/// can handle failures consistently (user-facing message vs console detail).
/// Translation failures stay [`crate::translate::TranslateError`] values at
/// the port boundary and are never promoted here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
