//! Server binary error types.

use std::fmt;

/// Errors surfaced while wiring up and running the listeners.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration could not be loaded (fatal at startup, §7
    /// `ConfigError`).
    Config(String),
    /// A listener failed to bind or accept.
    Transport(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<ambassador_config::ConfigError> for ServerError {
    fn from(err: ambassador_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
