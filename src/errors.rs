//! Crate-wide error taxonomy.
//!
//! Each layer raises its own error kind; `Error` unifies them so call sites
//! can use `?` without matching on the source first. The outermost layers
//! (engine, CLI) use `anyhow::Result` since they only need to log and move
//! on, not branch on error kind.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{venue} gateway error: {message}")]
    Gateway { venue: String, message: String },

    #[error("{venue} parser error: {message}")]
    Parser { venue: String, message: String },

    #[error("{venue} wrapper error: {message}")]
    Wrapper { venue: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("orderbook manager for {venue}/{symbol} is not initialized")]
    NotInitialized { venue: String, symbol: String },
}

impl Error {
    pub fn gateway(venue: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Gateway {
            venue: venue.into(),
            message: message.into(),
        }
    }

    pub fn parser(venue: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parser {
            venue: venue.into(),
            message: message.into(),
        }
    }

    pub fn wrapper(venue: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Wrapper {
            venue: venue.into(),
            message: message.into(),
        }
    }

    pub fn not_initialized(venue: impl Into<String>, symbol: impl Into<String>) -> Self {
        Error::NotInitialized {
            venue: venue.into(),
            symbol: symbol.into(),
        }
    }

    /// True for the "not yet initialized" case, which callers treat as a
    /// silent skip rather than a loggable failure.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Error::NotInitialized { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
