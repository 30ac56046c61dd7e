//! Error Handling tools

use std::{
    borrow::Cow,
    fmt,
    error::Error as StdError,
};

pub use kquantum_di::error::Error as DiError;

/// Application error
#[derive(Debug)]
pub enum Error {
    /// The configuration could not be loaded or is invalid
    Config(Cow<'static, str>),
    /// The object graph could not be built or a service could not be resolved
    Di(DiError),
}

impl Error {
    /// Creates an [`Error::Config`] from a message
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration Error: {msg}"),
            Error::Di(err) => err.fmt(f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Config(_) => None,
            Error::Di(err) => Some(err),
        }
    }
}

impl From<DiError> for Error {
    #[inline]
    fn from(err: DiError) -> Self {
        Self::Di(err)
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string().into())
    }
}
