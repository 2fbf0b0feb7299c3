//! Error and outcome types shared by the data-service client and controllers.

use std::fmt;

use thiserror::Error;

/// Data-service client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),

    /// The body was not the expected JSON, or it carried an `error` field.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Kind of request issued to the data service. Each kind has its own
/// sequence of tickets so superseded responses can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    TreatyList,
    TreatyDetail,
    Search,
    Boundaries,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TreatyList => "treaty list",
            Self::TreatyDetail => "treaty detail",
            Self::Search => "search",
            Self::Boundaries => "boundaries",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last failed operation, kept in the app state so a renderer can surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub kind: RequestKind,
    pub message: String,
}

/// Result of a controller operation that went through the data service.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The response was current and has been committed to the app state.
    Applied(T),
    /// A newer request of the same kind superseded this one; nothing changed.
    Stale,
    /// The request failed; the app state is unchanged apart from `last_error`.
    Failed(ClientError),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale | Self::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Applied(value) => Outcome::Applied(f(value)),
            Self::Stale => Outcome::Stale,
            Self::Failed(e) => Outcome::Failed(e),
        }
    }

    /// Collapse into a `Result`, treating a stale response as success with `None`.
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        match self {
            Self::Applied(value) => Ok(Some(value)),
            Self::Stale => Ok(None),
            Self::Failed(e) => Err(e),
        }
    }
}
