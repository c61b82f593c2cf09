use reqwest::StatusCode;
use thiserror::Error;

/// A weather or icon request that did not produce a complete record.
///
/// Never fatal: the frontend renders the message on its status line and
/// leaves submission available for a retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// Startup configuration problems. Recovered locally: a missing or empty
/// key file leads to the in-window key prompt, never a crash.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("{path} does not contain an API key")]
    EmptyKey { path: String },
}

/// A failed history write at shutdown. Logged and ignored; the process
/// still exits.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}
