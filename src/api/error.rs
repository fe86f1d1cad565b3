use crate::model::ClientState;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Transport-level failure: connection, TLS, timeout or non-2xx status.
    #[error("network error: {0}")]
    Network(String),

    /// The portal did not accept the login.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Response body did not have the expected shape.
    #[error("unable to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("initialization did not finish within {0:?}")]
    Timeout(Duration),

    #[error("client is not ready (state: {0:?})")]
    NotReady(ClientState),

    /// Time-series store rejected or failed a write or query.
    #[error("time-series store error: {0}")]
    Store(String),
}

impl Error {
    pub(crate) fn parse(what: &'static str, reason: impl Into<String>) -> Self {
        Error::Parse {
            what,
            reason: reason.into(),
        }
    }
}

/// Map transport error to `Error::Network`, keeping the HTTP status if there was one.
pub(crate) fn map_network_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(status) => Error::Network(format!("server responded {}: {}", status, error)),
        None => Error::Network(error.to_string()),
    }
}
