//! Error types for the request facade.
//!
//! # Design
//! HTTP statuses and network failures are not errors here: they are reported
//! as an `Outcome`. `WebreqError` only covers conditions where no request
//! could be issued at all, plus malformed host commands.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebreqError {
    /// The transport refused to build the request, e.g. `host + path` is not
    /// a usable URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The background worker for an asynchronous call could not be started.
    #[error("failed to spawn request worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Arguments supplied as JSON were not an object of scalar values.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command {0} requires a value")]
    MissingCommandValue(&'static str),
}
