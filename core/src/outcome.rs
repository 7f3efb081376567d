//! The normalized `{result, error}` shape returned to callers.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::http::Completion;

/// Result of one request. Exactly one of `result()` and `error()` is `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered `200`; holds the response body.
    Success(String),
    /// Anything else; holds the status code, `0` if no server answered.
    Failure(u16),
}

impl Outcome {
    pub fn result(&self) -> Option<&str> {
        match self {
            Outcome::Success(body) => Some(body.as_str()),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<u16> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(status) => Some(*status),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Map a raw completion onto an `Outcome`.
///
/// Only status `200` counts as success. Other 2xx codes are failures carrying
/// their status, and network failures carry `0`.
pub fn normalize(completion: Completion) -> Outcome {
    match completion {
        Completion::Response { status: 200, body } => Outcome::Success(body),
        other => Outcome::Failure(other.status()),
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        state.serialize_field("result", &self.result())?;
        state.serialize_field("error", &self.error())?;
        state.end()
    }
}
