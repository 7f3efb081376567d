//! Completion plumbing for non-blocking calls.
//!
//! # Design
//! `Continuations` owns the caller's success and failure closures and is
//! consumed by `complete`, so a request can resolve only once and only one
//! closure ever runs. Both closures default to no-ops.
//!
//! Every terminal state resolves the request: a `200` runs the success
//! closure with the body, and anything else (an error status, a non-200
//! success code, a network failure, a request the transport rejected) runs
//! the failure closure. The failure closure takes no arguments; callers who
//! need the status code use the blocking calls.

use std::fmt;
use std::thread::JoinHandle;

use crate::error::WebreqError;
use crate::http::Completion;
use crate::outcome::{normalize, Outcome};

type SuccessFn = Box<dyn FnOnce(String) + Send + 'static>;
type FailureFn = Box<dyn FnOnce() + Send + 'static>;

/// Success and failure continuations for one asynchronous request.
#[derive(Default)]
pub struct Continuations {
    on_success: Option<SuccessFn>,
    on_failure: Option<FailureFn>,
}

impl Continuations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnOnce(String) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_failure(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Resolve the request, running at most one continuation.
    pub(crate) fn complete(self, completion: Result<Completion, WebreqError>) {
        let outcome = match completion {
            Ok(completion) => normalize(completion),
            Err(e) => {
                tracing::error!(error = %e, "asynchronous request could not be sent");
                Outcome::Failure(0)
            }
        };

        match outcome {
            Outcome::Success(body) => {
                if let Some(f) = self.on_success {
                    f(body);
                }
            }
            Outcome::Failure(status) => {
                tracing::debug!(status, "asynchronous request failed");
                if let Some(f) = self.on_failure {
                    f();
                }
            }
        }
    }
}

impl fmt::Debug for Continuations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuations")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Handle to an in-flight asynchronous request.
///
/// Dropping it does not cancel anything; the request still runs to
/// completion and its continuation still fires.
#[derive(Debug)]
pub struct PendingRequest {
    handle: JoinHandle<()>,
}

impl PendingRequest {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Whether the request has resolved and its continuation has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the request has resolved and its continuation has
    /// returned. `Err` carries the payload of a panicking continuation.
    pub fn wait(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}
