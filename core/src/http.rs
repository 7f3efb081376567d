//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and their raw completions are plain data. `Client` builds an
//! `HttpRequest`, hands it to a `Transport`, and normalizes the returned
//! `Completion` into an `Outcome`. Keeping the raw completion separate from
//! the outcome lets tests drive normalization without a network.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is the configured host, the endpoint path and, for GET, the query
/// suffix, concatenated without further processing. `body` is `None` for GET
/// and the JSON document for POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
}

/// Terminal state of one transport operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A server answered with a status line and a body.
    Response { status: u16, body: String },
    /// No status was ever received: DNS failure, refused connection, timeout.
    NetworkFailure { reason: String },
}

impl Completion {
    /// The status code as the host sees it; `0` when no server answered.
    pub fn status(&self) -> u16 {
        match self {
            Completion::Response { status, .. } => *status,
            Completion::NetworkFailure { .. } => 0,
        }
    }
}
