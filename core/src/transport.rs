//! The network side of a request.
//!
//! # Design
//! `Transport` is the single seam between the facade and the network. It
//! takes a fully built `HttpRequest` and blocks until a terminal
//! `Completion` is known. Asynchronous calls run the same blocking transport
//! on a worker thread, so implementations never need an async runtime.
//!
//! Before spawning that worker, `Client` asks the transport to `check` the
//! request, so a URL that can never be sent is reported to the caller of
//! `aget`/`apost` directly instead of through a continuation.

use std::borrow::Cow;
use std::time::Duration;

use crate::error::WebreqError;
use crate::http::{Completion, HttpMethod, HttpRequest};

pub trait Transport: Send + Sync + 'static {
    /// Execute `request`, giving up after `timeout`. A zero timeout means no
    /// limit.
    ///
    /// Any status code, and any failure to reach a server, is a
    /// `Completion`. `Err` is reserved for requests the transport cannot
    /// even attempt, such as an unparseable URL.
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<Completion, WebreqError>;

    /// Reject requests `execute` could never attempt, without touching the
    /// network.
    fn check(&self, _request: &HttpRequest) -> Result<(), WebreqError> {
        Ok(())
    }
}

/// `Transport` backed by a fresh `ureq` agent per request.
///
/// Status codes are returned as data rather than errors, and the timeout
/// covers the whole exchange from connect to the end of the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<Completion, WebreqError> {
        let prepared = prepare_url(&request.url)?;
        let url: &str = &prepared;
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global((!timeout.is_zero()).then_some(timeout))
            .build()
            .new_agent();

        let sent = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => agent.get(url).call(),
            (HttpMethod::Post, Some(body)) => agent.post(url).send(body.as_bytes()),
            (HttpMethod::Post, None) => agent.post(url).send_empty(),
        };

        let mut response = match sent {
            Ok(response) => response,
            Err(e) => return classify(e),
        };

        let status = response.status().as_u16();
        match response.body_mut().read_to_string() {
            Ok(body) => Ok(Completion::Response { status, body }),
            Err(e) => classify(e),
        }
    }

    fn check(&self, request: &HttpRequest) -> Result<(), WebreqError> {
        prepare_url(&request.url).map(|_| ())
    }
}

/// Escape what a URI cannot contain and require an absolute `http(s)`-style
/// URL with a scheme and an authority.
fn prepare_url(url: &str) -> Result<Cow<'_, str>, WebreqError> {
    let escaped = escape_uri(url);
    let uri: ureq::http::Uri = escaped
        .parse()
        .map_err(|e| WebreqError::InvalidRequest(format!("{url}: {e}")))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(WebreqError::InvalidRequest(format!(
            "{url} is missing scheme"
        )));
    }
    Ok(escaped)
}

/// Percent-encode every byte that is not legal anywhere in a URI.
///
/// Reserved delimiters (`?`, `&`, `=`, `/`, ...) and `%` pass through, so a
/// raw query keeps its structure and already-encoded sequences stay as they
/// are.
fn escape_uri(url: &str) -> Cow<'_, str> {
    fn allowed(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=%".contains(&b)
    }

    if url.bytes().all(allowed) {
        return Cow::Borrowed(url);
    }

    let mut out = String::with_capacity(url.len() + 8);
    for b in url.bytes() {
        if allowed(b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    Cow::Owned(out)
}

/// Split ureq errors into "never attempted" and "attempted but no answer".
fn classify(err: ureq::Error) -> Result<Completion, WebreqError> {
    match err {
        ureq::Error::BadUri(msg) => Err(WebreqError::InvalidRequest(msg)),
        ureq::Error::Http(e) => Err(WebreqError::InvalidRequest(e.to_string())),
        other => {
            tracing::warn!(error = %other, "request did not complete");
            Ok(Completion::NetworkFailure {
                reason: other.to_string(),
            })
        }
    }
}
