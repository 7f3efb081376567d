//! Minimal HTTP request facade for host applications.
//!
//! # Overview
//! Issues GET and POST requests against a configurable host, either blocking
//! (`get`, `post`) or non-blocking (`aget`, `apost`), and reports every
//! result in one normalized shape: a response body on `200`, a status code
//! otherwise.
//!
//! # Design
//! - `Client` builds plain-data `HttpRequest` values and hands them to a
//!   `Transport`; the network side is swappable and tests script it.
//! - GET arguments become an insertion-ordered query string, POST arguments
//!   a JSON object body.
//! - Non-blocking calls run the same transport on a worker thread and
//!   resolve `Continuations`, exactly one of which fires per request.
//! - Host and timeout live in a shared `Config`; the host can be changed at
//!   runtime through `Command::ChangeHost`.

pub mod args;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod http;
pub mod outcome;
pub mod pending;
pub mod transport;

pub use args::{build_get_query, build_post_body, Args, QueryEncoding};
pub use client::Client;
pub use command::Command;
pub use config::Config;
pub use error::WebreqError;
pub use http::{Completion, HttpMethod, HttpRequest};
pub use outcome::{normalize, Outcome};
pub use pending::{Continuations, PendingRequest};
pub use transport::{Transport, UreqTransport};
