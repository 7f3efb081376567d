//! The four-call request facade: `get`, `post`, `aget`, `apost`.
//!
//! # Design
//! Each call is split into a `build_*` step that reads the current host and
//! produces an `HttpRequest`, and an execution step that hands the request to
//! the `Transport`. Blocking calls normalize the completion into an
//! `Outcome`; non-blocking calls move the already-built request to a worker
//! thread and resolve caller-supplied `Continuations` there. The host is
//! therefore read exactly once per call, at invocation time, and a later
//! `ChangeHost` never redirects a request already in flight.
//!
//! The configured timeout applies to all four calls.

use std::sync::Arc;
use std::thread;

use crate::args::{build_get_query, build_post_body, Args};
use crate::command::Command;
use crate::config::Config;
use crate::error::WebreqError;
use crate::http::{HttpMethod, HttpRequest};
use crate::outcome::{normalize, Outcome};
use crate::pending::{Continuations, PendingRequest};
use crate::transport::{Transport, UreqTransport};

/// HTTP client bound to one host and one timeout.
///
/// Cloning is cheap and clones share configuration, so a host change made
/// through any clone is seen by all of them.
#[derive(Debug)]
pub struct Client<T: Transport = UreqTransport> {
    config: Config,
    transport: Arc<T>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Client<UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> String {
        self.config.host()
    }

    pub fn set_host(&self, host: impl Into<String>) {
        self.config.set_host(host);
    }

    pub fn timeout(&self) -> std::time::Duration {
        self.config.timeout()
    }

    /// Apply a parsed host command.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::ChangeHost(host) => self.set_host(host),
        }
    }

    /// Parse and apply a command line such as `ChangeHost http://10.0.0.2/`.
    pub fn dispatch_line(&self, line: &str) -> Result<(), WebreqError> {
        self.dispatch(Command::parse(line)?);
        Ok(())
    }

    pub fn build_get(&self, path: &str, args: Option<&Args>) -> HttpRequest {
        let query = build_get_query(args, self.config.query_encoding());
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{path}{query}", self.config.host()),
            body: None,
        }
    }

    pub fn build_post(&self, path: &str, args: Option<&Args>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{path}", self.config.host()),
            body: Some(build_post_body(args)),
        }
    }

    /// Blocking GET. HTTP and network failures are returned as
    /// `Outcome::Failure`; `Err` means the request could not be issued.
    pub fn get(&self, path: &str, args: Option<&Args>) -> Result<Outcome, WebreqError> {
        self.execute(self.build_get(path, args))
    }

    /// Blocking POST with the arguments as a JSON body.
    pub fn post(&self, path: &str, args: Option<&Args>) -> Result<Outcome, WebreqError> {
        self.execute(self.build_post(path, args))
    }

    /// Non-blocking GET. Returns once the request has been handed to a
    /// worker thread.
    pub fn aget(
        &self,
        path: &str,
        args: Option<&Args>,
        continuations: Continuations,
    ) -> Result<PendingRequest, WebreqError> {
        self.spawn(self.build_get(path, args), continuations)
    }

    /// Non-blocking POST.
    pub fn apost(
        &self,
        path: &str,
        args: Option<&Args>,
        continuations: Continuations,
    ) -> Result<PendingRequest, WebreqError> {
        self.spawn(self.build_post(path, args), continuations)
    }

    fn execute(&self, request: HttpRequest) -> Result<Outcome, WebreqError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let completion = self.transport.execute(&request, self.config.timeout())?;
        Ok(normalize(completion))
    }

    fn spawn(
        &self,
        request: HttpRequest,
        continuations: Continuations,
    ) -> Result<PendingRequest, WebreqError> {
        self.transport.check(&request)?;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching asynchronous request");
        let transport = Arc::clone(&self.transport);
        let timeout = self.config.timeout();
        let handle = thread::Builder::new()
            .name("webreq-async".to_string())
            .spawn(move || {
                let completion = transport.execute(&request, timeout);
                continuations.complete(completion);
            })?;
        Ok(PendingRequest::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::http::Completion;

    /// Replays scripted completions and records every request it receives.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Completion, WebreqError>>>,
        seen: Mutex<Vec<(HttpRequest, Duration)>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<Completion, WebreqError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<Completion, WebreqError> {
            self.seen.lock().unwrap().push((request.clone(), timeout));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    /// Refuses every request before anything is sent.
    struct RefusingTransport;

    impl Transport for RefusingTransport {
        fn execute(&self, _: &HttpRequest, _: Duration) -> Result<Completion, WebreqError> {
            panic!("refused requests must never be executed");
        }

        fn check(&self, request: &HttpRequest) -> Result<(), WebreqError> {
            Err(WebreqError::InvalidRequest(request.url.clone()))
        }
    }

    fn ok(body: &str) -> Result<Completion, WebreqError> {
        Ok(Completion::Response {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16) -> Result<Completion, WebreqError> {
        Ok(Completion::Response {
            status: code,
            body: String::new(),
        })
    }

    fn client(replies: Vec<Result<Completion, WebreqError>>) -> Client<ScriptedTransport> {
        let config = Config::from_params(Some("http://localhost:3000/"), Some("1500"));
        Client::with_transport(config, ScriptedTransport::replying(replies))
    }

    #[test]
    fn build_get_appends_query_to_host_and_path() {
        let c = client(vec![]);
        let req = c.build_get("echo", Some(&Args::from([("a", "1"), ("b", "2")])));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/echo?a=1&b=2");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_without_args_has_no_query() {
        let req = client(vec![]).build_get("echo", None);
        assert_eq!(req.url, "http://localhost:3000/echo");
    }

    #[test]
    fn build_post_puts_args_in_body_not_url() {
        let req = client(vec![]).build_post("echo", Some(&Args::from([("a", "1")])));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/echo");
        assert_eq!(req.body.as_deref(), Some(r#"{"a":"1"}"#));
    }

    #[test]
    fn build_post_without_args_sends_empty_object() {
        let req = client(vec![]).build_post("echo", None);
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn build_uses_percent_encoding_when_configured() {
        let config = Config::from_params(Some("http://h/"), None)
            .with_query_encoding(crate::args::QueryEncoding::Percent);
        let c = Client::with_transport(config, ScriptedTransport::default());
        let req = c.build_get("p", Some(&Args::from([("q", "a b")])));
        assert_eq!(req.url, "http://h/p?q=a%20b");
    }

    #[test]
    fn get_normalizes_success_and_failure() {
        let c = client(vec![ok("pong"), status(503)]);
        assert_eq!(c.get("ping", None).unwrap(), Outcome::Success("pong".to_string()));
        assert_eq!(c.post("ping", None).unwrap(), Outcome::Failure(503));
    }

    #[test]
    fn sync_calls_pass_configured_timeout() {
        let c = client(vec![ok(""), ok("")]);
        c.get("a", None).unwrap();
        c.post("b", None).unwrap();
        let seen = c.transport.seen.lock().unwrap();
        assert!(seen.iter().all(|(_, t)| *t == Duration::from_millis(1500)));
    }

    #[test]
    fn invalid_request_propagates_from_sync_call() {
        let c = client(vec![Err(WebreqError::InvalidRequest("bad uri".to_string()))]);
        let err = c.get("x", None).unwrap_err();
        assert!(matches!(err, WebreqError::InvalidRequest(_)));
    }

    #[test]
    fn aget_runs_success_continuation_once() {
        let c = client(vec![ok("async body")]);
        let (tx, rx) = mpsc::channel();
        let fail_tx = tx.clone();
        c.aget(
            "echo",
            None,
            Continuations::new()
                .on_success(move |body| tx.send(Some(body)).unwrap())
                .on_failure(move || fail_tx.send(None).unwrap()),
        )
        .unwrap()
        .wait()
        .unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![Some("async body".to_string())]);
    }

    #[test]
    fn apost_runs_failure_continuation_once() {
        let c = client(vec![status(500)]);
        let (tx, rx) = mpsc::channel();
        let fail_tx = tx.clone();
        c.apost(
            "echo",
            Some(&Args::new()),
            Continuations::new()
                .on_success(move |body| tx.send(Some(body)).unwrap())
                .on_failure(move || fail_tx.send(None).unwrap()),
        )
        .unwrap()
        .wait()
        .unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![None]);
    }

    #[test]
    fn async_calls_return_check_failure_without_spawning() {
        let c = Client::with_transport(Config::default(), RefusingTransport);
        let (tx, rx) = mpsc::channel::<()>();
        let fail_tx = tx.clone();
        let continuations = || {
            let (tx, fail_tx) = (tx.clone(), fail_tx.clone());
            Continuations::new()
                .on_success(move |_| tx.send(()).unwrap())
                .on_failure(move || fail_tx.send(()).unwrap())
        };

        let err = c.aget("echo", None, continuations()).unwrap_err();
        assert!(matches!(err, WebreqError::InvalidRequest(url) if url == "127.0.0.1echo"));
        assert!(matches!(
            c.apost("echo", None, continuations()),
            Err(WebreqError::InvalidRequest(_))
        ));

        drop((tx, fail_tx));
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn async_request_keeps_host_read_at_invocation() {
        let c = client(vec![ok("")]);
        let pending = c.aget("echo", None, Continuations::new()).unwrap();
        c.set_host("http://elsewhere/");
        pending.wait().unwrap();

        let seen = c.transport.seen.lock().unwrap();
        assert_eq!(seen[0].0.url, "http://localhost:3000/echo");
        assert_eq!(seen[0].1, Duration::from_millis(1500));
    }

    #[test]
    fn dispatch_line_changes_host_for_later_requests() {
        let c = client(vec![]);
        c.dispatch_line("ChangeHost http://10.0.0.9/").unwrap();
        assert_eq!(c.host(), "http://10.0.0.9/");
        assert_eq!(c.build_get("x", None).url, "http://10.0.0.9/x");
    }

    #[test]
    fn dispatch_line_rejects_unknown_command() {
        let c = client(vec![]);
        assert!(matches!(
            c.dispatch_line("Nope"),
            Err(WebreqError::UnknownCommand(_))
        ));
        assert_eq!(c.host(), "http://localhost:3000/");
    }

    #[test]
    fn clones_share_host() {
        let c = client(vec![]);
        let other = c.clone();
        other.set_host("http://shared/");
        assert_eq!(c.host(), "http://shared/");
    }
}
