//! Local HTTP endpoint that reflects request data back to the caller.
//!
//! Routes:
//! - `GET|POST /echo` returns `200` with an [`Echo`] JSON document describing
//!   the request it received.
//! - `ANY /status/{code}` answers with the given status code.
//! - `GET /delay/{ms}` sleeps before answering `200`, for timeout tests.
//!
//! Every other path falls through to axum's default `404`.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw: method, raw query string (without `?`) and body text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: String,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", get(delay))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, RawQuery(query): RawQuery, body: Bytes) -> Json<Echo> {
    let echo = Echo {
        method: method.to_string(),
        query: query.unwrap_or_default(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    tracing::debug!(method = %echo.method, query = %echo.query, "echo");
    Json(echo)
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "delayed"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: "a=1".to_string(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "a=1");
        assert_eq!(json["body"], "");
    }

    #[test]
    fn echo_rejects_missing_fields() {
        let result: Result<Echo, _> = serde_json::from_str(r#"{"method":"GET"}"#);
        assert!(result.is_err());
    }
}
