//! The single outbound HTTP call.
//!
//! [`Transport`] is the seam between the dispatcher and the network. The
//! production implementation is [`ReqwestTransport`]; tests either point it
//! at a loopback server or swap in their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;

/// A fully resolved request: URL joined, headers merged, auth applied.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// A 2xx response. An empty body decodes as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// Why the transport did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFailure {
    /// The server answered with a non-2xx status. `body` is the decoded JSON
    /// body, or the raw text as a JSON string when it was not JSON.
    Status { status: u16, body: Value },

    /// No response arrived: connect failure, reset, or timeout.
    NoResponse(String),

    /// Anything else, such as a 2xx whose body is not JSON.
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// [`Transport`] over a pooled [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() || e.is_request() {
                TransportFailure::NoResponse(e.to_string())
            } else {
                TransportFailure::Other(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::NoResponse(e.to_string())
            } else {
                TransportFailure::Other(e.to_string())
            }
        })?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(v) => v,
                Err(e) if status.is_success() => {
                    return Err(TransportFailure::Other(format!("invalid JSON body: {e}")));
                }
                Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            }
        };

        if status.is_success() {
            Ok(HttpResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
