//! Shared helpers for the community groups conformance suite.
//!
//! [`MockBackend`] is a scripted stand-in for the groups backend: it binds an
//! ephemeral port on `127.0.0.1`, answers each `(method, path)` with a canned
//! status and JSON body, and records every request it sees so tests can
//! assert on exactly what the client sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use community_groups_client::telemetry::init_tracing;
use community_groups_client::{
    ApiContext, AuthProvider, ClientConfig, LocalStore, RecordingSink, StaticToken,
};
use serde_json::{json, Value};

static TRACING: Once = Once::new();

/// Token handed out by [`client_context`].
pub const TEST_TOKEN: &str = "conformance-id-token";

/// One request as the backend received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Decoded JSON body; `Null` when the body was empty.
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Requests received so far, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn entries(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<RecordedRequest> {
        self.0.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
struct Script {
    routes: Arc<HashMap<(Method, String), (StatusCode, Value)>>,
    delay: Option<Duration>,
    log: RequestLog,
}

/// Builder for a scripted loopback backend.
///
/// Unscripted requests get `200 {"code":"api.ok","data":null}`.
#[derive(Default)]
pub struct MockBackend {
    routes: HashMap<(Method, String), (StatusCode, Value)>,
    delay: Option<Duration>,
}

/// A running [`MockBackend`].
pub struct SpawnedBackend {
    /// Service root, e.g. `http://127.0.0.1:51234/`.
    pub root: String,
    pub log: RequestLog,
}

impl SpawnedBackend {
    /// Full URL of `path` on this backend.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.root.trim_end_matches('/'), path)
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` (path as seen by the server, e.g.
    /// `/v1/group/me/communities`) with `status` and `body`.
    pub fn on(mut self, method: Method, path: &str, status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.routes.insert((method, path.to_string()), (status, body));
        self
    }

    /// Hold every response for `delay` before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Bind an ephemeral port and serve in a background task.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(self) -> SpawnedBackend {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("get local addr");

        let log = RequestLog::default();
        let script = Script {
            routes: Arc::new(self.routes),
            delay: self.delay,
            log: log.clone(),
        };
        let router = Router::new().fallback(respond).with_state(script);

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("mock backend error");
        });

        SpawnedBackend {
            root: format!("http://{addr}/"),
            log,
        }
    }
}

async fn respond(
    State(script): State<Script>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    script.log.0.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    if let Some(delay) = script.delay {
        tokio::time::sleep(delay).await;
    }

    match script.routes.get(&(method, uri.path().to_string())) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::OK, Json(json!({ "code": "api.ok", "data": null }))),
    }
}

/// Collaborators for a test client. Anything left `None` gets the
/// conformance default.
#[derive(Default)]
pub struct ContextOptions {
    pub auth: Option<Arc<dyn AuthProvider>>,
    pub store: Option<Arc<dyn LocalStore>>,
    pub timeout: Option<Duration>,
}

/// Build an [`ApiContext`] against `root`, signed in with [`TEST_TOKEN`]
/// unless `options.auth` says otherwise. Error reports land in the returned
/// sink. The first call also installs the tracing subscriber, so
/// `RUST_LOG=community_groups_client=debug` shows client logs in test output.
pub fn client_context(root: &str, options: ContextOptions) -> (Arc<ApiContext>, Arc<RecordingSink>) {
    TRACING.call_once(|| {
        if let Err(e) = init_tracing("community_groups_client=warn") {
            eprintln!("tracing already initialised: {e}");
        }
    });
    let mut config = ClientConfig::new(root);
    if let Some(timeout) = options.timeout {
        config.timeout = timeout;
    }
    let sink = Arc::new(RecordingSink::new());
    let mut builder = ApiContext::builder(config)
        .auth(
            options
                .auth
                .unwrap_or_else(|| Arc::new(StaticToken::new(TEST_TOKEN))),
        )
        .sink(sink.clone());
    if let Some(store) = options.store {
        builder = builder.store(store);
    }
    (builder.build(), sink)
}
