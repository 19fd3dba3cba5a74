//! Loopback mock backend shared by the unit tests.

use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::auth::StaticToken;
use crate::config::ClientConfig;
use crate::context::ApiContext;
use crate::report::RecordingSink;

pub const TOKEN: &str = "test-id-token";

/// Spawn a loopback axum server and return its root URL.
pub async fn spawn_mock_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

/// A context signed in with [`TOKEN`], reporting into the returned sink.
pub fn context(root: &str) -> (Arc<ApiContext>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let ctx = ApiContext::builder(ClientConfig::new(root))
        .auth(Arc::new(StaticToken::new(TOKEN)))
        .sink(sink.clone())
        .build();
    (ctx, sink)
}

/// Describes the request it received inside a success envelope.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "code": "api.ok",
        "data": {
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "authorization": header("authorization"),
            "body": body,
        },
        "meta": { "message": "OK" }
    }))
}

/// Server that answers every request with [`echo`].
pub async fn spawn_echo_server() -> String {
    spawn_mock_server(Router::new().fallback(echo)).await
}
