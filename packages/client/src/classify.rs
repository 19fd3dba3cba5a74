//! Maps transport failures onto [`ApiError`].
//!
//! Checks run in a fixed order and the first match wins:
//!
//! | # | Condition | Outcome |
//! |---|-----------|---------|
//! | 1 | body `code` equals the maintenance code | store notice, `MaintenanceMode` |
//! | 2 | HTTP 401 | clear notice, emit [`SessionEvent::Expired`], `Unauthorized` |
//! | 3 | other status, `with_error_handle` set | body returned as data |
//! | 4 | other status | `ServerRejected` with the server's message |
//! | 5 | no response | `NoResponse` |
//! | 6 | anything else | `Unexpected` |
//!
//! Store failures are logged and never change the outcome.

use std::sync::Arc;

use community_groups_api::{messages, HTTP_UNAUTHORIZED};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::events::{SessionEvent, SessionEvents};
use crate::report::{ErrorSink, CATEGORY_TRANSPORT};
use crate::store::{LocalStore, MAINTENANCE_KEY};
use crate::transport::TransportFailure;

pub struct ErrorClassifier {
    store: Arc<dyn LocalStore>,
    events: SessionEvents,
    sink: Arc<dyn ErrorSink>,
    maintenance_code: String,
}

impl ErrorClassifier {
    pub fn new(
        store: Arc<dyn LocalStore>,
        events: SessionEvents,
        sink: Arc<dyn ErrorSink>,
        maintenance_code: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            sink,
            maintenance_code: maintenance_code.into(),
        }
    }

    /// Whether `body` carries the maintenance code. Numeric codes are
    /// compared by their decimal form, so `503` matches a code of `"503"`.
    pub fn is_maintenance(&self, body: &Value) -> bool {
        match body.get("code") {
            Some(Value::String(code)) => *code == self.maintenance_code,
            Some(Value::Number(code)) => code.to_string() == self.maintenance_code,
            _ => false,
        }
    }

    pub async fn classify(
        &self,
        failure: TransportFailure,
        with_error_handle: bool,
    ) -> Result<Value, ApiError> {
        match failure {
            TransportFailure::Status { body, .. } if self.is_maintenance(&body) => {
                self.enter_maintenance(&body).await;
                Err(ApiError::MaintenanceMode(body))
            }
            TransportFailure::Status { status, .. } if status == HTTP_UNAUTHORIZED => {
                self.clear_maintenance().await;
                self.events.emit(SessionEvent::Expired);
                Err(ApiError::Unauthorized)
            }
            TransportFailure::Status { status, body } => {
                if with_error_handle {
                    debug!(status, "server error passed through to caller");
                    return Ok(body);
                }
                Err(ApiError::ServerRejected {
                    status: Some(status),
                    message: server_message(&body).unwrap_or_else(|| messages::UNEXPECTED.into()),
                })
            }
            TransportFailure::NoResponse(detail) => {
                self.sink
                    .report(CATEGORY_TRANSPORT, messages::NO_RESPONSE, &detail);
                Err(ApiError::NoResponse)
            }
            TransportFailure::Other(detail) => {
                self.sink
                    .report(CATEGORY_TRANSPORT, messages::UNEXPECTED, &detail);
                Err(ApiError::Unexpected(detail))
            }
        }
    }

    /// Persist `body` as the current maintenance notice.
    pub async fn enter_maintenance(&self, body: &Value) {
        warn!("backend reports maintenance mode");
        if let Err(e) = self.store.set(MAINTENANCE_KEY, &body.to_string()).await {
            warn!("could not persist maintenance notice: {e}");
        }
    }

    pub async fn clear_maintenance(&self) {
        if let Err(e) = self.store.remove(MAINTENANCE_KEY).await {
            warn!("could not clear maintenance notice: {e}");
        }
    }

    /// The stored maintenance notice, if the last response reported one.
    pub async fn maintenance_notice(&self) -> Option<Value> {
        match self.store.get(MAINTENANCE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("could not read maintenance notice: {e}");
                None
            }
        }
    }
}

/// Longest plain-text body shown to the user as-is.
const MAX_TEXT_MESSAGE: usize = 200;

/// `meta.message`, falling back to a top-level `message` or a short
/// plain-text body. Markup and long text (proxy error pages) yield `None`.
fn server_message(body: &Value) -> Option<String> {
    body.pointer("/meta/message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .or_else(|| body.as_str().map(str::trim).filter(|s| is_displayable_text(s)))
        .map(str::to_string)
}

fn is_displayable_text(text: &str) -> bool {
    !text.is_empty() && !text.starts_with('<') && text.chars().count() <= MAX_TEXT_MESSAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingSink;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn classifier() -> (ErrorClassifier, Arc<MemoryStore>, SessionEvents) {
        let store = Arc::new(MemoryStore::new());
        let events = SessionEvents::new();
        let c = ErrorClassifier::new(
            store.clone(),
            events.clone(),
            Arc::new(RecordingSink::new()),
            "api.maintenance",
        );
        (c, store, events)
    }

    fn status(status: u16, body: Value) -> TransportFailure {
        TransportFailure::Status { status, body }
    }

    #[tokio::test]
    async fn maintenance_wins_over_unauthorized() {
        let (c, _store, events) = classifier();
        let mut rx = events.subscribe();
        let body = json!({ "code": "api.maintenance", "meta": { "message": "back soon" } });
        let err = c.classify(status(401, body.clone()), false).await.unwrap_err();
        assert!(matches!(err, ApiError::MaintenanceMode(ref b) if *b == body));
        assert_eq!(c.maintenance_notice().await, Some(body));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unauthorized_clears_notice_and_emits_once() {
        let (c, store, events) = classifier();
        store.set(MAINTENANCE_KEY, "{}").await.unwrap();
        let mut rx = events.subscribe();
        let err = c.classify(status(401, Value::Null), false).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Expired);
        assert!(rx.try_recv().is_err());
        assert_eq!(c.maintenance_notice().await, None);
    }

    #[tokio::test]
    async fn with_error_handle_returns_body() {
        let (c, _, _) = classifier();
        let body = json!({ "code": "group.terms.not_found", "data": null });
        assert_eq!(c.classify(status(404, body.clone()), true).await.unwrap(), body);
    }

    #[tokio::test]
    async fn server_rejection_uses_meta_message() {
        let (c, _, _) = classifier();
        let err = c
            .classify(status(422, json!({ "meta": { "message": "Name taken" } })), false)
            .await
            .unwrap_err();
        match err {
            ApiError::ServerRejected { status, message } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "Name taken");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_rejection_without_message_is_generic() {
        let (c, _, _) = classifier();
        let err = c.classify(status(500, Value::Null), false).await.unwrap_err();
        assert_eq!(err.to_string(), messages::UNEXPECTED);
    }

    #[tokio::test]
    async fn short_text_body_is_shown() {
        let (c, _, _) = classifier();
        let err = c
            .classify(status(502, json!("Bad Gateway")), false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[tokio::test]
    async fn html_and_long_text_bodies_are_generic() {
        let (c, _, _) = classifier();
        let html = json!("<html><body><h1>502 Bad Gateway</h1></body></html>");
        let err = c.classify(status(502, html), false).await.unwrap_err();
        assert_eq!(err.to_string(), messages::UNEXPECTED);

        let long = Value::String("x".repeat(MAX_TEXT_MESSAGE + 1));
        let err = c.classify(status(500, long), false).await.unwrap_err();
        assert_eq!(err.to_string(), messages::UNEXPECTED);
    }

    #[test]
    fn numeric_maintenance_code_matches() {
        let c = ErrorClassifier::new(
            Arc::new(MemoryStore::new()),
            SessionEvents::new(),
            Arc::new(RecordingSink::new()),
            "503",
        );
        assert!(c.is_maintenance(&json!({ "code": 503 })));
        assert!(c.is_maintenance(&json!({ "code": "503" })));
        assert!(!c.is_maintenance(&json!({ "code": 500 })));
        assert!(!c.is_maintenance(&json!({ "code": null })));
    }

    #[tokio::test]
    async fn no_response_and_other() {
        let (c, _, _) = classifier();
        let err = c
            .classify(TransportFailure::NoResponse("timed out".into()), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoResponse));
        let err = c
            .classify(TransportFailure::Other("bad json".into()), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(ref d) if d == "bad json"));
    }
}
