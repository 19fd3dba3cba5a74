//! Shared collaborators for every resource client.
//!
//! An [`ApiContext`] is built once at startup and shared behind an [`Arc`].
//! Each resource client holds a clone of that `Arc`; there is no global.
//!
//! ```no_run
//! use std::sync::Arc;
//! use community_groups_client::{ApiContext, ClientConfig, CommunityApi, StaticToken};
//!
//! let ctx = ApiContext::builder(ClientConfig::from_env())
//!     .auth(Arc::new(StaticToken::new("id-token")))
//!     .build();
//! let communities = CommunityApi::new(ctx);
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{Anonymous, AuthProvider};
use crate::classify::ErrorClassifier;
use crate::config::ClientConfig;
use crate::events::SessionEvents;
use crate::report::{ErrorSink, TracingSink};
use crate::store::memory::MemoryStore;
use crate::store::LocalStore;
use crate::transport::{ReqwestTransport, Transport};

pub struct ApiContext {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) sink: Arc<dyn ErrorSink>,
    pub(crate) events: SessionEvents,
    pub(crate) classifier: ErrorClassifier,
}

impl ApiContext {
    pub fn builder(config: ClientConfig) -> ApiContextBuilder {
        ApiContextBuilder {
            config,
            transport: None,
            auth: None,
            store: None,
            sink: None,
            events: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Handle for subscribing to session-expired notifications.
    pub fn session_events(&self) -> &SessionEvents {
        &self.events
    }

    /// The maintenance notice persisted by the last maintenance response.
    pub async fn maintenance_notice(&self) -> Option<Value> {
        self.classifier.maintenance_notice().await
    }
}

/// Builder for [`ApiContext`]. Every collaborator has a default:
///
/// | Collaborator | Default |
/// |--------------|---------|
/// | transport | [`ReqwestTransport`] with a fresh client |
/// | auth | [`Anonymous`] |
/// | store | [`MemoryStore`] |
/// | sink | [`TracingSink`] |
/// | events | a new [`SessionEvents`] channel |
pub struct ApiContextBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    auth: Option<Arc<dyn AuthProvider>>,
    store: Option<Arc<dyn LocalStore>>,
    sink: Option<Arc<dyn ErrorSink>>,
    events: Option<SessionEvents>,
}

impl ApiContextBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Arc<ApiContext> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let events = self.events.unwrap_or_default();
        let classifier = ErrorClassifier::new(
            store,
            events.clone(),
            Arc::clone(&sink),
            self.config.maintenance_code.clone(),
        );
        Arc::new(ApiContext {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::default())),
            auth: self.auth.unwrap_or_else(|| Arc::new(Anonymous)),
            config: self.config,
            sink,
            events,
            classifier,
        })
    }
}
