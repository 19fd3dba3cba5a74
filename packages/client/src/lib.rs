//! HTTP client for the community groups API.
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`dispatcher`] | Merges config, options and auth; one request per call |
//! | [`classify`] | Maps failures to [`ApiError`], tracks maintenance mode |
//! | [`resources`] | One client per backend resource |
//! | [`auth`] | Session token seam ([`AuthProvider`]) |
//! | [`store`] | Persistence for the maintenance notice |
//! | [`events`] | Session-expired broadcast |
//! | [`ui`] | Window focus and loading overlay flags |
//!
//! Everything shared lives in an [`ApiContext`], built once and handed to
//! each resource client:
//!
//! ```no_run
//! # async fn demo() -> Result<(), community_groups_client::ApiError> {
//! use std::sync::Arc;
//! use community_groups_client::{ApiContext, ClientConfig, GroupMeApi, StaticToken};
//! use community_groups_api::ListParams;
//!
//! let ctx = ApiContext::builder(ClientConfig::from_env())
//!     .auth(Arc::new(StaticToken::new("id-token")))
//!     .build();
//! let mine = GroupMeApi::new(ctx).get_your_groups(&ListParams::page(20, 0)).await?;
//! println!("{} groups", mine.data.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod classify;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod report;
pub mod resources;
pub mod scope;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use auth::{Anonymous, AuthError, AuthProvider, Identity, RequestContext, StaticToken};
pub use classify::ErrorClassifier;
pub use config::ClientConfig;
pub use context::{ApiContext, ApiContextBuilder};
pub use dispatcher::{combine_urls, Dispatcher, RequestConfig, RequestOptions};
pub use error::ApiError;
pub use events::{SessionEvent, SessionEvents};
pub use report::{ErrorSink, RecordingSink, TracingSink};
pub use resources::community::CommunityApi;
pub use resources::group::{GroupApi, JoinOptions};
pub use resources::manage::GroupManageApi;
pub use resources::me::GroupMeApi;
pub use resources::public::GroupPublicApi;
pub use scope::Scope;
pub use store::memory::MemoryStore;
pub use store::sqlite::SqliteStore;
pub use store::{LocalStore, StoreError};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportFailure};
pub use ui::{LoadingOverlay, WindowFocus};
