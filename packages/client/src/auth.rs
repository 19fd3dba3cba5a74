//! Session token resolution.
//!
//! The identity service itself is out of scope; the client only needs "give
//! me the current session token". [`AuthProvider`] is that seam. Server-side
//! rendering passes a [`RequestContext`] whose pre-resolved [`Identity`]
//! short-circuits the provider.

use async_trait::async_trait;

/// A signed-in user as resolved by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The id token sent verbatim in the `Authorization` header.
    pub id_token: String,
    pub user_id: Option<String>,
}

impl Identity {
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            user_id: None,
        }
    }
}

/// Per-request context from a server-rendering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub locale: Option<String>,
    /// Identity already resolved for this request, if any.
    pub user: Option<Identity>,
}

impl RequestContext {
    pub fn with_user(identity: Identity) -> Self {
        Self {
            locale: None,
            user: Some(identity),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Nobody is signed in, or the session has lapsed.
    #[error("no authenticated session")]
    NoSession,

    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Source of session tokens.
///
/// `ctx` is the server-rendering context when there is one, so providers that
/// read sessions from request cookies can scope the lookup to that request.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    async fn token(&self, ctx: Option<&RequestContext>) -> Result<String, AuthError>;
}

/// A provider that always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn token(&self, _ctx: Option<&RequestContext>) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// A provider with no session. Every authenticated call fails with
/// [`ApiError::MissingAuth`](crate::ApiError::MissingAuth); public endpoints
/// still work.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl AuthProvider for Anonymous {
    async fn token(&self, _ctx: Option<&RequestContext>) -> Result<String, AuthError> {
        Err(AuthError::NoSession)
    }
}
