//! Request dispatch: the one code path every endpoint goes through.
//!
//! A [`Dispatcher`] owns an immutable [`RequestConfig`] (base URL, default
//! headers, timeout) and a shared [`ApiContext`]. Each call takes a
//! [`RequestOptions`] describing the per-call overrides; the two are merged
//! with option fields winning, auth is resolved, and exactly one request goes
//! out through the context's [`Transport`](crate::transport::Transport).
//!
//! Header precedence, lowest to highest:
//!
//! 1. instance headers (always include JSON `Accept` and `Content-Type`)
//! 2. `Authorization`, unless [`RequestOptions::no_auth`] is set
//! 3. per-call headers

use std::sync::Arc;
use std::time::Duration;

use community_groups::{decode, Schema};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::RequestContext;
use crate::context::ApiContext;
use crate::error::ApiError;
use crate::events::SessionEvent;
use crate::report::{CATEGORY_AUTH, CATEGORY_VALIDATION};
use crate::transport::{HttpRequest, TransportFailure};

// ---------------------------------------------------------------------------
// RequestConfig
// ---------------------------------------------------------------------------

/// Per-instance settings. Never mutated by individual calls.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    /// Default path, used by the convenience methods ([`Dispatcher::get`],
    /// [`Dispatcher::get_detail`], ...). Usually empty.
    pub path: String,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            base_url: base_url.into(),
            path: String::new(),
            headers,
            timeout,
        }
    }

    /// Add default headers. The JSON headers stay in place unless `extra`
    /// overrides them.
    pub fn with_headers(mut self, extra: &HeaderMap) -> Self {
        merge_headers(&mut self.headers, extra);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

// ---------------------------------------------------------------------------
// RequestOptions
// ---------------------------------------------------------------------------

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Path joined onto the base URL. `None` falls back to the instance path.
    pub path: Option<String>,
    /// Replaces the instance base URL for this call.
    pub base_url: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Return non-2xx bodies as data instead of failing.
    pub with_error_handle: bool,
    /// Send no `Authorization` header.
    pub no_auth: bool,
    pub ctx: Option<RequestContext>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_error_handle(mut self) -> Self {
        self.with_error_handle = true;
        self
    }

    pub fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    pub fn context(mut self, ctx: Option<RequestContext>) -> Self {
        self.ctx = ctx;
        self
    }

    fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Dispatcher {
    config: RequestConfig,
    ctx: Arc<ApiContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<ApiContext>, config: RequestConfig) -> Self {
        Self { config, ctx }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<ApiContext> {
        &self.ctx
    }

    /// The URL a call with `options` will hit, before query parameters.
    pub fn resolve_url(&self, options: &RequestOptions) -> String {
        let base = options.base_url.as_deref().unwrap_or(&self.config.base_url);
        let path = options.path.as_deref().unwrap_or(&self.config.path);
        combine_urls(base, path)
    }

    /// Issue one request and return the response body.
    ///
    /// A 2xx whose body carries the maintenance code is treated as a
    /// maintenance failure; any other 2xx clears the stored maintenance
    /// notice.
    pub async fn dispatch(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.resolve_url(&options);
        let headers = self.resolve_headers(&options).await?;
        let with_error_handle = options.with_error_handle;

        debug!(method = %options.method, %url, "dispatch");

        let request = HttpRequest {
            method: options.method,
            url,
            headers,
            query: options.query,
            body: options.body,
            timeout: self.config.timeout,
        };

        let classifier = &self.ctx.classifier;
        match self.ctx.transport.send(request).await {
            Ok(response) if classifier.is_maintenance(&response.body) => {
                let failure = TransportFailure::Status {
                    status: response.status,
                    body: response.body,
                };
                classifier.classify(failure, with_error_handle).await
            }
            Ok(response) => {
                classifier.clear_maintenance().await;
                Ok(response.body)
            }
            Err(failure) => classifier.classify(failure, with_error_handle).await,
        }
    }

    /// [`dispatch`](Self::dispatch), then decode and validate the body as `T`.
    ///
    /// Validation failures are reported to the error sink with the request
    /// URL before being returned.
    pub async fn dispatch_as<T: Schema>(&self, options: RequestOptions) -> Result<T, ApiError> {
        let url = self.resolve_url(&options);
        let raw = self.dispatch(options).await?;
        decode::<T>(raw).map_err(|source| {
            warn!(%url, schema = T::NAME, "response failed validation: {source}");
            self.ctx
                .sink
                .report(CATEGORY_VALIDATION, &url, &source.to_string());
            ApiError::ValidationFailed { url, source }
        })
    }

    async fn resolve_headers(&self, options: &RequestOptions) -> Result<HeaderMap, ApiError> {
        let mut headers = self.config.headers.clone();
        if !options.no_auth {
            let token = self.session_token(options.ctx.as_ref()).await?;
            let value = HeaderValue::from_str(&token)
                .map_err(|e| ApiError::InvalidRequest(format!("authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        merge_headers(&mut headers, &options.headers);
        Ok(headers)
    }

    async fn session_token(&self, ctx: Option<&RequestContext>) -> Result<String, ApiError> {
        if let Some(identity) = ctx.and_then(|c| c.user.as_ref()) {
            return Ok(identity.id_token.clone());
        }
        match self.ctx.auth.token(ctx).await {
            Ok(token) => Ok(token),
            Err(e) => {
                self.ctx
                    .sink
                    .report(CATEGORY_AUTH, "could not resolve session token", &e.to_string());
                self.ctx.events.emit(SessionEvent::Expired);
                Err(ApiError::MissingAuth)
            }
        }
    }

    // --- verb helpers -------------------------------------------------------

    pub async fn do_get(&self, options: RequestOptions) -> Result<Value, ApiError> {
        self.dispatch(options.method(Method::GET)).await
    }

    pub async fn do_post(&self, options: RequestOptions) -> Result<Value, ApiError> {
        self.dispatch(options.method(Method::POST)).await
    }

    pub async fn do_put(&self, options: RequestOptions) -> Result<Value, ApiError> {
        self.dispatch(options.method(Method::PUT)).await
    }

    pub async fn do_delete(&self, options: RequestOptions) -> Result<Value, ApiError> {
        self.dispatch(options.method(Method::DELETE)).await
    }

    // --- REST helpers over the instance path --------------------------------

    /// `GET {path}`.
    pub async fn get(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let path = self.config.path.clone();
        self.do_get(options.path(path)).await
    }

    /// `GET {path}/{id}`.
    pub async fn get_detail(&self, id: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let path = self.member_path(id);
        self.do_get(options.path(path)).await
    }

    /// `POST {path}`.
    pub async fn post(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let path = self.config.path.clone();
        self.do_post(options.path(path)).await
    }

    /// `PUT {path}/{id}`.
    pub async fn put(&self, id: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let path = self.member_path(id);
        self.do_put(options.path(path)).await
    }

    /// `DELETE {path}/{id}`.
    pub async fn delete(&self, id: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let path = self.member_path(id);
        self.do_delete(options.path(path)).await
    }

    /// `DELETE {path}/destroy/{id}`.
    pub async fn destroy(&self, id: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let path = format!("{}/destroy/{}", self.config.path, segment(id));
        self.do_delete(options.path(path)).await
    }

    /// `DELETE {path}/deletes`, ids in the body.
    pub async fn deletes(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let path = format!("{}/deletes", self.config.path);
        self.do_delete(options.path(path)).await
    }

    /// `DELETE {path}/detroys`. The backend route really is spelled that way.
    pub async fn destroy_many(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let path = format!("{}/detroys", self.config.path);
        self.do_delete(options.path(path)).await
    }

    fn member_path(&self, id: &str) -> String {
        format!("{}/{}", self.config.path, segment(id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Join `base` and `relative` the way browsers' HTTP clients do: an absolute
/// `relative` wins, an empty one yields `base`, otherwise exactly one slash
/// separates the two.
pub fn combine_urls(base: &str, relative: &str) -> String {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Percent-encode one path segment.
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Overlay `over` onto `base`. A name present in `over` replaces every value
/// `base` had for it.
pub fn merge_headers(base: &mut HeaderMap, over: &HeaderMap) {
    for name in over.keys() {
        base.remove(name);
    }
    for (name, value) in over {
        base.append(name.clone(), value.clone());
    }
}

/// Flatten a serialisable struct into query pairs.
///
/// `null` fields are dropped, arrays repeat the key with a `[]` suffix, and
/// nested objects are sent as JSON text.
pub fn to_query<T: Serialize>(params: &T) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params)
        .map_err(|e| ApiError::InvalidRequest(format!("query parameters: {e}")))?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(ApiError::InvalidRequest(format!(
                "query parameters must be an object, got {other}"
            )))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{key}[]");
                for item in items {
                    if let Some(s) = scalar(item) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            other => {
                if let Some(s) = scalar(other) {
                    pairs.push((key, s));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Serialise a request body.
pub fn to_body<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::InvalidRequest(format!("body: {e}")))
}

/// The `data` field of an envelope, or `null`.
pub fn data_field(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn combine_urls_cases() {
        assert_eq!(combine_urls("http://h/v1/group/", ""), "http://h/v1/group/");
        assert_eq!(combine_urls("http://h/v1/group/", "/me"), "http://h/v1/group/me");
        assert_eq!(combine_urls("http://h/v1/group", "me/x"), "http://h/v1/group/me/x");
        assert_eq!(combine_urls("http://h/", "https://other/x"), "https://other/x");
    }

    #[test]
    fn merge_replaces_whole_header() {
        let mut base = HeaderMap::new();
        base.insert(ACCEPT, HeaderValue::from_static("application/json"));
        base.append(ACCEPT, HeaderValue::from_static("text/plain"));
        let mut over = HeaderMap::new();
        over.insert(ACCEPT, HeaderValue::from_static("text/csv"));
        merge_headers(&mut base, &over);
        let all: Vec<_> = base.get_all(ACCEPT).iter().collect();
        assert_eq!(all, vec![&HeaderValue::from_static("text/csv")]);
    }

    #[test]
    fn to_query_flattens() {
        let pairs = to_query(&json!({
            "limit": 20,
            "key": "ux",
            "missing": null,
            "ids": ["a", "b"],
            "flag": true
        }))
        .unwrap();
        assert!(pairs.contains(&("limit".into(), "20".into())));
        assert!(pairs.contains(&("key".into(), "ux".into())));
        assert!(pairs.contains(&("ids[]".into(), "a".into())));
        assert!(pairs.contains(&("ids[]".into(), "b".into())));
        assert!(pairs.contains(&("flag".into(), "true".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "missing"));
    }

    #[test]
    fn to_query_rejects_scalars() {
        assert!(matches!(to_query(&5), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn segment_encodes_reserved() {
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
        assert_eq!(segment("7c1f2a9e-4b1d"), "7c1f2a9e-4b1d");
    }

    #[test]
    fn data_field_of_envelope() {
        assert_eq!(data_field(json!({ "data": [1] })), json!([1]));
        assert_eq!(data_field(json!({ "meta": {} })), Value::Null);
        assert_eq!(data_field(Value::Null), Value::Null);
    }

    #[test]
    fn config_always_has_json_headers() {
        let mut extra = HeaderMap::new();
        extra.insert("x-app", HeaderValue::from_static("web"));
        let c = RequestConfig::new("http://h/", Duration::from_secs(5)).with_headers(&extra);
        assert_eq!(c.headers[ACCEPT], "application/json");
        assert_eq!(c.headers[CONTENT_TYPE], "application/json");
        assert_eq!(c.headers["x-app"], "web");
    }
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;
    use crate::auth::{Anonymous, Identity};
    use crate::config::ClientConfig;
    use crate::report::RecordingSink;
    use crate::test_support::{context, spawn_echo_server, spawn_mock_server, TOKEN};
    use axum::routing::get;
    use axum::{Json, Router};
    use community_groups::Group;
    use serde_json::json;

    fn dispatcher(ctx: Arc<ApiContext>, root: &str) -> Dispatcher {
        let config = RequestConfig::new(format!("{root}v1/group/"), Duration::from_secs(5));
        Dispatcher::new(ctx, config)
    }

    #[tokio::test]
    async fn option_headers_win_over_auth_and_base() {
        let root = spawn_echo_server().await;
        let (ctx, _) = context(&root);
        let http = dispatcher(ctx, &root);

        let body = http.do_get(RequestOptions::new().path("x")).await.unwrap();
        assert_eq!(body["data"]["authorization"], TOKEN);

        let body = http
            .do_get(
                RequestOptions::new()
                    .path("x")
                    .header(AUTHORIZATION, HeaderValue::from_static("override")),
            )
            .await
            .unwrap();
        assert_eq!(body["data"]["authorization"], "override");
    }

    #[tokio::test]
    async fn no_auth_skips_provider_entirely() {
        let root = spawn_echo_server().await;
        let ctx = ApiContext::builder(ClientConfig::new(root.as_str()))
            .auth(Arc::new(Anonymous))
            .build();
        let mut rx = ctx.session_events().subscribe();
        let body = dispatcher(ctx, &root)
            .do_get(RequestOptions::new().no_auth())
            .await
            .unwrap();
        assert_eq!(body["data"]["authorization"], Value::Null);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn missing_session_is_normalised() {
        let sink = Arc::new(RecordingSink::new());
        let ctx = ApiContext::builder(ClientConfig::new("http://127.0.0.1:9/"))
            .auth(Arc::new(Anonymous))
            .sink(sink.clone())
            .build();
        let mut rx = ctx.session_events().subscribe();
        let err = dispatcher(ctx, "http://127.0.0.1:9/")
            .do_get(RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingAuth));
        assert_eq!(err.to_string(), "Session Expired Or Invalid");
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Expired);
        assert_eq!(sink.reports()[0].category, CATEGORY_AUTH);
    }

    #[tokio::test]
    async fn context_identity_beats_provider() {
        let root = spawn_echo_server().await;
        let ctx = ApiContext::builder(ClientConfig::new(root.as_str()))
            .auth(Arc::new(Anonymous))
            .build();
        let body = dispatcher(ctx, &root)
            .do_get(
                RequestOptions::new()
                    .context(Some(RequestContext::with_user(Identity::new("jwt-from-ssr")))),
            )
            .await
            .unwrap();
        assert_eq!(body["data"]["authorization"], "jwt-from-ssr");
    }

    #[tokio::test]
    async fn base_url_override_replaces_instance_base() {
        let root = spawn_echo_server().await;
        let (ctx, _) = context(&root);
        let body = dispatcher(ctx, &root)
            .do_get(
                RequestOptions::new()
                    .base_url(format!("{root}other/"))
                    .path("y"),
            )
            .await
            .unwrap();
        assert_eq!(body["data"]["path"], "/other/y");
    }

    #[tokio::test]
    async fn rest_helpers_build_member_paths() {
        let root = spawn_echo_server().await;
        let (ctx, _) = context(&root);
        let http = Dispatcher::new(
            ctx,
            RequestConfig::new(format!("{root}v1/group/"), Duration::from_secs(5)).with_path("tags"),
        );
        let b = http.get_detail("t1", RequestOptions::new()).await.unwrap();
        assert_eq!(b["data"]["path"], "/v1/group/tags/t1");
        let b = http.destroy("t1", RequestOptions::new()).await.unwrap();
        assert_eq!(b["data"]["method"], "DELETE");
        assert_eq!(b["data"]["path"], "/v1/group/tags/destroy/t1");
        let b = http.destroy_many(RequestOptions::new()).await.unwrap();
        assert_eq!(b["data"]["path"], "/v1/group/tags/detroys");
        let b = http.post(RequestOptions::new().path("ignored")).await.unwrap();
        assert_eq!(b["data"]["method"], "POST");
        assert_eq!(b["data"]["path"], "/v1/group/tags");
    }

    #[tokio::test]
    async fn validation_failure_is_reported_with_url() {
        let app = Router::new().route(
            "/v1/group/bad",
            get(|| async { Json(json!({ "id": "not-a-uuid", "name": "x", "privacy": "OPEN" })) }),
        );
        let root = spawn_mock_server(app).await;
        let (ctx, sink) = context(&root);
        let err = dispatcher(ctx, &root)
            .dispatch_as::<Group>(RequestOptions::new().path("bad"))
            .await
            .unwrap_err();
        let url = format!("{root}v1/group/bad");
        match &err {
            ApiError::ValidationFailed { url: u, source } => {
                assert_eq!(u, &url);
                assert_eq!(source.path(), Some("id"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].category, CATEGORY_VALIDATION);
        assert_eq!(reports[0].message, url);
    }
}
