//! `groups/` endpoints: membership, join requests, admins, terms and
//! membership questions.
//!
//! Calls marked *admin-aware* go to `manage/communities/{id}/groups/` instead
//! of `groups/` when the client carries [`Scope::Admin`].

use std::sync::Arc;

use community_groups::{MembershipQuestion, UserId};
use community_groups_api::community::UserIdsBody;
use community_groups_api::group::{
    GroupProfileEdit, GroupTermsParams, JoinGroupBody, JoinGroupPayload, JoinableUsersQuery,
    JoiningRequestAction, JoiningRequestsParams, MembershipQuestionBody, NewMembershipQuestion,
    RemoveMembersBody, UpdateJoinSettingsParams, UserIdBody,
};
use community_groups_api::{codes, messages, ApiResponse, ListParams, DEFAULT_PARAM_LIMIT};
use serde_json::Value;

use super::resource_dispatcher;
use crate::auth::RequestContext;
use crate::context::ApiContext;
use crate::dispatcher::{data_field, segment, to_body, to_query, Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::scope::Scope;

/// Extra knobs for [`GroupApi::join_group`].
#[derive(Debug, Clone, Default)]
pub struct JoinOptions {
    /// Return a rejected join (e.g. "already requested") as data.
    pub with_error_handle: bool,
    /// Server-rendering context whose identity should make the call.
    pub ctx: Option<RequestContext>,
}

#[derive(Clone)]
pub struct GroupApi {
    http: Dispatcher,
    group_api_base: String,
    scope: Scope,
}

impl GroupApi {
    pub fn new(ctx: Arc<ApiContext>) -> Self {
        let group_api_base = ctx.config().group_api_base();
        Self {
            http: resource_dispatcher(ctx, "groups/"),
            group_api_base,
            scope: Scope::Standard,
        }
    }

    /// A copy of this client bound to `scope`.
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.http
    }

    /// Options rooted at the scoped groups base.
    fn scoped(&self, path: String) -> RequestOptions {
        RequestOptions::new()
            .base_url(self.scope.groups_base(&self.group_api_base))
            .path(path)
    }

    // --- members ------------------------------------------------------------

    /// Admin-aware.
    pub async fn get_group_members(
        &self,
        group_id: &str,
        params: &ListParams,
    ) -> Result<Value, ApiError> {
        let options = self
            .scoped(format!("{}/users", segment(group_id)))
            .query(to_query(params)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    /// Users that could be added to the group, filtered by `key`.
    pub async fn search_joinable_users(
        &self,
        group_id: &str,
        key: Option<&str>,
    ) -> Result<Value, ApiError> {
        let query = JoinableUsersQuery {
            key: key.map(str::to_string),
            limit: DEFAULT_PARAM_LIMIT,
        };
        let options = RequestOptions::new()
            .path(format!("{}/joinable-users", segment(group_id)))
            .query(to_query(&query)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    /// `PUT {groups base}{id}`. Admin-aware.
    ///
    /// Older clients sent this to `{id}/users`, which is the member-list
    /// route; profile edits belong on the group resource itself.
    pub async fn update_group_profile(
        &self,
        group_id: &str,
        payload: &GroupProfileEdit,
    ) -> Result<Value, ApiError> {
        let options = self.scoped(segment(group_id)).body(to_body(payload)?);
        self.http.do_put(options).await
    }

    /// Admin-aware.
    pub async fn assign_group_admin(&self, group_id: &str, user_id: &str) -> Result<Value, ApiError> {
        self.put_user_id(group_id, "assign-admin", user_id).await
    }

    /// Admin-aware.
    pub async fn revoke_group_admin(&self, group_id: &str, user_id: &str) -> Result<Value, ApiError> {
        self.put_user_id(group_id, "revoke-admin", user_id).await
    }

    /// Admin-aware. The backend names the field `user_id` even though it is
    /// a list.
    pub async fn remove_group_members(
        &self,
        group_id: &str,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        let body = RemoveMembersBody {
            user_id: user_ids.to_vec(),
        };
        let options = self
            .scoped(format!("{}/users/remove", segment(group_id)))
            .body(to_body(&body)?);
        self.http.do_put(options).await
    }

    /// Admin-aware.
    pub async fn add_users_to_group(
        &self,
        group_id: &str,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        let body = UserIdsBody {
            user_ids: user_ids.to_vec(),
        };
        let options = self
            .scoped(format!("{}/users/add", segment(group_id)))
            .body(to_body(&body)?);
        self.http.do_put(options).await
    }

    // --- joining ------------------------------------------------------------

    pub async fn join_group(
        &self,
        payload: &JoinGroupPayload,
        join: JoinOptions,
    ) -> Result<Value, ApiError> {
        let mut options = RequestOptions::new()
            .path(format!("{}/join", segment(&payload.group_id)))
            .context(join.ctx);
        if let Some(answers) = &payload.membership_answers {
            options = options.body(to_body(&JoinGroupBody {
                membership_answers: answers.clone(),
            })?);
        }
        if join.with_error_handle {
            options = options.with_error_handle();
        }
        self.http.do_post(options).await
    }

    /// Admin-aware.
    pub async fn join_group_as_admin(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = self.scoped(format!("{}/join", segment(group_id)));
        self.http.do_post(options).await
    }

    pub async fn leave_group(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(format!("{}/leave", segment(group_id)));
        self.http.do_post(options).await
    }

    pub async fn cancel_join_request(&self, group_id: &str) -> Result<Value, ApiError> {
        let options =
            RequestOptions::new().path(format!("{}/cancel-joining-request", segment(group_id)));
        self.http.do_put(options).await
    }

    pub async fn get_joining_requests(
        &self,
        group_id: &str,
        params: &JoiningRequestsParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/join-requests", segment(group_id)))
            .query(to_query(params)?);
        self.http.do_get(options).await
    }

    /// Admin-aware. Returns `data` when present, otherwise the whole body
    /// (server errors included).
    pub async fn approve_joining_request(
        &self,
        action: &JoiningRequestAction,
    ) -> Result<Value, ApiError> {
        self.act_on_request(action, "approve").await
    }

    /// Admin-aware. Same return convention as
    /// [`approve_joining_request`](Self::approve_joining_request).
    pub async fn decline_joining_request(
        &self,
        action: &JoiningRequestAction,
    ) -> Result<Value, ApiError> {
        self.act_on_request(action, "decline").await
    }

    /// Admin-aware.
    pub async fn approve_all_joining_requests(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = self.scoped(format!("{}/joining-requests/approve", segment(group_id)));
        self.http.do_put(options).await
    }

    /// Admin-aware.
    pub async fn decline_all_joining_requests(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = self.scoped(format!("{}/joining-requests/decline", segment(group_id)));
        self.http.do_put(options).await
    }

    pub async fn update_join_settings(
        &self,
        params: &UpdateJoinSettingsParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/settings", segment(&params.group_id)))
            .body(to_body(params)?);
        self.http.do_put(options).await
    }

    // --- terms --------------------------------------------------------------

    /// The group's terms. A group without terms is not an error: the
    /// not-found envelope is returned as-is. Any other non-success code
    /// fails with the server's message.
    pub async fn get_group_terms(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/terms", segment(group_id)))
            .with_error_handle();
        let body = self.http.do_get(options).await?;
        match body.get("code").and_then(Value::as_str) {
            Some(codes::SUCCESS) | Some(codes::GROUP_TERMS_NOT_FOUND) => Ok(body),
            _ => {
                let message = body
                    .pointer("/meta/message")
                    .and_then(Value::as_str)
                    .unwrap_or(messages::UNEXPECTED);
                Err(ApiError::rejected(message))
            }
        }
    }

    pub async fn create_group_terms(
        &self,
        group_id: &str,
        terms: &GroupTermsParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/terms", segment(group_id)))
            .body(to_body(terms)?);
        self.http.do_post(options).await
    }

    pub async fn edit_group_terms(
        &self,
        group_id: &str,
        terms: &GroupTermsParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/terms", segment(group_id)))
            .body(to_body(terms)?);
        self.http.do_put(options).await
    }

    pub async fn delete_group_terms(&self, group_id: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(format!("{}/terms", segment(group_id)));
        self.http.do_delete(options).await
    }

    // --- membership questions -----------------------------------------------

    /// `GET groups/{id}/membership-questions`.
    ///
    /// Older clients issued a `POST` here, which the server treats as
    /// creating a question. Reading is a `GET`.
    pub async fn get_membership_questions(
        &self,
        group_id: &str,
    ) -> Result<Vec<MembershipQuestion>, ApiError> {
        let options =
            RequestOptions::new().path(format!("{}/membership-questions", segment(group_id)));
        let response: ApiResponse<Vec<MembershipQuestion>> = self.http.dispatch_as(options).await?;
        Ok(response.into_data().unwrap_or_default())
    }

    /// `is_required` defaults to `false`.
    pub async fn create_membership_question(
        &self,
        question: &NewMembershipQuestion,
    ) -> Result<Value, ApiError> {
        let body = MembershipQuestionBody {
            question: question.question.clone(),
            is_required: question.is_required.unwrap_or(false),
        };
        let options = RequestOptions::new()
            .path(format!("{}/membership-questions", segment(&question.group_id)))
            .body(to_body(&body)?);
        self.http.do_post(options).await
    }

    /// Sends every field except the ids, which go in the path.
    pub async fn update_membership_question(
        &self,
        question: &MembershipQuestion,
    ) -> Result<Value, ApiError> {
        let mut body = to_body(question)?;
        if let Some(map) = body.as_object_mut() {
            map.remove("id");
            map.remove("group_id");
        }
        let options = RequestOptions::new()
            .path(Self::question_path(question))
            .body(body);
        self.http.do_put(options).await
    }

    pub async fn delete_membership_question(
        &self,
        question: &MembershipQuestion,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(Self::question_path(question));
        self.http.do_delete(options).await
    }

    // --- helpers ------------------------------------------------------------

    fn question_path(question: &MembershipQuestion) -> String {
        format!(
            "{}/membership-questions/{}",
            segment(&question.group_id),
            segment(&question.id)
        )
    }

    async fn put_user_id(&self, group_id: &str, action: &str, user_id: &str) -> Result<Value, ApiError> {
        let body = UserIdBody {
            user_id: user_id.to_string(),
        };
        let options = self
            .scoped(format!("{}/{action}", segment(group_id)))
            .body(to_body(&body)?);
        self.http.do_put(options).await
    }

    async fn act_on_request(
        &self,
        action: &JoiningRequestAction,
        verb: &str,
    ) -> Result<Value, ApiError> {
        let options = self
            .scoped(format!(
                "{}/joining-requests/{}/{verb}",
                segment(&action.group_id),
                segment(&action.join_request_id)
            ))
            .with_error_handle();
        let body = self.http.do_put(options).await?;
        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::test_support::{context, spawn_echo_server, spawn_mock_server, TOKEN};
    use axum::http::StatusCode;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use community_groups_api::group::MembershipAnswer;
    use serde_json::json;

    const COMMUNITY_ID: &str = "3f0c7b52-9d1e-4a7f-8c2b-5e6d7f8a9b0c";
    const GROUP_ID: &str = "7c1f2a9e-4b1d-4c55-9a0e-1f2d3c4b5a60";

    #[tokio::test]
    async fn admin_scope_rewrites_member_listing() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let api = GroupApi::new(ctx);

        let echo = api
            .get_group_members(GROUP_ID, &ListParams::page(20, 0))
            .await
            .unwrap();
        assert_eq!(echo["path"], format!("/v1/group/groups/{GROUP_ID}/users"));

        let admin = api.with_scope(Scope::admin(COMMUNITY_ID));
        let echo = admin
            .get_group_members(GROUP_ID, &ListParams::page(20, 0))
            .await
            .unwrap();
        assert_eq!(
            echo["path"],
            format!("/v1/group/manage/communities/{COMMUNITY_ID}/groups/{GROUP_ID}/users")
        );
        assert_eq!(echo["query"], "limit=20&offset=0");
        assert!(api.scope() == &Scope::Standard);
    }

    #[tokio::test]
    async fn join_posts_to_join_with_answers() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let resp = GroupApi::new(ctx)
            .join_group(
                &JoinGroupPayload {
                    group_id: GROUP_ID.into(),
                    membership_answers: Some(vec![MembershipAnswer {
                        question_id: "q1".into(),
                        answer: Some("yes".into()),
                    }]),
                },
                JoinOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(resp["data"]["path"], format!("/v1/group/groups/{GROUP_ID}/join"));
        assert_eq!(
            resp["data"]["body"],
            json!({ "membership_answers": [{ "question_id": "q1", "answer": "yes" }] })
        );
        assert_eq!(resp["data"]["authorization"], TOKEN);
    }

    #[tokio::test]
    async fn join_without_answers_has_no_body_and_uses_ctx_identity() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let resp = GroupApi::new(ctx)
            .join_group(
                &JoinGroupPayload {
                    group_id: GROUP_ID.into(),
                    membership_answers: None,
                },
                JoinOptions {
                    with_error_handle: false,
                    ctx: Some(RequestContext::with_user(Identity::new("ssr-token"))),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp["data"]["body"], Value::Null);
        assert_eq!(resp["data"]["authorization"], "ssr-token");
    }

    #[tokio::test]
    async fn terms_not_found_is_returned() {
        let app = Router::new().route(
            "/v1/group/groups/{id}/terms",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "code": "group.terms.not_found", "data": null,
                                 "meta": { "message": "No terms" } })),
                )
            }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        let body = GroupApi::new(ctx).get_group_terms(GROUP_ID).await.unwrap();
        assert_eq!(body["code"], "group.terms.not_found");
    }

    #[tokio::test]
    async fn terms_other_error_rejects_with_message() {
        let app = Router::new().route(
            "/v1/group/groups/{id}/terms",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "code": "group.forbidden", "meta": { "message": "Members only" } })),
                )
            }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        let err = GroupApi::new(ctx).get_group_terms(GROUP_ID).await.unwrap_err();
        assert_eq!(err.to_string(), "Members only");
    }

    #[tokio::test]
    async fn approve_falls_back_to_whole_body() {
        let app = Router::new().route(
            "/v1/group/groups/{id}/joining-requests/{rid}/approve",
            put(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "code": "request.handled", "data": null,
                                 "meta": { "message": "Already approved" } })),
                )
            }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        let body = GroupApi::new(ctx)
            .approve_joining_request(&JoiningRequestAction {
                group_id: GROUP_ID.into(),
                join_request_id: "r1".into(),
            })
            .await
            .unwrap();
        assert_eq!(body["meta"]["message"], "Already approved");
    }

    #[tokio::test]
    async fn membership_question_bodies() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let api = GroupApi::new(ctx);

        let resp = api
            .create_membership_question(&NewMembershipQuestion {
                group_id: GROUP_ID.into(),
                question: "Why join?".into(),
                is_required: None,
            })
            .await
            .unwrap();
        assert_eq!(
            resp["data"]["body"],
            json!({ "question": "Why join?", "is_required": false })
        );

        let q = MembershipQuestion {
            id: "q1".into(),
            group_id: GROUP_ID.into(),
            question: "Why?".into(),
            is_required: Some(true),
            created_at: None,
            updated_at: None,
        };
        let resp = api.update_membership_question(&q).await.unwrap();
        assert_eq!(
            resp["data"]["path"],
            format!("/v1/group/groups/{GROUP_ID}/membership-questions/q1")
        );
        assert_eq!(resp["data"]["body"], json!({ "question": "Why?", "is_required": true }));
    }

    #[tokio::test]
    async fn membership_questions_are_validated() {
        let app = Router::new().route(
            "/v1/group/groups/{id}/membership-questions",
            get(|| async {
                Json(json!({ "code": "api.ok", "data": [
                    { "id": "q1", "group_id": GROUP_ID, "question": "Why?", "is_required": true }
                ]}))
            }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        let qs = GroupApi::new(ctx)
            .get_membership_questions(GROUP_ID)
            .await
            .unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].is_required, Some(true));
    }

    #[tokio::test]
    async fn join_settings_put_under_group() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let resp = GroupApi::new(ctx)
            .update_join_settings(&UpdateJoinSettingsParams {
                group_id: GROUP_ID.into(),
                is_join_approval: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resp["data"]["path"], format!("/v1/group/groups/{GROUP_ID}/settings"));
        assert_eq!(resp["data"]["body"], json!({ "is_join_approval": true }));
    }

    #[tokio::test]
    async fn profile_update_puts_to_group_resource() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let edit = GroupProfileEdit {
            name: Some("Renamed".into()),
            ..Default::default()
        };

        let api = GroupApi::new(ctx);
        let resp = api.update_group_profile(GROUP_ID, &edit).await.unwrap();
        assert_eq!(resp["data"]["method"], "PUT");
        assert_eq!(resp["data"]["path"], format!("/v1/group/groups/{GROUP_ID}"));
        assert_eq!(resp["data"]["body"], json!({ "name": "Renamed" }));

        let admin = api.with_scope(Scope::admin("c1"));
        let resp = admin.update_group_profile(GROUP_ID, &edit).await.unwrap();
        assert_eq!(
            resp["data"]["path"],
            format!("/v1/group/manage/communities/c1/groups/{GROUP_ID}")
        );
    }
}
