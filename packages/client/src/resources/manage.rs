//! `manage/communities/` endpoints for community administrators.

use std::sync::Arc;

use community_groups::{ReferralInfo, UserId};
use community_groups_api::community::UserIdsBody;
use community_groups_api::manage::{
    ActivityLogParams, CommunityGroupRef, CommunityOrder, EditGroupSetParams, GroupSetPayload,
    GroupSetRef, GroupsAsAdminParams, MemberGroupsParams, ReferralUpdate,
};
use community_groups_api::{ListParams, ReferralResponse};
use serde_json::Value;

use super::resource_dispatcher;
use crate::context::ApiContext;
use crate::dispatcher::{data_field, segment, to_body, to_query, Dispatcher, RequestOptions};
use crate::error::ApiError;

#[derive(Clone)]
pub struct GroupManageApi {
    http: Dispatcher,
}

impl GroupManageApi {
    pub fn new(ctx: Arc<ApiContext>) -> Self {
        Self {
            http: resource_dispatcher(ctx, "manage/communities/"),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.http
    }

    pub async fn get_owned_communities(&self) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path("me/communities/owned");
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn update_community_orders(&self, orders: &[CommunityOrder]) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path("me/communities/order")
            .body(to_body(&orders)?);
        self.http.do_put(options).await
    }

    pub async fn get_groups_as_admin(
        &self,
        community_id: &str,
        params: &GroupsAsAdminParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/groups", segment(community_id)))
            .query(to_query(params)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn get_default_group_sets(&self, community_id: &str) -> Result<Value, ApiError> {
        let options =
            RequestOptions::new().path(format!("{}/group-sets-default", segment(community_id)));
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn get_members_as_admin(
        &self,
        community_id: &str,
        params: &ListParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/members", segment(community_id)))
            .query(to_query(params)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    /// Groups `user_id` belongs to, or administers when `is_admin` is set.
    /// Blank ids short-circuit to an empty list without a request.
    pub async fn get_user_joined_groups(&self, params: &MemberGroupsParams) -> Result<Value, ApiError> {
        if params.community_id.trim().is_empty() || params.user_id.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        let mut path = format!(
            "{}/users/{}/groups",
            segment(&params.community_id),
            segment(&params.user_id)
        );
        if params.is_admin {
            path.push_str("/as-admin");
        }
        let options = RequestOptions::new()
            .path(path)
            .query(to_query(&params.list)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    // --- group sets ---------------------------------------------------------

    pub async fn get_group_sets(
        &self,
        community_id: &str,
        params: &ListParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-sets", segment(community_id)))
            .query(to_query(params)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn create_group_set(
        &self,
        community_id: &str,
        payload: &GroupSetPayload,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-sets", segment(community_id)))
            .body(to_body(payload)?);
        self.http.do_post(options).await
    }

    /// The set id travels in the body, not the path.
    pub async fn edit_group_set(&self, params: &EditGroupSetParams) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-sets", segment(&params.community_id)))
            .body(to_body(params)?);
        self.http.do_put(options).await
    }

    pub async fn delete_group_set(&self, set: &GroupSetRef) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(Self::group_set_path(set));
        self.http.do_delete(options).await
    }

    pub async fn remove_default_group_set(&self, community_id: &str) -> Result<Value, ApiError> {
        let options =
            RequestOptions::new().path(format!("{}/group-sets-default", segment(community_id)));
        self.http.do_delete(options).await
    }

    /// Starts a background job; poll it with
    /// [`get_add_member_progress`](Self::get_add_member_progress).
    pub async fn add_members_to_group_set(
        &self,
        set: &GroupSetRef,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/members", Self::group_set_path(set)))
            .body(to_body(&UserIdsBody {
                user_ids: user_ids.to_vec(),
            })?);
        self.http.do_post(options).await
    }

    pub async fn get_add_member_progress(
        &self,
        community_id: &str,
        job_id: &str,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(format!(
            "{}/group-sets/members/{}",
            segment(community_id),
            segment(job_id)
        ));
        self.http.do_get(options).await
    }

    pub async fn make_group_set_default(&self, set: &GroupSetRef) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(format!("{}/default", Self::group_set_path(set)));
        self.http.do_get(options).await
    }

    pub async fn get_groups_in_group_sets(&self, community_id: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-ids-in-all-group-sets", segment(community_id)));
        Ok(data_field(self.http.do_get(options).await?))
    }

    // --- archive ------------------------------------------------------------

    pub async fn archive_group(&self, target: &CommunityGroupRef) -> Result<Value, ApiError> {
        self.put_group_state(target, "archive").await
    }

    pub async fn restore_group(&self, target: &CommunityGroupRef) -> Result<Value, ApiError> {
        self.put_group_state(target, "restore").await
    }

    // --- misc ---------------------------------------------------------------

    /// Whether the caller may create, update and delete tags in the
    /// community.
    pub async fn can_manage_tags(&self, community_id: &str) -> Result<bool, ApiError> {
        let options = RequestOptions::new().path(format!(
            "me/permissions/can-cud-tags/community/{}",
            segment(community_id)
        ));
        let data = data_field(self.http.do_get(options).await?);
        Ok(data.as_bool().unwrap_or(false))
    }

    /// `None` when the community has no referral code yet.
    pub async fn get_referral_info(&self, community_id: &str) -> Result<Option<ReferralInfo>, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/referral", segment(community_id)))
            .with_error_handle();
        let response: ReferralResponse = self.http.dispatch_as(options).await?;
        Ok(response.data)
    }

    pub async fn update_referral_info(
        &self,
        community_id: &str,
        update: &ReferralUpdate,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/referral", segment(community_id)))
            .body(to_body(update)?);
        self.http.do_put(options).await
    }

    /// Unset paging fields default to 20 per page, page 1, newest first.
    pub async fn get_activity_logs(
        &self,
        community_id: &str,
        params: ActivityLogParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/activity-logs", segment(community_id)))
            .query(to_query(&params.with_defaults())?);
        self.http.do_get(options).await
    }

    fn group_set_path(set: &GroupSetRef) -> String {
        format!(
            "{}/group-sets/{}",
            segment(&set.community_id),
            segment(&set.group_set_id)
        )
    }

    async fn put_group_state(&self, target: &CommunityGroupRef, state: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(format!(
            "{}/groups/{}/{state}",
            segment(&target.community_id),
            segment(&target.group_id)
        ));
        self.http.do_put(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, spawn_echo_server, spawn_mock_server};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use community_groups_api::manage::ActivityObjectType;
    use serde_json::json;

    const COMMUNITY_ID: &str = "3f0c7b52-9d1e-4a7f-8c2b-5e6d7f8a9b0c";

    #[tokio::test]
    async fn joined_groups_blank_ids_short_circuit() {
        let (ctx, _) = context("http://127.0.0.1:9/");
        let out = GroupManageApi::new(ctx)
            .get_user_joined_groups(&MemberGroupsParams {
                community_id: COMMUNITY_ID.into(),
                user_id: "".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out, json!([]));
    }

    #[tokio::test]
    async fn joined_groups_as_admin_suffix() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let echo = GroupManageApi::new(ctx)
            .get_user_joined_groups(&MemberGroupsParams {
                community_id: COMMUNITY_ID.into(),
                user_id: "u1".into(),
                is_admin: true,
                list: ListParams::page(5, 10),
            })
            .await
            .unwrap();
        assert_eq!(
            echo["path"],
            format!("/v1/group/manage/communities/{COMMUNITY_ID}/users/u1/groups/as-admin")
        );
        assert_eq!(echo["query"], "limit=5&offset=10");
    }

    #[tokio::test]
    async fn activity_log_defaults_in_query() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let resp = GroupManageApi::new(ctx)
            .get_activity_logs(
                COMMUNITY_ID,
                ActivityLogParams {
                    object_type: Some(ActivityObjectType::Member),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            resp["data"]["query"],
            "limit=20&object_type=MEMBER&page=1&sort=desc"
        );
    }

    #[tokio::test]
    async fn edit_group_set_body_is_camel_case() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let resp = GroupManageApi::new(ctx)
            .edit_group_set(&EditGroupSetParams {
                community_id: COMMUNITY_ID.into(),
                group_set_id: "s1".into(),
                data: GroupSetPayload {
                    name: "Onboarding".into(),
                    description: None,
                    group_ids: vec![],
                },
            })
            .await
            .unwrap();
        assert_eq!(resp["data"]["method"], "PUT");
        assert_eq!(resp["data"]["body"]["groupSetId"], "s1");
    }

    #[tokio::test]
    async fn owned_communities_nest_under_manage() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let echo = GroupManageApi::new(ctx).get_owned_communities().await.unwrap();
        assert_eq!(echo["path"], "/v1/group/manage/communities/me/communities/owned");
    }

    #[tokio::test]
    async fn can_manage_tags_reads_bool() {
        let app = Router::new().route(
            "/v1/group/manage/communities/me/permissions/can-cud-tags/community/{id}",
            get(|| async { Json(json!({ "code": "api.ok", "data": true })) }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        assert!(GroupManageApi::new(ctx).can_manage_tags(COMMUNITY_ID).await.unwrap());
    }

    #[tokio::test]
    async fn referral_missing_is_none() {
        let app = Router::new().route(
            "/v1/group/manage/communities/{id}/referral",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "code": "referral.not_found", "data": null,
                                 "meta": { "message": "No referral" } })),
                )
            }),
        );
        let (ctx, _) = context(&spawn_mock_server(app).await);
        let info = GroupManageApi::new(ctx)
            .get_referral_info(COMMUNITY_ID)
            .await
            .unwrap();
        assert_eq!(info, None);
    }

    #[tokio::test]
    async fn archive_and_restore_paths() {
        let (ctx, _) = context(&spawn_echo_server().await);
        let api = GroupManageApi::new(ctx);
        let target = CommunityGroupRef {
            community_id: COMMUNITY_ID.into(),
            group_id: "g1".into(),
        };
        let resp = api.archive_group(&target).await.unwrap();
        assert_eq!(
            resp["data"]["path"],
            format!("/v1/group/manage/communities/{COMMUNITY_ID}/groups/g1/archive")
        );
        let resp = api.restore_group(&target).await.unwrap();
        assert!(resp["data"]["path"].as_str().unwrap().ends_with("/g1/restore"));
    }
}
