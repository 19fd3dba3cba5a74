//! `communities/` endpoints: discovery, profile, and the group structure
//! editor.

use std::sync::Arc;

use community_groups::{Community, UserId};
use community_groups_api::community::{
    CollapseBody, CommunityStructureParams, DiscoverGroupParams, GetCommunitiesParams,
    MoveGroupBody, MoveGroupParams, MoveGroupPreviewParams, MoveGroupPreviewQuery,
    MoveTargetsParams, ReorderGroupsParams, ToggleCollapseParams, UserIdsBody,
};
use community_groups_api::{messages, CommunityProfileResponse, DiscoverResponse};
use serde_json::Value;

use super::resource_dispatcher;
use crate::context::ApiContext;
use crate::dispatcher::{data_field, segment, to_body, to_query, Dispatcher, RequestOptions};
use crate::error::ApiError;

#[derive(Clone)]
pub struct CommunityApi {
    http: Dispatcher,
}

impl CommunityApi {
    pub fn new(ctx: Arc<ApiContext>) -> Self {
        Self {
            http: resource_dispatcher(ctx, "communities/"),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.http
    }

    /// `GET communities` or, with `discover`, `GET communities/discover`.
    pub async fn get_communities(
        &self,
        params: &GetCommunitiesParams,
    ) -> Result<DiscoverResponse, ApiError> {
        let path = if params.discover { "discover" } else { "" };
        let options = RequestOptions::new().path(path).query(to_query(params)?);
        self.http.dispatch_as(options).await
    }

    /// `GET communities/{id}`.
    ///
    /// Errors come back as data and are re-raised with the server's message,
    /// so a hidden community fails with e.g. "Community not found".
    pub async fn get_community_profile(
        &self,
        community_id: &str,
    ) -> Result<Community, ApiError> {
        let options = RequestOptions::new()
            .path(segment(community_id))
            .with_error_handle();
        let response: CommunityProfileResponse = self.http.dispatch_as(options).await?;
        let message = response.message().unwrap_or(messages::UNEXPECTED).to_string();
        response.into_data().ok_or_else(|| ApiError::rejected(message))
    }

    /// Record whether the structure editor shows `group_id` folded.
    ///
    /// Returns `Ok(None)` without a request when either id is blank. The
    /// backend exposes this as a GET with a JSON body.
    pub async fn collapse_group(
        &self,
        params: &ToggleCollapseParams,
    ) -> Result<Option<Value>, ApiError> {
        if params.community_id.trim().is_empty() || params.group_id.trim().is_empty() {
            return Ok(None);
        }
        let options = RequestOptions::new()
            .path(format!(
                "{}/group-structure/collapse/{}",
                segment(&params.community_id),
                segment(&params.group_id)
            ))
            .body(to_body(&CollapseBody {
                status: params.collapsed,
            })?);
        let body = self.http.do_get(options).await?;
        Ok(Some(data_field(body)))
    }

    pub async fn get_community_structure(
        &self,
        community_id: &str,
        params: &CommunityStructureParams,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-structure", segment(community_id)))
            .query(to_query(params)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    /// Groups `group_id` may be moved under. An empty `key` is not sent.
    pub async fn get_move_targets(&self, params: &MoveTargetsParams) -> Result<Value, ApiError> {
        let mut query = Vec::new();
        if let Some(key) = params.key.as_deref().filter(|k| !k.is_empty()) {
            query.push(("key".to_string(), key.to_string()));
        }
        let options = RequestOptions::new()
            .path(format!(
                "{}/group-structure/move-targets/{}",
                segment(&params.community_id),
                segment(&params.group_id)
            ))
            .query(query);
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn move_group(&self, params: &MoveGroupParams) -> Result<Value, ApiError> {
        let body = MoveGroupBody {
            group_id: params.group_id.clone(),
            target_outer_group_id: params.target_outer_group_id.clone(),
        };
        let options = RequestOptions::new()
            .path(format!("{}/group-structure/move", segment(&params.community_id)))
            .body(to_body(&body)?);
        self.http.do_put(options).await
    }

    /// Replace the order of a community's top-level groups. The body is the
    /// bare id array.
    pub async fn reorder_groups(&self, params: &ReorderGroupsParams) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path(format!("{}/group-structure/order", segment(&params.community_id)))
            .body(to_body(&params.group_ids)?);
        self.http.do_put(options).await
    }

    pub async fn get_move_group_preview(
        &self,
        params: &MoveGroupPreviewParams,
    ) -> Result<Value, ApiError> {
        let query = MoveGroupPreviewQuery {
            group_id: params.group_id.clone(),
            target_id: params.target_id.clone(),
        };
        let options = RequestOptions::new()
            .path(format!(
                "{}/group-structure/move-preview",
                segment(&params.community_id)
            ))
            .query(to_query(&query)?);
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn assign_community_admins(
        &self,
        community_id: &str,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        self.put_user_ids(community_id, "assign-admin", user_ids).await
    }

    pub async fn revoke_community_admins(
        &self,
        community_id: &str,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        self.put_user_ids(community_id, "revoke-admin", user_ids).await
    }

    /// `GET communities/{id}/groups`, or `.../groups/discover` with
    /// `discover`.
    pub async fn get_groups(&self, params: &DiscoverGroupParams) -> Result<DiscoverResponse, ApiError> {
        let id = segment(&params.community_id);
        let path = if params.discover {
            format!("{id}/groups/discover")
        } else {
            format!("{id}/groups")
        };
        let options = RequestOptions::new().path(path).query(to_query(params)?);
        self.http.dispatch_as(options).await
    }

    async fn put_user_ids(
        &self,
        community_id: &str,
        action: &str,
        user_ids: &[UserId],
    ) -> Result<Value, ApiError> {
        let body = UserIdsBody {
            user_ids: user_ids.to_vec(),
        };
        let options = RequestOptions::new()
            .path(format!("{}/{action}", segment(community_id)))
            .body(to_body(&body)?);
        self.http.do_put(options).await
    }
}
