//! `me/` endpoints: the caller's communities and groups.

use std::sync::Arc;

use community_groups_api::manage::CommunityOrder;
use community_groups_api::me::{GroupViewType, MyGroupsQuery, SearchDiscoverParams};
use community_groups_api::{DiscoverResponse, GroupTreeResponse, ListParams};
use serde_json::Value;

use super::resource_dispatcher;
use crate::context::ApiContext;
use crate::dispatcher::{data_field, segment, to_body, to_query, Dispatcher, RequestOptions};
use crate::error::ApiError;

#[derive(Clone)]
pub struct GroupMeApi {
    http: Dispatcher,
}

impl GroupMeApi {
    pub fn new(ctx: Arc<ApiContext>) -> Self {
        Self {
            http: resource_dispatcher(ctx, "me/"),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.http
    }

    pub async fn can_manage_tags(&self, community_id: &str) -> Result<bool, ApiError> {
        let options = RequestOptions::new().path(format!(
            "permissions/can-cud-tags/community/{}",
            segment(community_id)
        ));
        let data = data_field(self.http.do_get(options).await?);
        Ok(data.as_bool().unwrap_or(false))
    }

    pub async fn get_owned_communities(&self) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path("communities/owned");
        Ok(data_field(self.http.do_get(options).await?))
    }

    pub async fn update_community_orders(&self, orders: &[CommunityOrder]) -> Result<Value, ApiError> {
        let options = RequestOptions::new()
            .path("communities/order")
            .body(to_body(&orders)?);
        self.http.do_put(options).await
    }

    pub async fn get_my_communities(&self) -> Result<DiscoverResponse, ApiError> {
        let options = RequestOptions::new().path("communities");
        self.http.dispatch_as(options).await
    }

    /// The caller's groups in one community, flat or as a tree. Member
    /// previews are always requested.
    pub async fn get_my_groups(
        &self,
        community_id: &str,
        view: GroupViewType,
        list: ListParams,
    ) -> Result<GroupTreeResponse, ApiError> {
        let query = MyGroupsQuery::new(view, list);
        let options = RequestOptions::new()
            .path(format!("communities/{}/groups", segment(community_id)))
            .query(to_query(&query)?);
        self.http.dispatch_as(options).await
    }

    pub async fn get_your_groups(&self, params: &ListParams) -> Result<DiscoverResponse, ApiError> {
        let options = RequestOptions::new().path("groups").query(to_query(params)?);
        self.http.dispatch_as(options).await
    }

    /// Groups the caller manages.
    pub async fn get_managed_groups(&self, params: &ListParams) -> Result<DiscoverResponse, ApiError> {
        let options = RequestOptions::new()
            .path("groups/manage")
            .query(to_query(params)?);
        self.http.dispatch_as(options).await
    }

    /// Search groups across the caller's communities.
    ///
    /// A level-0 hit is a community's root group; its `id` is replaced by
    /// the community id so links open the community page.
    pub async fn search_discover(
        &self,
        params: &SearchDiscoverParams,
    ) -> Result<DiscoverResponse, ApiError> {
        let options = RequestOptions::new()
            .path("search/groups")
            .query(to_query(params)?);
        let mut response: DiscoverResponse = self.http.dispatch_as(options).await?;
        for item in &mut response.data {
            if item.group.level == Some(0) {
                if let Some(community) = &item.community {
                    item.group.id = community.id.clone();
                }
            }
        }
        Ok(response)
    }
}
