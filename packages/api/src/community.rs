//! Parameters for the `communities/` endpoints.

use community_groups::{CommunityId, GroupId, UserId};
use serde::{Deserialize, Serialize};

use crate::list::ListParams;

/// `GET communities` or `GET communities/discover`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetCommunitiesParams {
    /// List communities the caller has not joined yet instead of all of them.
    /// Selects the endpoint; never sent as a query parameter.
    #[serde(skip)]
    pub discover: bool,

    #[serde(flatten)]
    pub list: ListParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// `GET communities/{id}/groups` or `.../groups/discover`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverGroupParams {
    #[serde(skip)]
    pub community_id: CommunityId,

    #[serde(skip)]
    pub discover: bool,

    #[serde(flatten)]
    pub list: ListParams,
}

/// `GET communities/{id}/group-structure`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunityStructureParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_archived: Option<bool>,
}

/// Fold or unfold one node of the community structure in the admin UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCollapseParams {
    pub community_id: CommunityId,
    pub group_id: GroupId,
    pub collapsed: bool,
}

/// Body of the collapse toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollapseBody {
    pub status: bool,
}

/// Which groups may receive `group_id` when it is moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTargetsParams {
    pub community_id: CommunityId,
    pub group_id: GroupId,
    /// Search key. An empty string means no filter.
    pub key: Option<String>,
}

/// Move `group_id` under `target_outer_group_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveGroupParams {
    pub community_id: CommunityId,
    pub group_id: GroupId,
    pub target_outer_group_id: GroupId,
}

/// Body of `PUT communities/{id}/group-structure/move`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveGroupBody {
    pub group_id: GroupId,
    pub target_outer_group_id: GroupId,
}

/// Preview the effect of a move before committing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveGroupPreviewParams {
    pub community_id: CommunityId,
    pub group_id: GroupId,
    pub target_id: Option<GroupId>,
}

/// Query of `GET communities/{id}/group-structure/move-preview`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveGroupPreviewQuery {
    pub group_id: GroupId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<GroupId>,
}

/// Reorder sibling groups. The body is the bare ordered id array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderGroupsParams {
    pub community_id: CommunityId,
    pub group_ids: Vec<GroupId>,
}

/// `{ "user_ids": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdsBody {
    pub user_ids: Vec<UserId>,
}
