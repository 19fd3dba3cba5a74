//! Parameters for the community administration endpoints
//! (`manage/communities/`).

use community_groups::{CommunityId, GroupId, UserId};
use serde::{Deserialize, Serialize};

use crate::list::{ListParams, SortOrder};

/// One entry of the caller's community ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunityOrder {
    pub id: CommunityId,
}

/// `GET manage/communities/{id}/groups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupsAsAdminParams {
    #[serde(flatten)]
    pub list: ListParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Groups a given member belongs to, optionally only those they administer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberGroupsParams {
    pub community_id: CommunityId,
    pub user_id: UserId,
    pub is_admin: bool,
    pub list: ListParams,
}

/// A group set: a named bundle of groups new members can be added to at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSetPayload {
    pub name: String,
    pub description: Option<String>,
    pub group_ids: Vec<GroupId>,
}

/// Body of `PUT manage/communities/{id}/group-sets`.
///
/// The backend takes the set id inside the body rather than the path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditGroupSetParams {
    pub community_id: CommunityId,
    pub group_set_id: String,
    pub data: GroupSetPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSetRef {
    pub community_id: CommunityId,
    pub group_set_id: String,
}

/// Identifies one group within a community, for archive and restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityGroupRef {
    pub community_id: CommunityId,
    pub group_id: GroupId,
}

/// `PUT manage/communities/{id}/referral`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferralUpdate {
    pub is_active: bool,
}

/// What an activity-log entry is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityObjectType {
    Group,
    Member,
}

/// `GET manage/communities/{id}/activity-logs`.
///
/// `from` and `to` are epoch milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLogParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ActivityObjectType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
}

impl ActivityLogParams {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const DEFAULT_PAGE: u32 = 1;

    /// Fill unset paging fields: 20 per page, first page, newest first.
    pub fn with_defaults(mut self) -> Self {
        self.limit.get_or_insert(Self::DEFAULT_LIMIT);
        self.page.get_or_insert(Self::DEFAULT_PAGE);
        self.sort.get_or_insert(SortOrder::Desc);
        self
    }
}
