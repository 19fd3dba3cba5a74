//! Parameters for the `groups/` endpoints: membership, join requests, terms
//! and membership questions.

use community_groups::{GroupId, GroupPrivacy, UserId};
use serde::{Deserialize, Serialize};

use crate::list::ListParams;

/// Sort keys accepted by the join-request listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JoiningRequestsSort {
    #[serde(rename = "created_at:desc")]
    CreatedAtDesc,
    #[serde(rename = "created_at:asc")]
    CreatedAtAsc,
    #[serde(rename = "updated_at:desc")]
    UpdatedAtDesc,
    #[serde(rename = "updated_at:asc")]
    UpdatedAtAsc,
    #[serde(rename = "id:desc")]
    IdDesc,
}

/// State filter for join requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Waiting,
    Approved,
    Canceled,
    Rejected,
}

/// `GET groups/{id}/join-requests`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoiningRequestsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<JoinRequestStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<JoiningRequestsSort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinApprovalSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_join_approval: Option<bool>,
}

/// Editable group profile fields. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupProfileEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<GroupPrivacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<JoinApprovalSetting>,
}

/// One answer to a membership question. `answer` may be `null` for optional
/// questions the user skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipAnswer {
    pub question_id: String,
    pub answer: Option<String>,
}

/// Request to join a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGroupPayload {
    pub group_id: GroupId,
    pub membership_answers: Option<Vec<MembershipAnswer>>,
}

/// Body of `POST groups/{id}/join`. Sent only when answers are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinGroupBody {
    pub membership_answers: Vec<MembershipAnswer>,
}

/// Approve or decline one join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoiningRequestAction {
    pub group_id: GroupId,
    pub join_request_id: String,
}

/// `PUT groups/{id}/settings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateJoinSettingsParams {
    #[serde(skip)]
    pub group_id: GroupId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_join_approval: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active_membership_questions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active_group_terms: Option<bool>,
}

/// Group terms text, used to create and to edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupTermsParams {
    pub content: String,
}

/// A membership question to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembershipQuestion {
    pub group_id: GroupId,
    pub question: String,
    pub is_required: Option<bool>,
}

/// Body of create/update membership question. `is_required` is always sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipQuestionBody {
    pub question: String,
    pub is_required: bool,
}

/// `{ "user_id": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdBody {
    pub user_id: UserId,
}

/// Body of `PUT groups/{id}/users/remove`. The backend reads the id list
/// from a singular `user_id` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveMembersBody {
    pub user_id: Vec<UserId>,
}

/// `GET groups/{id}/joinable-users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinableUsersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub limit: u32,
}

/// `GET groups/{id}/users`.
pub type GroupMembersParams = ListParams;
