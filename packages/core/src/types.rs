//! Schema entities returned by the community groups backend.
//!
//! Every struct here mirrors the backend's JSON shape field for field. Fields
//! the backend may omit or send as `null` are `Option`s; fields this crate
//! does not know about are captured in a flattened `extra` map so that they
//! survive a decode → encode round trip unchanged.
//!
//! | Type | Shape |
//! |------|-------|
//! | [`Group`] | a group, optionally carrying its nested child groups |
//! | [`Community`] | a root group with a required `slug` and `group_id` |
//! | [`Discover`] | a group as listed on discovery pages, with its community |
//! | [`User`] | a user profile |
//! | [`MembershipQuestion`] | a question asked when joining a group |
//! | [`ReferralInfo`] | a community's referral code |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a group. Always a UUID on the wire.
pub type GroupId = String;

/// Identifier of a user. Always a UUID on the wire.
pub type UserId = String;

/// Identifier of a community. A community is addressed by its own UUID,
/// distinct from the `group_id` of its root group.
pub type CommunityId = String;

/// Who can see and join a group.
///
/// Serialises as an upper-case string (e.g. `"OPEN"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupPrivacy {
    /// Anyone can find and join.
    Open,
    /// Anyone can find; joining needs approval.
    Closed,
    /// Only members can see content.
    Private,
    /// Hidden from non-members entirely.
    Secret,
}

impl std::fmt::Display for GroupPrivacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupPrivacy::Open => write!(f, "OPEN"),
            GroupPrivacy::Closed => write!(f, "CLOSED"),
            GroupPrivacy::Private => write!(f, "PRIVATE"),
            GroupPrivacy::Secret => write!(f, "SECRET"),
        }
    }
}

impl std::str::FromStr for GroupPrivacy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(GroupPrivacy::Open),
            "CLOSED" => Ok(GroupPrivacy::Closed),
            "PRIVATE" => Ok(GroupPrivacy::Private),
            "SECRET" => Ok(GroupPrivacy::Secret),
            _ => Err(format!(
                "unknown group privacy {:?}; expected one of: OPEN, CLOSED, PRIVATE, SECRET",
                s
            )),
        }
    }
}

/// Join-flow switches attached to a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_join_approval: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active_group_terms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active_membership_questions: Option<bool>,
}

/// A member avatar shown in group previews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberPreview {
    pub id: UserId,
    pub avatar: String,
}

/// A group.
///
/// Groups form a tree: a community's root group owns child groups, which own
/// their own children, and so on. The server returns trees pre-nested in
/// `children`, so a decoded tree is acyclic by construction. Endpoints that
/// return flat lists send no `children` at all; the field then decodes as an
/// empty vector.
///
/// `collapsed` is only present on community-structure trees, where it records
/// whether the admin UI folded the node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<GroupId>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Depth of the group inside its community. `0` is the community root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    /// Ids of all ancestors, root first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<GroupId>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_img_url: Option<String>,

    pub privacy: GroupPrivacy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<GroupSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u64>,

    /// Caller's membership state as a backend enum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_status: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pending_members: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,

    /// A handful of member avatars for previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MemberPreview>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_default_group_set: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,

    /// Direct child groups, in display order.
    #[serde(default)]
    pub children: Vec<Group>,

    /// Fields not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Construct a bare group with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, privacy: GroupPrivacy) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            slug: None,
            description: None,
            level: None,
            parents: None,
            owner_id: None,
            created_by: None,
            icon: None,
            background_img_url: None,
            privacy,
            chat_id: None,
            scheme_id: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
            settings: None,
            user_count: None,
            join_status: None,
            total_pending_members: None,
            unique: None,
            members: None,
            is_in_default_group_set: None,
            community_id: None,
            is_archived: None,
            collapsed: None,
            children: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A node of a community-structure tree. Same shape as [`Group`]; the alias
/// marks call sites where `collapsed` is meaningful.
pub type GroupTreeItem = Group;

/// The community summary embedded in discovery items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunityRef {
    pub id: CommunityId,
    pub name: String,
    pub group_id: GroupId,
}

/// A group as returned by discovery and "my groups" listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discover {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,

    #[serde(flatten)]
    pub group: Group,
}

/// A community: its root group plus the root's `group_id`.
///
/// `id` (inside `group`) is the community id; `group_id` is the id of the
/// community's root group. A community must carry a `slug`; that rule is
/// checked by [`validate`](crate::Schema::validate) rather than the type, so
/// that `Group` stays the single definition of the shared fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Community {
    pub group_id: GroupId,

    #[serde(flatten)]
    pub group: Group,
}

/// Self-reported gender on a user profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Others,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestWork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_position: Option<String>,
}

/// A user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bein_staff_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rocket_chat_id: Option<String>,
    #[serde(rename = "cognitoUuid", skip_serializing_if = "Option::is_none")]
    pub cognito_uuid: Option<String>,
    #[serde(rename = "streamUuid", skip_serializing_if = "Option::is_none")]
    pub stream_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_work: Option<LatestWork>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A question a group asks prospective members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipQuestion {
    pub id: String,
    pub group_id: GroupId,
    pub question: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A community's referral code and whether it is currently accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferralInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,
    pub code: String,
    pub is_active: bool,
}
