//! The response envelope every endpoint wraps its payload in.

use community_groups::{Community, Discover, GroupTreeItem, ReferralInfo, Schema, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a response: a human-readable message and, for list
/// endpoints, pagination counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_previous_page: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The generic server envelope.
///
/// Success and error responses share this shape. On errors `data` is usually
/// `null` and `meta.message` explains the failure.
///
/// ```json
/// { "code": "api.ok", "data": { ... }, "meta": { "message": "OK" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    /// Backend result code, see [`codes`](crate::codes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    /// A success envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            code: Some(crate::codes::SUCCESS.to_string()),
            data: Some(data),
            meta: None,
        }
    }

    /// The server's message, if any.
    pub fn message(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.message.as_deref())
    }

    pub fn is_success(&self) -> bool {
        self.code.as_deref() == Some(crate::codes::SUCCESS)
    }

    /// Drop the envelope and keep the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T: Schema> Schema for ApiResponse<T> {
    const NAME: &'static str = T::NAME;

    fn validate(&self) -> Result<(), SchemaError> {
        self.data.validate().map_err(|e| e.within("data"))
    }
}

/// `meta` as sent by discovery listings, where `message` and `total` are
/// always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    pub message: String,
    pub total: u64,
}

/// Response of discovery-style listings: communities, groups, "my groups",
/// search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverResponse {
    pub data: Vec<Discover>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl Schema for DiscoverResponse {
    const NAME: &'static str = "DiscoverResponse";

    fn validate(&self) -> Result<(), SchemaError> {
        self.data.validate().map_err(|e| e.within("data"))
    }
}

/// Response of `GET communities/{id}`. `data` is `null` when the community
/// is not visible to the caller.
pub type CommunityProfileResponse = ApiResponse<Community>;

/// Response of the "my groups" listing, flat or as a tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupTreeResponse {
    pub data: Vec<GroupTreeItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Schema for GroupTreeResponse {
    const NAME: &'static str = "GroupTreeResponse";

    fn validate(&self) -> Result<(), SchemaError> {
        self.data.validate().map_err(|e| e.within("data"))
    }
}

/// `meta` with a mandatory message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageMeta {
    pub message: String,
}

/// Response of `GET manage/communities/{id}/referral`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferralResponse {
    pub code: String,
    pub meta: MessageMeta,
    #[serde(default)]
    pub data: Option<ReferralInfo>,
}

impl Schema for ReferralResponse {
    const NAME: &'static str = "ReferralResponse";
}
