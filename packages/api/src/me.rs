//! Parameters for the caller-scoped `me/` endpoints.

use serde::{Deserialize, Serialize};

use crate::list::ListParams;

/// How "my groups" are laid out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupViewType {
    #[default]
    Flat,
    Tree,
}

/// Query of `GET me/communities/{id}/groups`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MyGroupsQuery {
    pub preview_member: bool,
    pub list_by: GroupViewType,
    #[serde(flatten)]
    pub list: ListParams,
}

impl MyGroupsQuery {
    pub fn new(view: GroupViewType, list: ListParams) -> Self {
        Self {
            preview_member: true,
            list_by: view,
            list,
        }
    }
}

/// `GET me/search/groups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchDiscoverParams {
    pub keyword: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn my_groups_query_defaults() {
        let q = MyGroupsQuery::new(GroupViewType::default(), ListParams::default());
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({ "preview_member": true, "list_by": "flat" })
        );
    }
}
