//! Admin-panel endpoint scoping.
//!
//! Some group endpoints exist twice: once for members under `groups/`, once
//! for community administrators under `manage/communities/{id}/groups/`. The
//! caller picks which with a [`Scope`]; nothing is read from global routing
//! state.

use community_groups::CommunityId;

/// Route fragment of the community-profile admin pages.
pub const ADMIN_COMMUNITY_PROFILE_ROUTE: &str = "/admin/community-profile";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Standard,
    Admin { community_id: CommunityId },
}

impl Scope {
    pub fn admin(community_id: impl Into<CommunityId>) -> Self {
        Scope::Admin {
            community_id: community_id.into(),
        }
    }

    /// Derive the scope from the current page: admin when `pathname` is under
    /// the community-profile admin route and a community slug is known.
    pub fn from_route(pathname: &str, community_slug: Option<&str>) -> Self {
        match community_slug {
            Some(slug) if !slug.is_empty() && pathname.contains(ADMIN_COMMUNITY_PROFILE_ROUTE) => {
                Scope::admin(slug)
            }
            _ => Scope::Standard,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Scope::Admin { .. })
    }

    /// Base URL of the scoped group endpoints, given the group API prefix
    /// (`…/group/`).
    pub fn groups_base(&self, group_api_base: &str) -> String {
        let root = group_api_base.trim_end_matches('/');
        match self {
            Scope::Standard => format!("{root}/groups/"),
            Scope::Admin { community_id } => format!(
                "{root}/manage/communities/{}/groups/",
                urlencoding::encode(community_id)
            ),
        }
    }
}
