//! Request and response types for the community groups REST API.
//!
//! The backend is a JSON-over-HTTPS service rooted at
//! `{service_root}{api_version}/group/`. This crate encodes its contract as
//! Rust types; the `community-groups-client` crate sends them.
//!
//! # Resource families
//!
//! | Base path | Module | Purpose |
//! |-----------|--------|---------|
//! | `communities/` | [`community`] | listing, profile, group structure |
//! | `groups/` | [`group`] | membership, join requests, terms, questions |
//! | `manage/communities/` | [`manage`] | community administration |
//! | `me/` | [`me`] | caller-scoped listings |
//! | `public/` | (none) | unauthenticated profiles, no parameters |
//!
//! Every response is wrapped in an [`ApiResponse`] envelope.

pub mod community;
pub mod envelope;
pub mod error;
pub mod group;
pub mod list;
pub mod manage;
pub mod me;

pub use envelope::{
    ApiResponse, CommunityProfileResponse, DiscoverResponse, GroupTreeResponse, ListMeta, Meta,
    MessageMeta, ReferralResponse,
};
pub use error::{codes, messages, HTTP_UNAUTHORIZED};
pub use list::{ListParams, SortOrder, DEFAULT_PARAM_LIMIT};
