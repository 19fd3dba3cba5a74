//! Schema types and validators for the community groups API.
//!
//! This crate describes the records the groups backend returns (groups,
//! communities, discovery items, user profiles, membership questions and
//! referral codes) and the decoders that check a JSON payload against them.
//! It has no I/O; the `community-groups-client` crate does the HTTP.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Entity types: [`Group`], [`Community`], [`Discover`], [`User`], ... |
//! | [`validation`] | [`Schema`] trait and [`decode`] |
//! | [`tree`] | [`GroupTree`], an id-indexed view of nested group trees |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use community_groups::{decode, Group};
//!
//! let value: serde_json::Value = serde_json::from_str(body)?;
//! let group: Group = decode(value)?;
//! for child in &group.children {
//!     println!("{}", child.name);
//! }
//! ```

pub mod tree;
pub mod types;
pub mod validation;

pub use tree::{nesting_depth, GroupTree};
pub use types::{
    Community, CommunityId, CommunityRef, Discover, Gender, Group, GroupId, GroupPrivacy,
    GroupSettings, GroupTreeItem, LatestWork, MemberPreview, MembershipQuestion, ReferralInfo,
    User, UserId,
};
pub use validation::{decode, Schema, SchemaError};
