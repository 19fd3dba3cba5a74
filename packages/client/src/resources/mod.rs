//! One client per backend resource.
//!
//! Every client hangs off `{root}{version}/group/` with a fixed segment:
//!
//! | Client | Segment |
//! |--------|---------|
//! | [`CommunityApi`](community::CommunityApi) | `communities/` |
//! | [`GroupApi`](group::GroupApi) | `groups/` (or the admin equivalent, see [`Scope`](crate::Scope)) |
//! | [`GroupManageApi`](manage::GroupManageApi) | `manage/communities/` |
//! | [`GroupMeApi`](me::GroupMeApi) | `me/` |
//! | [`GroupPublicApi`](public::GroupPublicApi) | `public/` |
//!
//! Methods map one-to-one onto endpoints. Most return the envelope's `data`
//! as raw JSON; endpoints with a known response shape decode into typed
//! structs and fail with [`ApiError::ValidationFailed`](crate::ApiError) when
//! the shape is wrong.

pub mod community;
pub mod group;
pub mod manage;
pub mod me;
pub mod public;

use std::sync::Arc;

use crate::context::ApiContext;
use crate::dispatcher::{Dispatcher, RequestConfig};

fn resource_dispatcher(ctx: Arc<ApiContext>, resource: &str) -> Dispatcher {
    let base = format!("{}{resource}", ctx.config().group_api_base());
    let config = RequestConfig::new(base, ctx.config().timeout);
    Dispatcher::new(ctx, config)
}
