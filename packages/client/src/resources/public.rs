//! `public/` endpoints. These never send an `Authorization` header.

use std::sync::Arc;

use serde_json::Value;

use super::resource_dispatcher;
use crate::context::ApiContext;
use crate::dispatcher::{data_field, segment, Dispatcher, RequestOptions};
use crate::error::ApiError;

#[derive(Clone)]
pub struct GroupPublicApi {
    http: Dispatcher,
}

impl GroupPublicApi {
    pub fn new(ctx: Arc<ApiContext>) -> Self {
        Self {
            http: resource_dispatcher(ctx, "public/"),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.http
    }

    pub async fn get_public_community(&self, community_id: &str) -> Result<Value, ApiError> {
        self.fetch(format!("communities/{}", segment(community_id))).await
    }

    pub async fn get_public_group(&self, group_id: &str) -> Result<Value, ApiError> {
        self.fetch(format!("groups/{}", segment(group_id))).await
    }

    async fn fetch(&self, path: String) -> Result<Value, ApiError> {
        let options = RequestOptions::new().path(path).no_auth();
        Ok(data_field(self.http.do_get(options).await?))
    }
}
