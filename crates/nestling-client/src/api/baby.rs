//! Baby profile endpoints.

use std::sync::Arc;

use nestling_models::baby::{Baby, BabyCreateRequest, BabyUpdateRequest};

use crate::error::Result;
use crate::gateway::Gateway;

#[derive(Clone)]
pub struct BabyApi {
    gateway: Arc<Gateway>,
}

impl BabyApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Baby>> {
        self.gateway.get_json("/api/v1/babies").await
    }

    pub async fn get(&self, baby_id: &str) -> Result<Baby> {
        self.gateway
            .get_json(&format!("/api/v1/babies/{baby_id}"))
            .await
    }

    pub async fn create(&self, request: &BabyCreateRequest) -> Result<Baby> {
        self.gateway.post_json("/api/v1/babies", request).await
    }

    pub async fn update(&self, baby_id: &str, request: &BabyUpdateRequest) -> Result<Baby> {
        self.gateway
            .put_json(&format!("/api/v1/babies/{baby_id}"), request)
            .await
    }

    pub async fn delete(&self, baby_id: &str) -> Result<()> {
        self.gateway
            .delete(&format!("/api/v1/babies/{baby_id}"))
            .await
    }
}
