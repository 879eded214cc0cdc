//! Account endpoints.

use std::sync::Arc;

use nestling_models::user::{AuthResponse, LoginRequest, SignupRequest, User};

use crate::error::Result;
use crate::gateway::Gateway;

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Create an account and persist the resulting session.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self.gateway.post_json("/api/v1/auth/signup", request).await?;
        self.persist(&response);
        Ok(response)
    }

    /// Authenticate and persist the resulting session.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self.gateway.post_json("/api/v1/auth/login", request).await?;
        self.persist(&response);
        Ok(response)
    }

    /// Drop the local session. The refresh cookie is server-managed and
    /// expires on its own.
    pub fn logout(&self) {
        self.gateway.session().clear();
    }

    pub async fn me(&self) -> Result<User> {
        self.gateway.get_json("/api/v1/me").await
    }

    fn persist(&self, response: &AuthResponse) {
        self.gateway
            .session()
            .set_session(response.user.clone(), response.access_token.clone());
    }
}
