//! Accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may use administrative endpoints.
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

/// Successful signup or login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
