//! Baby profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baby {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub gender: Option<String>,
    pub birth_weight: f64,
    #[serde(default)]
    pub birth_height: Option<f64>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BabyCreateRequest {
    pub name: String,
    pub birth_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub birth_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<Vec<String>>,
}

/// Partial update; absent fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BabyUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<Vec<String>>,
}
