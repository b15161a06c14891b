#![allow(dead_code)]

use serde::Serialize;
use sqlx::FromRow;

/// Read-mostly lookup value, grouped by category (influence_status,
/// influence_type, communication_channel, contact_source, interaction_type,
/// interaction_result, risk_sphere, organization, file_extensions).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReferenceValue {
    pub id: i32,
    pub category: String,
    pub code: String,
    pub value: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}
