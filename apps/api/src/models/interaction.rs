#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::crypto::EncryptedString;

/// Logged touch with a contact. `comment` is ciphertext.
#[derive(Debug, Clone, FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub interaction_date: DateTime<Utc>,
    pub interaction_type_id: Option<i32>,
    pub interaction_result_id: Option<i32>,
    pub comment: EncryptedString,
    /// Raw status-change payload as submitted, kept for traceability.
    pub status_change: Option<Value>,
    pub curator_id: Uuid,
    pub next_touch_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only influence-status transition record. Statuses are strings; an
/// absent status is stored as the literal `"null"`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InfluenceStatusHistory {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub previous_status: String,
    pub new_status: String,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
}
