#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::crypto::EncryptedString;

/// Contact row as persisted. `full_name` and `notes` are ciphertext; the row
/// is never serialized directly — responses go through a decrypting view in
/// the contacts module.
#[derive(Debug, Clone, FromRow)]
pub struct Contact {
    pub id: Uuid,
    /// Externally visible id, `{BLOCK_CODE}-{NNN}`. Unique and immutable.
    pub contact_id: String,
    pub block_id: Uuid,
    pub full_name: EncryptedString,
    pub organization_id: Option<i32>,
    pub position: Option<String>,
    pub influence_status_id: Option<i32>,
    pub influence_type_id: Option<i32>,
    pub communication_channel_id: Option<i32>,
    pub source_id: Option<i32>,
    pub notes: EncryptedString,
    pub responsible_curator_id: Option<Uuid>,
    pub next_touch_date: Option<DateTime<Utc>>,
    pub last_interaction_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}
