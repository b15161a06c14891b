#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::audit::AuditAction;

/// Append-only audit trail row. Snapshots are stored as plain JSON.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    pub old_values: Value,
    pub new_values: Value,
    pub created_at: DateTime<Utc>,
}
