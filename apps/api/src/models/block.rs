#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "block_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    Active,
    Archived,
}

/// Organizational sector of contacts, curated by assigned users.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Block {
    pub id: Uuid,
    pub name: String,
    /// Unique short code; prefixes every contact id of the block.
    pub code: String,
    pub status: BlockStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "curator_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CuratorType {
    Primary,
    Backup,
}

/// Assignment linking a curator to a block. Unique per (block, user) and per
/// (block, curator_type).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BlockCurator {
    pub block_id: Uuid,
    pub user_id: Uuid,
    pub curator_type: CuratorType,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<Uuid>,
}
