#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "risk_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "monitoring_frequency", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MonitoringFrequency {
    Weekly,
    Monthly,
    Quarterly,
    AdHoc,
}

/// Threat-watchlist entry. Independent of the block/contact access model and
/// deliberately unencrypted; access is gated by role at the handler layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub full_name: String,
    pub role_status: Option<String>,
    pub risk_sphere_id: Option<i32>,
    pub threat_source: Option<String>,
    pub conflict_date: Option<DateTime<Utc>>,
    pub risk_level: RiskLevel,
    pub monitoring_frequency: MonitoringFrequency,
    pub last_check_date: Option<DateTime<Utc>>,
    pub next_check_date: Option<DateTime<Utc>>,
    pub dynamics_description: Option<String>,
    pub watch_owner_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
