//! Watchlist CRUD + scheduled-check tracking.
//!
//! Access is role-gated (admin / threat analyst) at the handler layer; these
//! functions assume the caller has already been authorized. Entries are not
//! block-scoped and not encrypted.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::audit::{self, AuditAction};
use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::watchlist::{MonitoringFrequency, RiskLevel, WatchlistItem};
use crate::patch::Patch;
use crate::watchlist::stats::{fold_counts, WatchlistStatistics};

/// Active entries, most recently updated first.
pub async fn list(pool: &PgPool) -> Result<Vec<WatchlistItem>, AppError> {
    Ok(sqlx::query_as(
        "SELECT * FROM watchlist_items WHERE active = TRUE ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WatchlistItem>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM watchlist_items WHERE id = $1 AND active = TRUE")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

fn snapshot(item: &WatchlistItem) -> serde_json::Value {
    json!({
        "full_name": item.full_name,
        "risk_level": item.risk_level,
        "monitoring_frequency": item.monitoring_frequency,
        "risk_sphere_id": item.risk_sphere_id,
        "next_check_date": item.next_check_date,
        "active": item.active,
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateWatchlistItem {
    pub full_name: String,
    pub role_status: Option<String>,
    pub risk_sphere_id: Option<i32>,
    pub threat_source: Option<String>,
    pub conflict_date: Option<DateTime<Utc>>,
    pub risk_level: RiskLevel,
    pub monitoring_frequency: MonitoringFrequency,
    pub next_check_date: Option<DateTime<Utc>>,
    pub dynamics_description: Option<String>,
}

pub async fn create(
    pool: &PgPool,
    actor: Actor,
    req: CreateWatchlistItem,
) -> Result<WatchlistItem, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name is required".to_string()));
    }

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();

    let row: WatchlistItem = sqlx::query_as(
        r#"
        INSERT INTO watchlist_items
            (id, full_name, role_status, risk_sphere_id, threat_source,
             conflict_date, risk_level, monitoring_frequency, last_check_date,
             next_check_date, dynamics_description, watch_owner_id, active,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, $9, $10, $11, TRUE, now(), now())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.full_name.trim())
    .bind(req.role_status.as_deref())
    .bind(req.risk_sphere_id)
    .bind(req.threat_source.as_deref())
    .bind(req.conflict_date)
    .bind(req.risk_level)
    .bind(req.monitoring_frequency)
    .bind(req.next_check_date)
    .bind(req.dynamics_description.as_deref())
    .bind(actor.user_id)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Create,
        "Watchlist",
        &id.to_string(),
        None,
        audit::snapshot(&snapshot(&row)),
    )
    .await?;

    tx.commit().await?;
    info!("Created watchlist entry {id}");
    Ok(row)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWatchlistItem {
    #[serde(default)]
    pub full_name: Patch<String>,
    #[serde(default)]
    pub role_status: Patch<String>,
    #[serde(default)]
    pub risk_sphere_id: Patch<i32>,
    #[serde(default)]
    pub threat_source: Patch<String>,
    #[serde(default)]
    pub conflict_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub risk_level: Patch<RiskLevel>,
    #[serde(default)]
    pub monitoring_frequency: Patch<MonitoringFrequency>,
    #[serde(default)]
    pub next_check_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub dynamics_description: Patch<String>,
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    actor: Actor,
    req: UpdateWatchlistItem,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let current: Option<WatchlistItem> =
        sqlx::query_as("SELECT * FROM watchlist_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(current) = current else {
        return Err(AppError::NotFound(format!("Watchlist entry {id} not found")));
    };
    let old = snapshot(&current);

    let full_name = match req.full_name {
        Patch::Absent => current.full_name.clone(),
        Patch::Null => {
            return Err(AppError::Validation("full_name cannot be null".to_string()));
        }
        Patch::Value(v) => {
            if v.trim().is_empty() {
                return Err(AppError::Validation("full_name is required".to_string()));
            }
            v
        }
    };

    let updated = WatchlistItem {
        full_name,
        role_status: req.role_status.resolve(current.role_status.clone()),
        risk_sphere_id: req.risk_sphere_id.resolve(current.risk_sphere_id),
        threat_source: req.threat_source.resolve(current.threat_source.clone()),
        conflict_date: req.conflict_date.resolve(current.conflict_date),
        risk_level: req
            .risk_level
            .resolve(Some(current.risk_level))
            .unwrap_or(current.risk_level),
        monitoring_frequency: req
            .monitoring_frequency
            .resolve(Some(current.monitoring_frequency))
            .unwrap_or(current.monitoring_frequency),
        next_check_date: req.next_check_date.resolve(current.next_check_date),
        dynamics_description: req
            .dynamics_description
            .resolve(current.dynamics_description.clone()),
        ..current.clone()
    };

    sqlx::query(
        r#"
        UPDATE watchlist_items SET
            full_name = $2, role_status = $3, risk_sphere_id = $4,
            threat_source = $5, conflict_date = $6, risk_level = $7,
            monitoring_frequency = $8, next_check_date = $9,
            dynamics_description = $10, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&updated.full_name)
    .bind(updated.role_status.as_deref())
    .bind(updated.risk_sphere_id)
    .bind(updated.threat_source.as_deref())
    .bind(updated.conflict_date)
    .bind(updated.risk_level)
    .bind(updated.monitoring_frequency)
    .bind(updated.next_check_date)
    .bind(updated.dynamics_description.as_deref())
    .execute(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Update,
        "Watchlist",
        &id.to_string(),
        Some(old),
        audit::snapshot(&snapshot(&updated)),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Soft delete, idempotent.
pub async fn delete(pool: &PgPool, id: Uuid, actor: Actor) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let full_name: Option<String> =
        sqlx::query_scalar("SELECT full_name FROM watchlist_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(full_name) = full_name else {
        return Err(AppError::NotFound(format!("Watchlist entry {id} not found")));
    };

    sqlx::query("UPDATE watchlist_items SET active = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Delete,
        "Watchlist",
        &id.to_string(),
        audit::snapshot(&json!({ "full_name": full_name })),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordCheck {
    /// Always applied: omitting it clears the schedule until the next
    /// check is planned.
    pub next_check_date: Option<DateTime<Utc>>,
    pub dynamics_update: Option<String>,
    pub new_risk_level: Option<RiskLevel>,
}

/// Records a completed check: `last_check_date` is always set to now,
/// `next_check_date` is always overwritten (possibly to null), dynamics and
/// risk level only when supplied. The audit entry rides the Update action;
/// Check is not a distinct audit action kind.
pub async fn record_check(
    pool: &PgPool,
    id: Uuid,
    actor: Actor,
    req: RecordCheck,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let current: Option<WatchlistItem> =
        sqlx::query_as("SELECT * FROM watchlist_items WHERE id = $1 AND active = TRUE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(current) = current else {
        return Err(AppError::NotFound(format!("Watchlist entry {id} not found")));
    };

    let risk_level = req.new_risk_level.unwrap_or(current.risk_level);
    let dynamics = req
        .dynamics_update
        .clone()
        .or(current.dynamics_description.clone());

    sqlx::query(
        r#"
        UPDATE watchlist_items SET
            last_check_date = now(), next_check_date = $2,
            dynamics_description = $3, risk_level = $4, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.next_check_date)
    .bind(dynamics.as_deref())
    .bind(risk_level)
    .execute(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Update,
        "Watchlist",
        &id.to_string(),
        Some(snapshot(&current)),
        audit::snapshot(&json!({
            "operation": "check",
            "next_check_date": req.next_check_date,
            "risk_level": risk_level,
        })),
    )
    .await?;

    tx.commit().await?;
    info!("Recorded check for watchlist entry {id}");
    Ok(())
}

/// Active entries whose scheduled check is due, most overdue first; among
/// equally-overdue entries the highest risk comes first. Entries without a
/// scheduled check never appear.
pub async fn get_due(pool: &PgPool) -> Result<Vec<WatchlistItem>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT * FROM watchlist_items
        WHERE active = TRUE AND next_check_date IS NOT NULL AND next_check_date <= now()
        ORDER BY next_check_date ASC, risk_level DESC
        "#,
    )
    .fetch_all(pool)
    .await?)
}

/// Aggregate counts over active entries.
pub async fn get_statistics(pool: &PgPool) -> Result<WatchlistStatistics, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM watchlist_items WHERE active = TRUE")
        .fetch_one(pool)
        .await?;

    let requires_check: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM watchlist_items
        WHERE active = TRUE AND next_check_date IS NOT NULL AND next_check_date <= now()
        "#,
    )
    .fetch_one(pool)
    .await?;

    let by_risk_level: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT risk_level::text, COUNT(*) FROM watchlist_items
        WHERE active = TRUE GROUP BY risk_level
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_risk_sphere: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT r.value, COUNT(*) FROM watchlist_items w
        LEFT JOIN reference_values r ON r.id = w.risk_sphere_id
        WHERE w.active = TRUE GROUP BY r.value
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_monitoring_frequency: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT monitoring_frequency::text, COUNT(*) FROM watchlist_items
        WHERE active = TRUE GROUP BY monitoring_frequency
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(WatchlistStatistics {
        total,
        requires_check,
        by_risk_level: fold_counts(by_risk_level),
        by_risk_sphere: fold_counts(by_risk_sphere),
        by_monitoring_frequency: fold_counts(by_monitoring_frequency),
    })
}
