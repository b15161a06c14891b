//! Dashboard Aggregator: read-only rollups reusing the same block scoping as
//! the entity services, so a dashboard never shows what a listing would hide.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::access;
use crate::audit::AuditAction;
use crate::auth::Actor;
use crate::crypto::FieldCipher;
use crate::dashboard::transitions::{transition_key, TransitionCount};
use crate::errors::AppError;
use crate::interactions::service::{self as interactions, InteractionView};
use crate::watchlist::stats::fold_counts;

// ────────────────────────────────────────────────────────────────────────────
// Curator view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct OverdueContact {
    pub id: Uuid,
    pub contact_id: String,
    pub full_name: String,
    pub next_touch_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CuratorDashboard {
    pub total_contacts: i64,
    pub interactions_last_30_days: i64,
    /// Average over contacts with at least one interaction; `None` when no
    /// contact in scope has any.
    pub avg_days_since_last_interaction: Option<f64>,
    pub overdue_contacts: i64,
    pub most_overdue: Vec<OverdueContact>,
    pub recent_interactions: Vec<InteractionView>,
    pub by_influence_status: BTreeMap<String, i64>,
    pub by_interaction_type: BTreeMap<String, i64>,
}

impl CuratorDashboard {
    fn empty() -> Self {
        Self {
            total_contacts: 0,
            interactions_last_30_days: 0,
            avg_days_since_last_interaction: None,
            overdue_contacts: 0,
            most_overdue: vec![],
            recent_interactions: vec![],
            by_influence_status: BTreeMap::new(),
            by_interaction_type: BTreeMap::new(),
        }
    }
}

const SCOPED_CONTACTS: &str = r#"
    FROM contacts c
    JOIN blocks b ON b.id = c.block_id
    WHERE c.active = TRUE
      AND b.status = 'active'
      AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
"#;

/// Builds the curator view. A curator with zero assigned blocks gets an
/// all-zero structure, never an error.
pub async fn curator_view(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
) -> Result<CuratorDashboard, AppError> {
    let scope = access::resolve_scope(pool, actor).await?;
    if scope.is_empty() {
        return Ok(CuratorDashboard::empty());
    }
    let scope_param = scope.as_param();

    let total_contacts: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) {SCOPED_CONTACTS}"))
            .bind(scope_param)
            .fetch_one(pool)
            .await?;

    let interactions_last_30_days: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*)
        FROM interactions i
        JOIN contacts c ON c.id = i.contact_id
        JOIN blocks b ON b.id = c.block_id
        WHERE i.active = TRUE
          AND c.active = TRUE
          AND b.status = 'active'
          AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
          AND i.interaction_date >= now() - interval '30 days'
        "#
    ))
    .bind(scope_param)
    .fetch_one(pool)
    .await?;

    let avg_days_since_last_interaction: Option<f64> = sqlx::query_scalar(&format!(
        r#"
        SELECT (AVG(EXTRACT(EPOCH FROM (now() - c.last_interaction_date)) / 86400.0))::float8
        {SCOPED_CONTACTS}
          AND c.last_interaction_date IS NOT NULL
        "#
    ))
    .bind(scope_param)
    .fetch_one(pool)
    .await?;

    let overdue_contacts: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) {SCOPED_CONTACTS} AND c.next_touch_date < now()"
    ))
    .bind(scope_param)
    .fetch_one(pool)
    .await?;

    let overdue_rows: Vec<(Uuid, String, crate::crypto::EncryptedString, DateTime<Utc>)> =
        sqlx::query_as(&format!(
            r#"
            SELECT c.id, c.contact_id, c.full_name, c.next_touch_date
            {SCOPED_CONTACTS}
              AND c.next_touch_date < now()
            ORDER BY c.next_touch_date ASC
            LIMIT 5
            "#
        ))
        .bind(scope_param)
        .fetch_all(pool)
        .await?;
    let most_overdue = overdue_rows
        .into_iter()
        .map(|(id, contact_id, name, next_touch_date)| {
            Ok(OverdueContact {
                id,
                contact_id,
                full_name: cipher.decrypt(&name)?,
                next_touch_date,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let recent_interactions = interactions::get_recent(pool, cipher, actor, 5).await?;

    let by_influence_status: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT r.value, COUNT(*)
        FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        LEFT JOIN reference_values r ON r.id = c.influence_status_id
        WHERE c.active = TRUE
          AND b.status = 'active'
          AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
        GROUP BY r.value
        "#,
    )
    .bind(scope_param)
    .fetch_all(pool)
    .await?;

    let by_interaction_type: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT r.value, COUNT(*)
        FROM interactions i
        JOIN contacts c ON c.id = i.contact_id
        JOIN blocks b ON b.id = c.block_id
        LEFT JOIN reference_values r ON r.id = i.interaction_type_id
        WHERE i.active = TRUE
          AND c.active = TRUE
          AND b.status = 'active'
          AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
        GROUP BY r.value
        "#,
    )
    .bind(scope_param)
    .fetch_all(pool)
    .await?;

    Ok(CuratorDashboard {
        total_contacts,
        interactions_last_30_days,
        avg_days_since_last_interaction,
        overdue_contacts,
        most_overdue,
        recent_interactions,
        by_influence_status: fold_counts(by_influence_status),
        by_interaction_type: fold_counts(by_interaction_type),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Admin view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CuratorActivity {
    pub user_id: Uuid,
    pub login: String,
    pub interactions: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntryView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    pub old_values: Value,
    pub new_values: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MonthDelta {
    pub this_month: i64,
    pub previous_month: i64,
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_contacts: i64,
    pub total_interactions: i64,
    pub total_blocks: i64,
    pub total_users: i64,
    pub contacts_month_over_month: MonthDelta,
    pub interactions_month_over_month: MonthDelta,
    pub contacts_by_block: BTreeMap<String, i64>,
    pub contacts_by_status: BTreeMap<String, i64>,
    pub interactions_by_type: BTreeMap<String, i64>,
    pub top_curators: Vec<CuratorActivity>,
    pub top_transitions: Vec<TransitionCount>,
    pub recent_audit: Vec<AuditEntryView>,
}

async fn month_delta(pool: &PgPool, table: &str, date_column: &str) -> Result<MonthDelta, AppError> {
    let (this_month, previous_month): (i64, i64) = sqlx::query_as(&format!(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE {date_column} >= date_trunc('month', now())),
            COUNT(*) FILTER (WHERE {date_column} >= date_trunc('month', now()) - interval '1 month'
                               AND {date_column} <  date_trunc('month', now()))
        FROM {table}
        WHERE active = TRUE
        "#
    ))
    .fetch_one(pool)
    .await?;

    Ok(MonthDelta {
        this_month,
        previous_month,
        delta: this_month - previous_month,
    })
}

/// Builds the system-wide admin view.
pub async fn admin_view(pool: &PgPool) -> Result<AdminDashboard, AppError> {
    let total_contacts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE active = TRUE")
            .fetch_one(pool)
            .await?;
    let total_interactions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM interactions WHERE active = TRUE")
            .fetch_one(pool)
            .await?;
    let total_blocks: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM blocks WHERE status = 'active'")
            .fetch_one(pool)
            .await?;
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE active = TRUE")
        .fetch_one(pool)
        .await?;

    let contacts_month_over_month = month_delta(pool, "contacts", "created_at").await?;
    let interactions_month_over_month =
        month_delta(pool, "interactions", "interaction_date").await?;

    let contacts_by_block: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT b.name, COUNT(*) FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        WHERE c.active = TRUE
        GROUP BY b.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let contacts_by_status: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT r.value, COUNT(*) FROM contacts c
        LEFT JOIN reference_values r ON r.id = c.influence_status_id
        WHERE c.active = TRUE
        GROUP BY r.value
        "#,
    )
    .fetch_all(pool)
    .await?;

    let interactions_by_type: Vec<(Option<String>, i64)> = sqlx::query_as(
        r#"
        SELECT r.value, COUNT(*) FROM interactions i
        LEFT JOIN reference_values r ON r.id = i.interaction_type_id
        WHERE i.active = TRUE
        GROUP BY r.value
        "#,
    )
    .fetch_all(pool)
    .await?;

    let top_curators: Vec<CuratorActivity> = sqlx::query_as(
        r#"
        SELECT i.curator_id AS user_id, u.login, COUNT(*) AS interactions
        FROM interactions i
        JOIN users u ON u.id = i.curator_id
        WHERE i.active = TRUE AND i.interaction_date >= now() - interval '30 days'
        GROUP BY i.curator_id, u.login
        ORDER BY COUNT(*) DESC
        LIMIT 5
        "#,
    )
    .fetch_all(pool)
    .await?;

    let transition_rows: Vec<(String, String, i64)> = sqlx::query_as(
        r#"
        SELECT previous_status, new_status, COUNT(*)
        FROM influence_status_history
        WHERE changed_at >= now() - interval '90 days'
        GROUP BY previous_status, new_status
        ORDER BY COUNT(*) DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await?;
    let top_transitions = transition_rows
        .into_iter()
        .map(|(prev, new, count)| TransitionCount {
            key: transition_key(&prev, &new),
            count,
        })
        .collect();

    let recent_audit: Vec<AuditEntryView> = sqlx::query_as(
        r#"
        SELECT a.id, a.user_id, u.login, a.action, a.entity_type, a.entity_id,
               a.old_values, a.new_values, a.created_at
        FROM audit_log a
        JOIN users u ON u.id = a.user_id
        ORDER BY a.created_at DESC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(AdminDashboard {
        total_contacts,
        total_interactions,
        total_blocks,
        total_users,
        contacts_month_over_month,
        interactions_month_over_month,
        contacts_by_block: fold_counts(contacts_by_block),
        contacts_by_status: fold_counts(contacts_by_status),
        interactions_by_type: fold_counts(interactions_by_type),
        top_curators,
        top_transitions,
        recent_audit,
    })
}
