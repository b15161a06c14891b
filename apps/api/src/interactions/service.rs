//! Interaction CRUD. Creates and updates cascade touch dates onto the parent
//! contact and can carry an embedded status-change payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access;
use crate::audit::{self, AuditAction};
use crate::auth::Actor;
use crate::crypto::FieldCipher;
use crate::errors::AppError;
use crate::interactions::status_change;
use crate::models::contact::Contact;
use crate::models::interaction::Interaction;
use crate::patch::Patch;

/// Caller-facing projection joined with the parent contact, comment and
/// contact name decrypted.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionView {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub contact_ref: String,
    pub contact_name: String,
    pub interaction_date: DateTime<Utc>,
    pub interaction_type_id: Option<i32>,
    pub interaction_result_id: Option<i32>,
    pub comment: String,
    pub curator_id: Uuid,
    pub next_touch_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    id: Uuid,
    contact_id: Uuid,
    contact_ref: String,
    contact_name: crate::crypto::EncryptedString,
    interaction_date: DateTime<Utc>,
    interaction_type_id: Option<i32>,
    interaction_result_id: Option<i32>,
    comment: crate::crypto::EncryptedString,
    curator_id: Uuid,
    next_touch_date: Option<DateTime<Utc>>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn to_view(cipher: &FieldCipher, r: JoinedRow) -> Result<InteractionView, AppError> {
    Ok(InteractionView {
        id: r.id,
        contact_id: r.contact_id,
        contact_ref: r.contact_ref,
        contact_name: cipher.decrypt(&r.contact_name)?,
        interaction_date: r.interaction_date,
        interaction_type_id: r.interaction_type_id,
        interaction_result_id: r.interaction_result_id,
        comment: cipher.decrypt(&r.comment)?,
        curator_id: r.curator_id,
        next_touch_date: r.next_touch_date,
        active: r.active,
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

const JOINED_SELECT: &str = r#"
    SELECT i.id, i.contact_id, c.contact_id AS contact_ref,
           c.full_name AS contact_name, i.interaction_date,
           i.interaction_type_id, i.interaction_result_id, i.comment,
           i.curator_id, i.next_touch_date, i.active, i.created_at, i.updated_at
    FROM interactions i
    JOIN contacts c ON c.id = i.contact_id
    JOIN blocks b ON b.id = c.block_id
"#;

#[derive(Debug, Deserialize)]
pub struct CreateInteraction {
    pub contact_id: Uuid,
    pub interaction_date: Option<DateTime<Utc>>,
    pub interaction_type_id: Option<i32>,
    pub interaction_result_id: Option<i32>,
    #[serde(default)]
    pub comment: String,
    /// Raw JSON string, e.g. `{"newStatus": "2"}`. Malformed input is
    /// warned about and skipped.
    pub status_change_json: Option<String>,
    pub next_touch_date: Option<DateTime<Utc>>,
}

/// Creates an interaction. Always bumps the parent contact's
/// `last_interaction_date`; overwrites its `next_touch_date` when supplied;
/// applies an embedded status change when one parses.
pub async fn create(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
    req: CreateInteraction,
) -> Result<Uuid, AppError> {
    let contact: Option<Contact> = sqlx::query_as("SELECT * FROM contacts WHERE id = $1")
        .bind(req.contact_id)
        .fetch_optional(pool)
        .await?;
    let Some(contact) = contact else {
        return Err(AppError::Validation(format!(
            "Contact {} not found",
            req.contact_id
        )));
    };

    if !access::can_access_block(pool, contact.block_id, actor).await? {
        return Err(AppError::Forbidden);
    }

    let date = req.interaction_date.unwrap_or_else(Utc::now);
    let comment = cipher.encrypt(&req.comment);
    let payload = parse_optional_payload(req.status_change_json.as_deref());

    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO interactions
            (id, contact_id, interaction_date, interaction_type_id,
             interaction_result_id, comment, status_change, curator_id,
             next_touch_date, active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, now(), now())
        "#,
    )
    .bind(id)
    .bind(contact.id)
    .bind(date)
    .bind(req.interaction_type_id)
    .bind(req.interaction_result_id)
    .bind(&comment)
    .bind(payload.as_ref())
    .bind(actor.user_id)
    .bind(req.next_touch_date)
    .execute(&mut *tx)
    .await?;

    propagate_touch_dates(&mut tx, contact.id, date, req.next_touch_date, actor.user_id).await?;

    if let Some(payload) = &payload {
        apply_status_change(&mut tx, actor, &contact, payload).await?;
    }

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Create,
        "Interaction",
        &id.to_string(),
        None,
        audit::snapshot(&json!({
            "contact_id": contact.contact_id,
            "interaction_date": date,
            "interaction_type_id": req.interaction_type_id,
        })),
    )
    .await?;

    tx.commit().await?;
    info!("Logged interaction {id} for contact {}", contact.contact_id);
    Ok(id)
}

fn parse_optional_payload(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    match status_change::parse_payload(raw) {
        Some(v) => Some(v),
        None => {
            warn!("Malformed status-change payload skipped: {raw}");
            None
        }
    }
}

/// Unconditionally bumps the parent's `last_interaction_date`; overwrites
/// `next_touch_date` only when one was supplied.
async fn propagate_touch_dates(
    tx: &mut Transaction<'_, Postgres>,
    contact_pk: Uuid,
    date: DateTime<Utc>,
    next_touch: Option<DateTime<Utc>>,
    actor_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE contacts SET
            last_interaction_date = $2,
            next_touch_date = COALESCE($3, next_touch_date),
            updated_at = now(), updated_by = $4
        WHERE id = $1
        "#,
    )
    .bind(contact_pk)
    .bind(date)
    .bind(next_touch)
    .bind(actor_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Applies a parsed status-change payload: contact status update, history
/// append and StatusChange audit row, all in the caller's transaction. A
/// payload without a usable `newStatus` is warned about and skipped.
async fn apply_status_change(
    tx: &mut Transaction<'_, Postgres>,
    actor: Actor,
    contact: &Contact,
    payload: &Value,
) -> Result<(), AppError> {
    let Some(new_status) = status_change::new_status(payload) else {
        warn!(
            "Status-change payload without usable newStatus skipped for contact {}",
            contact.contact_id
        );
        return Ok(());
    };

    sqlx::query("UPDATE contacts SET influence_status_id = $2, updated_at = now(), updated_by = $3 WHERE id = $1")
        .bind(contact.id)
        .bind(new_status)
        .bind(actor.user_id)
        .execute(&mut **tx)
        .await?;

    audit::record_status_change(
        tx,
        actor.user_id,
        contact.id,
        &contact.contact_id,
        contact.influence_status_id,
        Some(new_status),
    )
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInteraction {
    #[serde(default)]
    pub interaction_date: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub interaction_type_id: Patch<i32>,
    #[serde(default)]
    pub interaction_result_id: Patch<i32>,
    #[serde(default)]
    pub comment: Patch<String>,
    #[serde(default)]
    pub next_touch_date: Patch<DateTime<Utc>>,
    pub status_change_json: Option<String>,
}

/// Applies an update with the usual "if provided, overwrite" semantics, then
/// re-propagates touch dates onto the parent contact.
pub async fn update(
    pool: &PgPool,
    cipher: &FieldCipher,
    id: Uuid,
    actor: Actor,
    req: UpdateInteraction,
) -> Result<(), AppError> {
    let existing = fetch_accessible(pool, id, actor).await?;
    let contact: Contact = sqlx::query_as("SELECT * FROM contacts WHERE id = $1")
        .bind(existing.contact_id)
        .fetch_one(pool)
        .await?;

    let payload = parse_optional_payload(req.status_change_json.as_deref());

    let mut tx = pool.begin().await?;

    let date = req.interaction_date.resolve(Some(existing.interaction_date))
        .unwrap_or(existing.interaction_date);
    let comment = match req.comment {
        Patch::Absent => existing.comment.clone(),
        Patch::Null => cipher.encrypt(""),
        Patch::Value(v) => cipher.encrypt(&v),
    };
    let next_touch = req.next_touch_date.resolve(existing.next_touch_date);
    let type_id = req.interaction_type_id.resolve(existing.interaction_type_id);
    let result_id = req
        .interaction_result_id
        .resolve(existing.interaction_result_id);

    sqlx::query(
        r#"
        UPDATE interactions SET
            interaction_date = $2, interaction_type_id = $3,
            interaction_result_id = $4, comment = $5, next_touch_date = $6,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(date)
    .bind(type_id)
    .bind(result_id)
    .bind(&comment)
    .bind(next_touch)
    .execute(&mut *tx)
    .await?;

    propagate_touch_dates(&mut tx, contact.id, date, next_touch, actor.user_id).await?;

    if let Some(payload) = &payload {
        apply_status_change(&mut tx, actor, &contact, payload).await?;
    }

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Update,
        "Interaction",
        &id.to_string(),
        audit::snapshot(&json!({
            "interaction_date": existing.interaction_date,
            "interaction_type_id": existing.interaction_type_id,
            "interaction_result_id": existing.interaction_result_id,
            "next_touch_date": existing.next_touch_date,
        })),
        audit::snapshot(&json!({
            "interaction_date": date,
            "interaction_type_id": type_id,
            "interaction_result_id": result_id,
            "next_touch_date": next_touch,
        })),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Soft delete, idempotent like contact deletion.
pub async fn delete(pool: &PgPool, id: Uuid, actor: Actor) -> Result<(), AppError> {
    let existing = fetch_accessible(pool, id, actor).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE interactions SET active = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Delete,
        "Interaction",
        &id.to_string(),
        audit::snapshot(&json!({
            "contact_id": existing.contact_id,
            "interaction_date": existing.interaction_date,
        })),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

async fn fetch_accessible(pool: &PgPool, id: Uuid, actor: Actor) -> Result<Interaction, AppError> {
    let row: Option<Interaction> = sqlx::query_as("SELECT * FROM interactions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Err(AppError::NotFound(format!("Interaction {id} not found")));
    };
    if !access::can_access_contact(pool, row.contact_id, actor).await? {
        return Err(AppError::Forbidden);
    }
    Ok(row)
}

/// Read paths never confirm a contact the caller cannot see: lack of access
/// reads the same as absence.
fn visible_or_not_found(allowed: bool, contact_pk: Uuid) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Contact {contact_pk} not found")))
    }
}

/// Active interactions for one contact, newest first. An inaccessible
/// contact is reported as missing, matching the contact read path.
pub async fn list_for_contact(
    pool: &PgPool,
    cipher: &FieldCipher,
    contact_pk: Uuid,
    actor: Actor,
) -> Result<Vec<InteractionView>, AppError> {
    let allowed = access::can_access_contact(pool, contact_pk, actor).await?;
    visible_or_not_found(allowed, contact_pk)?;

    let rows: Vec<JoinedRow> = sqlx::query_as(&format!(
        r#"
        {JOINED_SELECT}
        WHERE i.active = TRUE AND i.contact_id = $1
        ORDER BY i.interaction_date DESC
        "#
    ))
    .bind(contact_pk)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|r| to_view(cipher, r)).collect()
}

/// Most recent active interactions in the caller's scope, capped at `count`.
pub async fn get_recent(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
    count: i64,
) -> Result<Vec<InteractionView>, AppError> {
    let scope = access::resolve_scope(pool, actor).await?;
    if scope.is_empty() {
        return Ok(vec![]);
    }

    let rows: Vec<JoinedRow> = sqlx::query_as(&format!(
        r#"
        {JOINED_SELECT}
        WHERE i.active = TRUE
          AND c.active = TRUE
          AND b.status = 'active'
          AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
        ORDER BY i.interaction_date DESC
        LIMIT $2
        "#
    ))
    .bind(scope.as_param())
    .bind(count)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|r| to_view(cipher, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_reports_inaccessible_contact_as_missing() {
        let id = Uuid::new_v4();
        assert!(visible_or_not_found(true, id).is_ok());
        let err = visible_or_not_found(false, id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
