//! Audit Recorder.
//!
//! Every mutation writes one `audit_log` row inside the caller's transaction,
//! so the entity write and its audit trail commit or roll back together.
//! Status changes additionally append an `influence_status_history` row in
//! the same transaction; a status-changing update produces exactly one
//! StatusChange entry and no Update entry.
//!
//! Snapshot serialization is best-effort: a failure is logged and the audit
//! row is written with an empty snapshot, never failing the parent operation.

use serde::Serialize;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

/// Kinds of auditable actions. Watchlist check recording maps onto `Update`;
/// there is no distinct Check action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
}

/// Serializes a snapshot for the audit log. Returns `None` (and warns) if the
/// value cannot be serialized; the audit row is still written.
pub fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Audit snapshot serialization failed, recording without it: {e}");
            None
        }
    }
}

/// Appends one audit-log row. `old` is empty for Create by convention.
pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    actor_id: Uuid,
    action: AuditAction,
    entity_type: &str,
    entity_id: &str,
    old: Option<Value>,
    new: Option<Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, user_id, action, entity_type, entity_id, old_values, new_values, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(old.unwrap_or_else(|| Value::Object(Default::default())))
    .bind(new.unwrap_or_else(|| Value::Object(Default::default())))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// History rows store statuses as strings; an absent status is the literal
/// `"null"`, not a SQL NULL, so "no previous status" survives round-trips.
pub fn status_string(status: Option<i32>) -> String {
    match status {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// Appends an `influence_status_history` row plus the paired StatusChange
/// audit row. Both ride the caller's transaction together with the contact
/// update itself, so a partial failure rolls all three back.
pub async fn record_status_change(
    tx: &mut Transaction<'_, Postgres>,
    actor_id: Uuid,
    contact_pk: Uuid,
    contact_id: &str,
    previous: Option<i32>,
    new_status: Option<i32>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO influence_status_history (id, contact_id, previous_status, new_status, changed_by, changed_at)
        VALUES ($1, $2, $3, $4, $5, now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(contact_pk)
    .bind(status_string(previous))
    .bind(status_string(new_status))
    .bind(actor_id)
    .execute(&mut **tx)
    .await?;

    let old = snapshot(&serde_json::json!({ "influence_status_id": previous }));
    let new = snapshot(&serde_json::json!({
        "contact_id": contact_id,
        "influence_status_id": new_status,
    }));
    record(
        tx,
        actor_id,
        AuditAction::StatusChange,
        "Contact",
        &contact_pk.to_string(),
        old,
        new,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_sentinel() {
        assert_eq!(status_string(None), "null");
        assert_eq!(status_string(Some(0)), "0");
        assert_eq!(status_string(Some(2)), "2");
    }

    #[test]
    fn test_snapshot_of_plain_struct() {
        #[derive(Serialize)]
        struct S {
            contact_id: &'static str,
        }
        let v = snapshot(&S { contact_id: "GOV-001" }).unwrap();
        assert_eq!(v["contact_id"], "GOV-001");
    }
}
