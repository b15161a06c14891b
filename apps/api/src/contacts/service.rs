//! Contact CRUD with block scoping, field encryption and paired audit rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::access;
use crate::audit::{self, AuditAction};
use crate::auth::Actor;
use crate::contacts::contact_id::next_contact_id;
use crate::crypto::FieldCipher;
use crate::errors::AppError;
use crate::models::block::Block;
use crate::models::contact::Contact;
use crate::patch::Patch;

/// Decrypted, caller-facing projection of a contact row.
#[derive(Debug, Clone, Serialize)]
pub struct ContactView {
    pub id: Uuid,
    pub contact_id: String,
    pub block_id: Uuid,
    pub full_name: String,
    pub organization_id: Option<i32>,
    pub position: Option<String>,
    pub influence_status_id: Option<i32>,
    pub influence_type_id: Option<i32>,
    pub communication_channel_id: Option<i32>,
    pub source_id: Option<i32>,
    pub notes: String,
    pub responsible_curator_id: Option<Uuid>,
    pub next_touch_date: Option<DateTime<Utc>>,
    pub last_interaction_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

fn to_view(cipher: &FieldCipher, c: Contact) -> Result<ContactView, AppError> {
    Ok(ContactView {
        id: c.id,
        contact_id: c.contact_id,
        block_id: c.block_id,
        full_name: cipher.decrypt(&c.full_name)?,
        organization_id: c.organization_id,
        position: c.position,
        influence_status_id: c.influence_status_id,
        influence_type_id: c.influence_type_id,
        communication_channel_id: c.communication_channel_id,
        source_id: c.source_id,
        notes: cipher.decrypt(&c.notes)?,
        responsible_curator_id: c.responsible_curator_id,
        next_touch_date: c.next_touch_date,
        last_interaction_date: c.last_interaction_date,
        active: c.active,
        created_at: c.created_at,
        updated_at: c.updated_at,
        updated_by: c.updated_by,
    })
}

/// Scalar (non-encrypted) fields snapshotted into the audit trail. Encrypted
/// personal fields are deliberately excluded so plaintext never reaches
/// `audit_log`.
fn scalar_snapshot(c: &Contact) -> serde_json::Value {
    json!({
        "contact_id": c.contact_id,
        "block_id": c.block_id,
        "organization_id": c.organization_id,
        "position": c.position,
        "influence_status_id": c.influence_status_id,
        "influence_type_id": c.influence_type_id,
        "communication_channel_id": c.communication_channel_id,
        "source_id": c.source_id,
        "responsible_curator_id": c.responsible_curator_id,
        "next_touch_date": c.next_touch_date,
        "active": c.active,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactFilters {
    pub block_id: Option<Uuid>,
    pub search: Option<String>,
    pub influence_status_id: Option<i32>,
    pub influence_type_id: Option<i32>,
    pub organization_id: Option<i32>,
}

const LIST_WHERE: &str = r#"
    c.active = TRUE
    AND b.status = 'active'
    AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
    AND ($2::uuid IS NULL OR c.block_id = $2)
    AND ($3::text IS NULL OR c.contact_id ILIKE '%' || $3 || '%' OR c.position ILIKE '%' || $3 || '%')
    AND ($4::int IS NULL OR c.influence_status_id = $4)
    AND ($5::int IS NULL OR c.influence_type_id = $5)
    AND ($6::int IS NULL OR c.organization_id = $6)
"#;

/// Filtered, paginated listing. Inactive contacts and archived blocks are
/// always excluded; curators additionally see only their assigned blocks.
pub async fn list(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
    filters: &ContactFilters,
    page: u32,
    page_size: u32,
) -> Result<(Vec<ContactView>, i64), AppError> {
    let scope = access::resolve_scope(pool, actor).await?;
    if scope.is_empty() {
        return Ok((vec![], 0));
    }

    let page = page.max(1);
    let offset = (page - 1) as i64 * page_size as i64;

    let rows: Vec<Contact> = sqlx::query_as(&format!(
        r#"
        SELECT c.* FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        WHERE {LIST_WHERE}
        ORDER BY c.updated_at DESC
        LIMIT $7 OFFSET $8
        "#
    ))
    .bind(scope.as_param())
    .bind(filters.block_id)
    .bind(filters.search.as_deref())
    .bind(filters.influence_status_id)
    .bind(filters.influence_type_id)
    .bind(filters.organization_id)
    .bind(page_size as i64)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        WHERE {LIST_WHERE}
        "#
    ))
    .bind(scope.as_param())
    .bind(filters.block_id)
    .bind(filters.search.as_deref())
    .bind(filters.influence_status_id)
    .bind(filters.influence_type_id)
    .bind(filters.organization_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|c| to_view(cipher, c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

/// Fetches one contact. Returns `None` both when the contact does not exist
/// and when the caller lacks access, so existence is never confirmed to an
/// unauthorized curator.
pub async fn get_by_id(
    pool: &PgPool,
    cipher: &FieldCipher,
    id: Uuid,
    actor: Actor,
) -> Result<Option<ContactView>, AppError> {
    let row: Option<Contact> = sqlx::query_as(
        r#"
        SELECT c.* FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        WHERE c.id = $1 AND c.active = TRUE AND b.status = 'active'
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if !access::can_access_block(pool, row.block_id, actor).await? {
        return Ok(None);
    }

    Ok(Some(to_view(cipher, row)?))
}

#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub block_id: Uuid,
    pub full_name: String,
    pub organization_id: Option<i32>,
    pub position: Option<String>,
    pub influence_status_id: Option<i32>,
    pub influence_type_id: Option<i32>,
    pub communication_channel_id: Option<i32>,
    pub source_id: Option<i32>,
    #[serde(default)]
    pub notes: String,
    pub responsible_curator_id: Option<Uuid>,
    pub next_touch_date: Option<DateTime<Utc>>,
}

/// Creates a contact in an accessible block, allocating the next contact id
/// and encrypting personal fields before anything touches the store.
pub async fn create(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
    req: CreateContact,
) -> Result<ContactView, AppError> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name is required".to_string()));
    }

    let block: Option<Block> = sqlx::query_as("SELECT * FROM blocks WHERE id = $1")
        .bind(req.block_id)
        .fetch_optional(pool)
        .await?;
    let Some(block) = block else {
        return Err(AppError::Validation(format!(
            "Block {} not found",
            req.block_id
        )));
    };

    if !access::can_access_block(pool, block.id, actor).await? {
        return Err(AppError::Forbidden);
    }

    let full_name = cipher.encrypt(&req.full_name);
    let notes = cipher.encrypt(&req.notes);

    let mut tx = pool.begin().await?;

    let contact_id = generate_contact_id(&mut tx, &block).await?;
    let id = Uuid::new_v4();

    let row: Contact = sqlx::query_as(
        r#"
        INSERT INTO contacts
            (id, contact_id, block_id, full_name, organization_id, position,
             influence_status_id, influence_type_id, communication_channel_id,
             source_id, notes, responsible_curator_id, next_touch_date,
             last_interaction_date, active, created_at, updated_at, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                NULL, TRUE, now(), now(), $14)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&contact_id)
    .bind(block.id)
    .bind(&full_name)
    .bind(req.organization_id)
    .bind(req.position.as_deref())
    .bind(req.influence_status_id)
    .bind(req.influence_type_id)
    .bind(req.communication_channel_id)
    .bind(req.source_id)
    .bind(&notes)
    .bind(req.responsible_curator_id)
    .bind(req.next_touch_date)
    .bind(actor.user_id)
    .fetch_one(&mut *tx)
    .await?;

    let new = audit::snapshot(&json!({
        "contact_id": contact_id,
        "influence_status_id": req.influence_status_id,
        "block_id": block.id,
    }));
    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Create,
        "Contact",
        &id.to_string(),
        None,
        new,
    )
    .await?;

    tx.commit().await?;
    info!("Created contact {contact_id} in block {}", block.code);

    Ok(to_view(cipher, row)?)
}

/// Allocates the next contact id for a block inside the caller's transaction.
/// The highest existing suffix is resolved numerically, not lexicographically.
pub async fn generate_contact_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    block: &Block,
) -> Result<String, AppError> {
    let highest: Option<String> = sqlx::query_scalar(
        r#"
        SELECT contact_id FROM contacts
        WHERE block_id = $1
        ORDER BY (split_part(contact_id, '-', 2))::int DESC
        LIMIT 1
        "#,
    )
    .bind(block.id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(next_contact_id(&block.code, highest.as_deref()))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateContact {
    #[serde(default)]
    pub full_name: Patch<String>,
    /// Always overwritten, including to null when omitted. This asymmetry is
    /// load-bearing observable behavior; see DESIGN.md.
    #[serde(default)]
    pub organization_id: Option<i32>,
    #[serde(default)]
    pub position: Patch<String>,
    #[serde(default)]
    pub influence_status_id: Patch<i32>,
    #[serde(default)]
    pub influence_type_id: Patch<i32>,
    #[serde(default)]
    pub communication_channel_id: Patch<i32>,
    #[serde(default)]
    pub source_id: Patch<i32>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub responsible_curator_id: Patch<Uuid>,
    #[serde(default)]
    pub next_touch_date: Patch<DateTime<Utc>>,
}

/// Applies an update. An influence-status change takes the status-change
/// path: contact update + history append + StatusChange audit row, with no
/// separate Update audit row for the same call.
pub async fn update(
    pool: &PgPool,
    cipher: &FieldCipher,
    id: Uuid,
    actor: Actor,
    req: UpdateContact,
) -> Result<(), AppError> {
    if !access::can_access_contact(pool, id, actor).await? {
        return Err(AppError::Forbidden);
    }

    let mut tx = pool.begin().await?;

    let current: Contact = sqlx::query_as("SELECT * FROM contacts WHERE id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let old_snapshot = scalar_snapshot(&current);

    let full_name = match req.full_name {
        Patch::Absent => current.full_name.clone(),
        Patch::Null => {
            return Err(AppError::Validation("full_name cannot be null".to_string()));
        }
        Patch::Value(v) => {
            if v.trim().is_empty() {
                return Err(AppError::Validation("full_name is required".to_string()));
            }
            cipher.encrypt(&v)
        }
    };
    let notes = match req.notes {
        Patch::Absent => current.notes.clone(),
        Patch::Null => cipher.encrypt(""),
        Patch::Value(v) => cipher.encrypt(&v),
    };

    let previous_status = current.influence_status_id;
    let new_status = req.influence_status_id.resolve(previous_status);
    let status_changed = !req.influence_status_id.is_absent() && new_status != previous_status;

    let updated = Contact {
        full_name,
        notes,
        organization_id: req.organization_id,
        position: req.position.resolve(current.position.clone()),
        influence_status_id: new_status,
        influence_type_id: req
            .influence_type_id
            .resolve(current.influence_type_id),
        communication_channel_id: req
            .communication_channel_id
            .resolve(current.communication_channel_id),
        source_id: req.source_id.resolve(current.source_id),
        responsible_curator_id: req
            .responsible_curator_id
            .resolve(current.responsible_curator_id),
        next_touch_date: req.next_touch_date.resolve(current.next_touch_date),
        ..current.clone()
    };

    sqlx::query(
        r#"
        UPDATE contacts SET
            full_name = $2, organization_id = $3, position = $4,
            influence_status_id = $5, influence_type_id = $6,
            communication_channel_id = $7, source_id = $8, notes = $9,
            responsible_curator_id = $10, next_touch_date = $11,
            updated_at = now(), updated_by = $12
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&updated.full_name)
    .bind(updated.organization_id)
    .bind(updated.position.as_deref())
    .bind(updated.influence_status_id)
    .bind(updated.influence_type_id)
    .bind(updated.communication_channel_id)
    .bind(updated.source_id)
    .bind(&updated.notes)
    .bind(updated.responsible_curator_id)
    .bind(updated.next_touch_date)
    .bind(actor.user_id)
    .execute(&mut *tx)
    .await?;

    if status_changed {
        audit::record_status_change(
            &mut tx,
            actor.user_id,
            id,
            &current.contact_id,
            previous_status,
            new_status,
        )
        .await?;
    } else {
        audit::record(
            &mut tx,
            actor.user_id,
            AuditAction::Update,
            "Contact",
            &id.to_string(),
            Some(old_snapshot),
            Some(scalar_snapshot(&updated)),
        )
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Soft delete. Idempotent: a second call finds the inactive row and still
/// succeeds.
pub async fn delete(pool: &PgPool, id: Uuid, actor: Actor) -> Result<(), AppError> {
    if !access::can_access_contact(pool, id, actor).await? {
        return Err(AppError::Forbidden);
    }

    let mut tx = pool.begin().await?;

    let contact_id: String = sqlx::query_scalar("SELECT contact_id FROM contacts WHERE id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("UPDATE contacts SET active = FALSE, updated_at = now(), updated_by = $2 WHERE id = $1")
        .bind(id)
        .bind(actor.user_id)
        .execute(&mut *tx)
        .await?;

    audit::record(
        &mut tx,
        actor.user_id,
        AuditAction::Delete,
        "Contact",
        &id.to_string(),
        audit::snapshot(&json!({ "contact_id": contact_id })),
        None,
    )
    .await?;

    tx.commit().await?;
    info!("Deactivated contact {contact_id}");
    Ok(())
}

/// Active contacts in accessible active blocks whose next touch is overdue,
/// most overdue first. A curator with no assignments gets an empty list.
pub async fn get_overdue(
    pool: &PgPool,
    cipher: &FieldCipher,
    actor: Actor,
) -> Result<Vec<ContactView>, AppError> {
    let scope = access::resolve_scope(pool, actor).await?;
    if scope.is_empty() {
        return Ok(vec![]);
    }

    let rows: Vec<Contact> = sqlx::query_as(
        r#"
        SELECT c.* FROM contacts c
        JOIN blocks b ON b.id = c.block_id
        WHERE c.active = TRUE
          AND b.status = 'active'
          AND ($1::uuid[] IS NULL OR c.block_id = ANY($1))
          AND c.next_touch_date < now()
        ORDER BY c.next_touch_date ASC
        "#,
    )
    .bind(scope.as_param())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|c| to_view(cipher, c)).collect()
}
