//! Access Control Resolver.
//!
//! Every contact/interaction/dashboard query is scoped by the caller's role:
//! admins see everything, curators see only blocks a `block_curators` row
//! assigns them to, threat analysts see no blocks at all (their access is the
//! role-gated watchlist, enforced at the handler layer).
//!
//! Listing queries filter by scope rather than erroring, so an unauthorized
//! caller learns nothing about what exists. Write paths check the target
//! explicitly and distinguish "not found" from "forbidden".

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::errors::AppError;

/// The set of block ids an actor may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockScope {
    /// No filtering (admin).
    All,
    /// Restricted to these block ids; may be empty.
    Blocks(Vec<Uuid>),
}

impl BlockScope {
    /// Bind-friendly shape: `None` means unrestricted, `Some(ids)` restricts
    /// via `block_id = ANY($n)`.
    pub fn as_param(&self) -> Option<&[Uuid]> {
        match self {
            BlockScope::All => None,
            BlockScope::Blocks(ids) => Some(ids),
        }
    }

    /// A curator with zero assignments can short-circuit to empty results.
    pub fn is_empty(&self) -> bool {
        matches!(self, BlockScope::Blocks(ids) if ids.is_empty())
    }
}

/// Resolves the accessible block ids for an actor.
pub async fn resolve_scope(pool: &PgPool, actor: Actor) -> Result<BlockScope, AppError> {
    match actor.role {
        Role::Admin => Ok(BlockScope::All),
        Role::ThreatAnalyst => Ok(BlockScope::Blocks(vec![])),
        Role::Curator => {
            let ids: Vec<Uuid> =
                sqlx::query_scalar("SELECT block_id FROM block_curators WHERE user_id = $1")
                    .bind(actor.user_id)
                    .fetch_all(pool)
                    .await?;
            Ok(BlockScope::Blocks(ids))
        }
    }
}

/// Role-level verdict before any assignment lookup: admins always pass,
/// threat analysts never do, curators depend on `block_curators`.
fn role_verdict(role: Role) -> Option<bool> {
    match role {
        Role::Admin => Some(true),
        Role::ThreatAnalyst => Some(false),
        Role::Curator => None,
    }
}

/// Whether the actor may act on the given block. The block must exist; a
/// missing block is a NotFound for the caller, never a silent `false`.
pub async fn can_access_block(
    pool: &PgPool,
    block_id: Uuid,
    actor: Actor,
) -> Result<bool, AppError> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM blocks WHERE id = $1")
        .bind(block_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("Block {block_id} not found")));
    }

    match role_verdict(actor.role) {
        Some(verdict) => Ok(verdict),
        None => Ok(is_assigned(pool, block_id, actor.user_id).await?),
    }
}

/// Whether a `block_curators` row links the user to the block.
pub async fn is_assigned(pool: &PgPool, block_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let assigned: Option<Uuid> = sqlx::query_scalar(
        "SELECT block_id FROM block_curators WHERE block_id = $1 AND user_id = $2",
    )
    .bind(block_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(assigned.is_some())
}

/// Whether the actor may act on the given contact, resolved via its block.
pub async fn can_access_contact(
    pool: &PgPool,
    contact_pk: Uuid,
    actor: Actor,
) -> Result<bool, AppError> {
    let block_id: Option<Uuid> = sqlx::query_scalar("SELECT block_id FROM contacts WHERE id = $1")
        .bind(contact_pk)
        .fetch_optional(pool)
        .await?;
    let Some(block_id) = block_id else {
        return Err(AppError::NotFound(format!("Contact {contact_pk} not found")));
    };

    match role_verdict(actor.role) {
        Some(verdict) => Ok(verdict),
        None => Ok(is_assigned(pool, block_id, actor.user_id).await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_param_shapes() {
        assert_eq!(BlockScope::All.as_param(), None);
        let ids = vec![Uuid::new_v4()];
        let scope = BlockScope::Blocks(ids.clone());
        assert_eq!(scope.as_param(), Some(ids.as_slice()));
    }

    #[test]
    fn test_empty_scope_detection() {
        assert!(BlockScope::Blocks(vec![]).is_empty());
        assert!(!BlockScope::All.is_empty());
        assert!(!BlockScope::Blocks(vec![Uuid::new_v4()]).is_empty());
    }

    #[test]
    fn test_role_verdict_only_curators_need_assignments() {
        assert_eq!(role_verdict(Role::Admin), Some(true));
        assert_eq!(role_verdict(Role::ThreatAnalyst), Some(false));
        assert_eq!(role_verdict(Role::Curator), None);
    }
}
