use std::sync::Arc;

use sqlx::PgPool;

use crate::crypto::FieldCipher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Field-encryption collaborator; key derived once at startup.
    pub cipher: Arc<FieldCipher>,
}
