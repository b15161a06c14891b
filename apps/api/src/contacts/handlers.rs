use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Actor;
use crate::contacts::service::{
    self, ContactFilters, ContactView, CreateContact, UpdateContact,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub block_id: Option<Uuid>,
    pub search: Option<String>,
    pub influence_status_id: Option<i32>,
    pub influence_type_id: Option<i32>,
    pub organization_id: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Serialize)]
pub struct ContactListResponse {
    pub items: Vec<ContactView>,
    pub total: i64,
}

/// GET /api/v1/contacts
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
    Query(q): Query<ListQuery>,
) -> Result<Json<ContactListResponse>, AppError> {
    let filters = ContactFilters {
        block_id: q.block_id,
        search: q.search,
        influence_status_id: q.influence_status_id,
        influence_type_id: q.influence_type_id,
        organization_id: q.organization_id,
    };
    let (items, total) =
        service::list(&state.db, &state.cipher, actor, &filters, q.page, q.page_size).await?;
    Ok(Json(ContactListResponse { items, total }))
}

/// GET /api/v1/contacts/overdue
pub async fn handle_overdue(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<ContactView>>, AppError> {
    let items = service::get_overdue(&state.db, &state.cipher, actor).await?;
    Ok(Json(items))
}

/// GET /api/v1/contacts/:id
pub async fn handle_get(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactView>, AppError> {
    let contact = service::get_by_id(&state.db, &state.cipher, id, actor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))?;
    Ok(Json(contact))
}

/// POST /api/v1/contacts
pub async fn handle_create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateContact>,
) -> Result<(StatusCode, Json<ContactView>), AppError> {
    let contact = service::create(&state.db, &state.cipher, actor, req).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// PATCH /api/v1/contacts/:id
pub async fn handle_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContact>,
) -> Result<StatusCode, AppError> {
    service::update(&state.db, &state.cipher, id, actor, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/contacts/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete(&state.db, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
