use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::interactions::service::{self, CreateInteraction, InteractionView, UpdateInteraction};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub contact_id: Uuid,
}

/// GET /api/v1/interactions?contact_id=...
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<InteractionView>>, AppError> {
    let items = service::list_for_contact(&state.db, &state.cipher, q.contact_id, actor).await?;
    Ok(Json(items))
}

#[derive(Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_count")]
    pub count: i64,
}

fn default_count() -> i64 {
    5
}

/// GET /api/v1/interactions/recent
pub async fn handle_recent(
    State(state): State<AppState>,
    actor: Actor,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<InteractionView>>, AppError> {
    let items = service::get_recent(&state.db, &state.cipher, actor, q.count.clamp(1, 100)).await?;
    Ok(Json(items))
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// POST /api/v1/interactions
pub async fn handle_create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateInteraction>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = service::create(&state.db, &state.cipher, actor, req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PATCH /api/v1/interactions/:id
pub async fn handle_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInteraction>,
) -> Result<StatusCode, AppError> {
    service::update(&state.db, &state.cipher, id, actor, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/interactions/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete(&state.db, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
