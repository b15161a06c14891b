//! Watchlist endpoints. The role gate lives here: only admins and threat
//! analysts get through; the service layer assumes authorized callers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::watchlist::WatchlistItem;
use crate::state::AppState;
use crate::watchlist::service::{
    self, CreateWatchlistItem, RecordCheck, UpdateWatchlistItem,
};
use crate::watchlist::stats::WatchlistStatistics;

fn require_watchlist_access(actor: Actor) -> Result<(), AppError> {
    if actor.can_access_watchlist() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// GET /api/v1/watchlist
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<WatchlistItem>>, AppError> {
    require_watchlist_access(actor)?;
    Ok(Json(service::list(&state.db).await?))
}

/// GET /api/v1/watchlist/due
pub async fn handle_due(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<WatchlistItem>>, AppError> {
    require_watchlist_access(actor)?;
    Ok(Json(service::get_due(&state.db).await?))
}

/// GET /api/v1/watchlist/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<WatchlistStatistics>, AppError> {
    require_watchlist_access(actor)?;
    Ok(Json(service::get_statistics(&state.db).await?))
}

/// GET /api/v1/watchlist/:id
pub async fn handle_get(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<WatchlistItem>, AppError> {
    require_watchlist_access(actor)?;
    let item = service::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Watchlist entry {id} not found")))?;
    Ok(Json(item))
}

/// POST /api/v1/watchlist
pub async fn handle_create(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateWatchlistItem>,
) -> Result<(StatusCode, Json<WatchlistItem>), AppError> {
    require_watchlist_access(actor)?;
    let item = service::create(&state.db, actor, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/v1/watchlist/:id
pub async fn handle_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWatchlistItem>,
) -> Result<StatusCode, AppError> {
    require_watchlist_access(actor)?;
    service::update(&state.db, id, actor, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/watchlist/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_watchlist_access(actor)?;
    service::delete(&state.db, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/watchlist/:id/check
pub async fn handle_record_check(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordCheck>,
) -> Result<StatusCode, AppError> {
    require_watchlist_access(actor)?;
    service::record_check(&state.db, id, actor, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
