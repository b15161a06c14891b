use axum::{extract::State, Json};

use crate::auth::Actor;
use crate::dashboard::service::{self, AdminDashboard, CuratorDashboard};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/dashboard/curator
pub async fn handle_curator(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<CuratorDashboard>, AppError> {
    let view = service::curator_view(&state.db, &state.cipher, actor).await?;
    Ok(Json(view))
}

/// GET /api/v1/dashboard/admin
pub async fn handle_admin(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<AdminDashboard>, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(service::admin_view(&state.db).await?))
}
