use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::reference::ReferenceValue;
use crate::state::AppState;

/// GET /api/v1/references/:category
/// Active lookup values for one category, in display order. Any
/// authenticated role may read these.
pub async fn handle_by_category(
    State(state): State<AppState>,
    _actor: Actor,
    Path(category): Path<String>,
) -> Result<Json<Vec<ReferenceValue>>, AppError> {
    let values: Vec<ReferenceValue> = sqlx::query_as(
        r#"
        SELECT * FROM reference_values
        WHERE category = $1 AND active = TRUE
        ORDER BY sort_order ASC, value ASC
        "#,
    )
    .bind(&category)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(values))
}
