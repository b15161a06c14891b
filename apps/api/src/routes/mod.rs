pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::contacts::handlers as contacts;
use crate::dashboard::handlers as dashboard;
use crate::interactions::handlers as interactions;
use crate::references::handlers as references;
use crate::state::AppState;
use crate::watchlist::handlers as watchlist;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Contacts
        .route("/api/v1/contacts", get(contacts::handle_list).post(contacts::handle_create))
        .route("/api/v1/contacts/overdue", get(contacts::handle_overdue))
        .route(
            "/api/v1/contacts/:id",
            get(contacts::handle_get)
                .patch(contacts::handle_update)
                .delete(contacts::handle_delete),
        )
        // Interactions
        .route(
            "/api/v1/interactions",
            get(interactions::handle_list).post(interactions::handle_create),
        )
        .route("/api/v1/interactions/recent", get(interactions::handle_recent))
        .route(
            "/api/v1/interactions/:id",
            patch(interactions::handle_update).delete(interactions::handle_delete),
        )
        // Watchlist (role-gated in handlers)
        .route(
            "/api/v1/watchlist",
            get(watchlist::handle_list).post(watchlist::handle_create),
        )
        .route("/api/v1/watchlist/due", get(watchlist::handle_due))
        .route("/api/v1/watchlist/statistics", get(watchlist::handle_statistics))
        .route(
            "/api/v1/watchlist/:id",
            get(watchlist::handle_get)
                .patch(watchlist::handle_update)
                .delete(watchlist::handle_delete),
        )
        .route("/api/v1/watchlist/:id/check", post(watchlist::handle_record_check))
        // Dashboards
        .route("/api/v1/dashboard/curator", get(dashboard::handle_curator))
        .route("/api/v1/dashboard/admin", get(dashboard::handle_admin))
        // Reference lookups
        .route("/api/v1/references/:category", get(references::handle_by_category))
        .with_state(state)
}
