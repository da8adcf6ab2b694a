use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_database::Database;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::BookingService;

pub fn booking_routes(config: Arc<AppConfig>, db: Database) -> Router {
    let service = Arc::new(BookingService::new(db));

    Router::new()
        .route("/", post(handlers::allocate))
        .route("/statuses", get(handlers::list_statuses))
        .route(
            "/{booking_id}",
            get(handlers::get_booking)
                .put(handlers::update_booking)
                .delete(handlers::cancel),
        )
        .route("/{booking_id}/status", patch(handlers::change_status))
        .route("/{booking_id}/reschedule", patch(handlers::reschedule))
        .route("/{booking_id}/audit", get(handlers::audit_trail))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}
