use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_database::Database;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::AvailabilityService;

pub fn availability_routes(config: Arc<AppConfig>, db: Database) -> Router {
    let service = Arc::new(AvailabilityService::new(db, &config));

    Router::new()
        .route("/{clinician_id}/schedule", post(handlers::rewrite_availability))
        .route("/{clinician_id}/templates", get(handlers::list_templates))
        .route("/{clinician_id}/horizon", post(handlers::generate_horizon))
        .route("/{clinician_id}/free-slots", get(handlers::list_free_slots))
        .route("/{clinician_id}/free-slots", delete(handlers::prune_free_slots))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}
