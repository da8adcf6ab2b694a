use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::availability_routes;
use booking_cell::booking_routes;
use shared_config::AppConfig;
use shared_database::Database;

pub fn create_router(state: Arc<AppConfig>, db: Database) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic agenda API is running!" }))
        .nest("/availability", availability_routes(state.clone(), db.clone()))
        .nest("/bookings", booking_routes(state, db))
}
