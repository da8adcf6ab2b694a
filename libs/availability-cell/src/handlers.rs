use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::blocking::run_blocking;

use crate::models::{FreeSlotsQuery, GenerateHorizonRequest, PruneQuery, PruneReport, RewriteAvailabilityRequest};
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn rewrite_availability(
    State(service): State<Arc<AvailabilityService>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<RewriteAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} rewriting schedule of clinician {}", user.id, clinician_id);

    let report = run_blocking(move || service.rewrite_availability(clinician_id, &request)).await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn generate_horizon(
    State(service): State<Arc<AvailabilityService>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<GenerateHorizonRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} generating horizon for clinician {}", user.id, clinician_id);

    let report = run_blocking(move || service.generate_horizon(clinician_id, request.horizon_weeks)).await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn prune_free_slots(
    State(service): State<Arc<AvailabilityService>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<PruneQuery>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} pruning free slots of clinician {}", user.id, clinician_id);

    let deleted_free = run_blocking(move || service.prune_free_slots(clinician_id, query.from, query.cover_today)).await?;

    Ok(Json(json!(PruneReport { deleted_free })))
}

#[axum::debug_handler]
pub async fn list_templates(
    State(service): State<Arc<AvailabilityService>>,
    Path(clinician_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let templates = run_blocking(move || service.list_templates(clinician_id)).await?;

    Ok(Json(json!({
        "templates": templates,
        "total": templates.len()
    })))
}

#[axum::debug_handler]
pub async fn list_free_slots(
    State(service): State<Arc<AvailabilityService>>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = run_blocking(move || service.free_slots(clinician_id, query.from, query.to)).await?;

    Ok(Json(json!({
        "clinician_id": clinician_id,
        "free_slots": slots,
        "total": slots.len()
    })))
}
