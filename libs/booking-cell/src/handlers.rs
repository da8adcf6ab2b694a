use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::blocking::run_blocking;
use shared_utils::extractor::actor_id;

use crate::models::{AllocateRequest, ChangeStatusRequest, RescheduleRequest, UpdateBookingRequest};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn allocate(
    State(service): State<Arc<BookingService>>,
    Extension(user): Extension<User>,
    Json(request): Json<AllocateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = actor_id(&user)?;
    debug!("User {} allocating slot {}", actor, request.slot_id);

    let booking = run_blocking(move || {
        service.allocate(request.slot_id, request.patient_id, request.status_id, actor, &request.reason)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!(booking))))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = run_blocking(move || service.get_booking(booking_id)).await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn cancel(
    State(service): State<Arc<BookingService>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = actor_id(&user)?;

    run_blocking(move || service.cancel(booking_id, actor)).await?;

    Ok(Json(json!({
        "booking_id": booking_id,
        "cancelled": true
    })))
}

#[axum::debug_handler]
pub async fn change_status(
    State(service): State<Arc<BookingService>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = actor_id(&user)?;

    let booking = run_blocking(move || service.change_status(booking_id, request.status_id, actor)).await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn update_booking(
    State(service): State<Arc<BookingService>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = actor_id(&user)?;

    let booking = run_blocking(move || {
        service.update_status_and_note(booking_id, request.status_id, &request.note, actor)
    })
    .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn reschedule(
    State(service): State<Arc<BookingService>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = actor_id(&user)?;

    let booking = run_blocking(move || {
        service.reschedule(booking_id, request.slot_id, actor, &request.reason)
    })
    .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn audit_trail(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let records = run_blocking(move || service.audit_trail(booking_id)).await?;

    Ok(Json(json!({
        "booking_id": booking_id,
        "records": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn list_statuses(
    State(service): State<Arc<BookingService>>,
) -> Result<Json<Value>, AppError> {
    let statuses = run_blocking(move || service.list_statuses()).await?;

    Ok(Json(json!({ "statuses": statuses })))
}
