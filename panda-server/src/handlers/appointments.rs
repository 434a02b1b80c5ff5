use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use panda_core::{Appointment, AppointmentPatch, NewAppointment};
use std::sync::Arc;

use super::{ApiError, Pagination};
use crate::AppState;

/// GET /appointments
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(
        state.service.list_appointments(page.offset, page.limit)?,
    ))
}

/// POST /appointments
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = state.service.create_appointment(&new)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /appointments/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(state.service.get_appointment(id)?))
}

/// PUT /appointments/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(state.service.update_appointment(id, &patch)?))
}

/// POST /appointments/{id}/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(state.service.cancel_appointment(id)?))
}

/// POST /appointments/{id}/attended
pub async fn mark_attended(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(state.service.mark_attended(id)?))
}
