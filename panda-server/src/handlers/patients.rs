use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use panda_core::{Address, NewAddress, NewPatient, Patient, PatientPatch};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, Pagination};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PatientListQuery {
    /// Case-insensitive name substring filter.
    pub q: Option<String>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for PatientListQuery {
    fn default() -> Self {
        let page = Pagination::default();
        Self {
            q: None,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// GET /patients
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = state
        .service
        .list_patients(query.q.as_deref(), query.offset, query.limit)?;
    Ok(Json(patients))
}

/// POST /patients
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = state.service.create_patient(&new)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[derive(Debug, Deserialize)]
pub struct NhsNumberQuery {
    pub nhs_no: String,
}

/// GET /patients/getbynhsnumber?nhs_no=
pub async fn get_by_nhs_number(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NhsNumberQuery>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state.service.get_patient_by_nhs_number(&query.nhs_no)?;
    Ok(Json(patient))
}

/// GET /patients/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.service.get_patient(id)?))
}

/// PUT /patients/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<PatientPatch>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.service.update_patient(id, &patch)?))
}

/// DELETE /patients/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_patient(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /patients/{id}/address
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(new): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let address = state.service.create_address_for_owner(id, &new)?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /patients/{id}/address
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.service.list_addresses_by_owner(id)?))
}
