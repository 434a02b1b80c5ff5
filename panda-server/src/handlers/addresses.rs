use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use panda_core::Address;
use std::sync::Arc;

use super::{ApiError, Pagination};
use crate::AppState;

/// GET /addresses
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.service.list_addresses(page.offset, page.limit)?))
}

/// GET /addresses/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Address>, ApiError> {
    Ok(Json(state.service.get_address(id)?))
}
