use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{CreateShiftRequest, PageParams, SearchParams, UpdateShiftRequest};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::validate_date_order;
use crate::types::{StoreShift, StoreShiftDetails};

use super::access::require_owner_or_moderator;

fn list(
    state: &AppState,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<StoreShift>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_shifts(offset, limit)
        .api_err("Failed to list store shifts")
}

pub async fn list_shifts(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let shifts = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(shifts))
}

pub async fn list_shifts_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let shifts = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(shifts))
}

pub async fn search_shifts(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let shifts = state
        .store
        .search_shifts(query, SEARCH_LIMIT)
        .api_err("Failed to search store shifts")?;

    Ok::<_, ApiError>(Json(shifts))
}

pub async fn get_shift(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((store_id, employee_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let db = state.store.as_ref();
    let shift = db
        .get_shift(store_id, employee_id)
        .api_err("Failed to get store shift")?
        .or_not_found("Store shift not found")?;

    // Both sides cascade, so a live shift always resolves
    let store = db
        .get_store(store_id)
        .api_err("Failed to get store")?
        .or_not_found("Store not found")?;
    let store_employee = db
        .get_employee(employee_id)
        .api_err("Failed to get store employee")?
        .or_not_found("Store employee not found")?;

    Ok::<_, ApiError>(Json(StoreShiftDetails {
        shift,
        store,
        store_employee,
    }))
}

pub async fn create_shift(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateShiftRequest>,
) -> impl IntoResponse {
    validate_date_order(req.start_date, req.end_date, "Start date", "End date")?;

    let shift = StoreShift {
        store_id: req.store_id,
        store_employee_id: req.store_employee_id,
        start_date: req.start_date,
        end_date: req.end_date,
        user_id: Some(session.user.id),
    };

    state
        .store
        .create_shift(&shift)
        .api_err("Failed to create store shift")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(shift)))
}

pub async fn update_shift(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((store_id, employee_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateShiftRequest>,
) -> impl IntoResponse {
    validate_date_order(req.start_date, req.end_date, "Start date", "End date")?;

    let db = state.store.as_ref();
    let mut shift = db
        .get_shift(store_id, employee_id)
        .api_err("Failed to get store shift")?
        .or_not_found("Store shift not found")?;

    require_owner_or_moderator(&session, shift.user_id)?;

    shift.start_date = req.start_date;
    shift.end_date = req.end_date;
    db.update_shift(&shift)
        .api_err("Failed to update store shift")?;

    Ok::<_, ApiError>(Json(shift))
}

pub async fn delete_shift(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((store_id, employee_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let db = state.store.as_ref();
    let shift = db
        .get_shift(store_id, employee_id)
        .api_err("Failed to get store shift")?
        .or_not_found("Store shift not found")?;

    require_owner_or_moderator(&session, shift.user_id)?;

    db.delete_shift(store_id, employee_id)
        .api_err("Failed to delete store shift")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
