use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::PageParams;
use crate::server::response::{ApiError, StoreResultExt, page_window};

/// Average salary per store across employees holding a shift there.
pub async fn salary_report(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let (offset, limit) = page_window(params.offset, params.limit, state.config.max_page_size)?;
    let report = state
        .store
        .store_salary_report(offset, limit)
        .api_err("Failed to build salary report")?;

    Ok::<_, ApiError>(Json(report))
}

/// Distinct employees per store.
pub async fn headcount_report(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let (offset, limit) = page_window(params.offset, params.limit, state.config.max_page_size)?;
    let report = state
        .store
        .store_headcount_report(offset, limit)
        .api_err("Failed to build headcount report")?;

    Ok::<_, ApiError>(Json(report))
}
