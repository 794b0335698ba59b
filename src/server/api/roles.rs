use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{PageParams, RoleRequest, SearchParams};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::{validate_label, validate_role_level};
use crate::types::{StoreEmployeeRole, StoreEmployeeRoleDetails};

use super::access::require_owner_or_moderator;

fn validate(req: &RoleRequest) -> Result<(), ApiError> {
    validate_label(&req.name, "Role name")?;
    validate_role_level(req.role_level)
}

fn list(
    state: &AppState,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<StoreEmployeeRole>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_roles(offset, limit)
        .api_err("Failed to list store employee roles")
}

pub async fn list_roles(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let roles = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(roles))
}

pub async fn list_roles_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let roles = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(roles))
}

pub async fn search_roles(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let roles = state
        .store
        .search_roles(query, SEARCH_LIMIT)
        .api_err("Failed to search store employee roles")?;

    Ok::<_, ApiError>(Json(roles))
}

pub async fn get_role(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let role = store
        .get_role(id)
        .api_err("Failed to get store employee role")?
        .or_not_found("Store employee role not found")?;

    let store_employees = store
        .list_role_employees(id)
        .api_err("Failed to list role employees")?;

    Ok::<_, ApiError>(Json(StoreEmployeeRoleDetails {
        role,
        store_employees,
    }))
}

pub async fn create_role(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoleRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let mut role = StoreEmployeeRole {
        id: 0,
        name: req.name,
        description: req.description,
        role_level: req.role_level,
        user_id: Some(session.user.id),
    };

    role.id = state
        .store
        .create_role(&role)
        .api_err("Failed to create store employee role")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<RoleRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let store = state.store.as_ref();
    let mut role = store
        .get_role(id)
        .api_err("Failed to get store employee role")?
        .or_not_found("Store employee role not found")?;

    require_owner_or_moderator(&session, role.user_id)?;

    role.name = req.name;
    role.description = req.description;
    role.role_level = req.role_level;

    store
        .update_role(&role)
        .api_err("Failed to update store employee role")?;

    Ok::<_, ApiError>(Json(role))
}

pub async fn delete_role(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let role = store
        .get_role(id)
        .api_err("Failed to get store employee role")?
        .or_not_found("Store employee role not found")?;

    require_owner_or_moderator(&session, role.user_id)?;

    store
        .delete_role(id)
        .api_err("Failed to delete store employee role")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
