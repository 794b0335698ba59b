use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{PageParams, SearchParams, StoreRequest};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::{validate_date_order, validate_label};
use crate::types::{Store, StoreDetails};

use super::access::require_owner_or_moderator;

fn validate(req: &StoreRequest) -> Result<(), ApiError> {
    validate_label(&req.name, "Store name")?;
    validate_date_order(req.open_date, req.close_date, "Open date", "Close date")
}

fn apply(store: &mut Store, req: StoreRequest) {
    store.name = req.name;
    store.description = req.description;
    store.address = req.address;
    store.city = req.city;
    store.state = req.state;
    store.zip_code = req.zip_code;
    store.country = req.country;
    store.category = req.category;
    store.open_date = req.open_date;
    store.close_date = req.close_date;
}

fn list(state: &AppState, offset: Option<i64>, limit: Option<i64>) -> Result<Vec<Store>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_stores(offset, limit)
        .api_err("Failed to list stores")
}

pub async fn list_stores(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let stores = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(stores))
}

pub async fn list_stores_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let stores = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(stores))
}

pub async fn search_stores(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let stores = state
        .store
        .search_stores(query, SEARCH_LIMIT)
        .api_err("Failed to search stores")?;

    Ok::<_, ApiError>(Json(stores))
}

pub async fn get_store(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let db = state.store.as_ref();
    let store = db
        .get_store(id)
        .api_err("Failed to get store")?
        .or_not_found("Store not found")?;

    let store_shifts = db
        .list_store_shifts(id)
        .api_err("Failed to list store shifts")?;

    Ok::<_, ApiError>(Json(StoreDetails {
        store,
        store_shifts,
    }))
}

pub async fn create_store(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<StoreRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let mut store = Store {
        id: 0,
        name: String::new(),
        description: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
        country: None,
        category: req.category,
        open_date: None,
        close_date: None,
        user_id: Some(session.user.id),
    };
    apply(&mut store, req);

    store.id = state
        .store
        .create_store(&store)
        .api_err("Failed to create store")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(store)))
}

pub async fn update_store(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<StoreRequest>,
) -> impl IntoResponse {
    validate(&req)?;

    let db = state.store.as_ref();
    let mut store = db
        .get_store(id)
        .api_err("Failed to get store")?
        .or_not_found("Store not found")?;

    require_owner_or_moderator(&session, store.user_id)?;

    apply(&mut store, req);
    db.update_store(&store).api_err("Failed to update store")?;

    Ok::<_, ApiError>(Json(store))
}

pub async fn delete_store(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let db = state.store.as_ref();
    let store = db
        .get_store(id)
        .api_err("Failed to get store")?
        .or_not_found("Store not found")?;

    require_owner_or_moderator(&session, store.user_id)?;

    db.delete_store(id).api_err("Failed to delete store")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
