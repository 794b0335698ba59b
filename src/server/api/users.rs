use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireAuth, hash_password};
use crate::server::AppState;
use crate::server::dto::{
    CreateUserRequest, PageParams, ProfileRequest, SearchParams, UpdateUserRequest,
};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::{validate_count, validate_password, validate_user_name};
use crate::store::DataStore;
use crate::types::{AccessLevel, User, UserProfile, UserWithProfile};

use super::access::require_self_or_admin;

/// Attaches the user's profile, looked up by key.
pub fn with_profile(store: &dyn DataStore, user: User) -> Result<UserWithProfile, ApiError> {
    let user_profile = store
        .get_user_profile(user.id)
        .api_err("Failed to get user profile")?;
    Ok(UserWithProfile { user, user_profile })
}

fn apply_profile(profile: &mut UserProfile, req: ProfileRequest) -> Result<(), ApiError> {
    if let Some(page_preference) = req.page_preference {
        validate_count(page_preference)?;
        profile.page_preference = page_preference;
    }
    profile.bio = req.bio;
    profile.birthday = req.birthday;
    profile.gender = req.gender;
    profile.marital_status = req.marital_status;
    profile.location = req.location;
    Ok(())
}

fn hash_new_password(password: Option<&str>) -> Result<Option<String>, ApiError> {
    password
        .map(|p| {
            validate_password(p)?;
            hash_password(p).api_err("Failed to hash password")
        })
        .transpose()
}

fn list(state: &AppState, offset: Option<i64>, limit: Option<i64>) -> Result<Vec<User>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_users(offset, limit)
        .api_err("Failed to list users")
}

pub async fn list_users(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let users = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(users))
}

pub async fn list_users_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let users = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(users))
}

pub async fn search_users(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users = state
        .store
        .search_users(query, SEARCH_LIMIT)
        .api_err("Failed to search users")?;

    Ok::<_, ApiError>(Json(users))
}

pub async fn get_user(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let user = store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(with_profile(store, user)?))
}

pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if let Some(name) = &req.name {
        validate_user_name(name)?;
    }

    let mut profile = UserProfile::new(0);
    if let Some(profile_req) = req.user_profile {
        apply_profile(&mut profile, profile_req)?;
    }

    let user = User {
        id: 0,
        name: req.name,
        password: hash_new_password(req.password.as_deref())?,
        access_level: req.access_level.unwrap_or(AccessLevel::Regular),
    };

    let store = state.store.as_ref();
    let id = store
        .create_user(&user, &profile)
        .api_err("Failed to create user")?;

    let created = User { id, ..user };
    Ok::<_, ApiError>((StatusCode::CREATED, Json(with_profile(store, created)?)))
}

pub async fn update_user(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    require_self_or_admin(&session, id)?;

    let store = state.store.as_ref();
    let mut user = store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if let Some(level) = req.access_level {
        if level != user.access_level && !session.user.access_level.is_admin() {
            return Err(ApiError::forbidden("Only administrators can change access levels"));
        }
        user.access_level = level;
    }
    if let Some(name) = req.name {
        validate_user_name(&name)?;
        user.name = Some(name);
    }
    if let Some(password) = hash_new_password(req.password.as_deref())? {
        user.password = Some(password);
    }

    // Validate the profile before writing anything
    let profile = match req.user_profile {
        Some(profile_req) => {
            let mut profile = store
                .get_user_profile(id)
                .api_err("Failed to get user profile")?
                .unwrap_or_else(|| UserProfile::new(id));
            apply_profile(&mut profile, profile_req)?;
            Some(profile)
        }
        None => None,
    };

    store
        .update_user_with_profile(&user, profile.as_ref())
        .api_err("Failed to update user")?;

    Ok::<_, ApiError>(Json(with_profile(store, user)?))
}

pub async fn delete_user(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    require_self_or_admin(&session, id)?;

    if !state.store.delete_user(id).api_err("Failed to delete user")? {
        return Err(ApiError::not_found("User not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
