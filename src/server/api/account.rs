use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAuth, hash_password, issue_token, verify_password};
use crate::server::AppState;
use crate::server::dto::{CredentialsRequest, LoginResponse, RegisterResponse};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_password, validate_user_name};
use crate::types::{AccessLevel, ConfirmationCode, User, UserProfile, UserWithProfile};

use super::users::with_profile;

const INVALID_CREDENTIALS: &str = "Invalid name or password";

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    validate_user_name(&req.name)?;
    validate_password(&req.password)?;

    let store = state.store.as_ref();
    let user = User {
        id: 0,
        name: Some(req.name),
        password: Some(hash_password(&req.password).api_err("Failed to hash password")?),
        access_level: AccessLevel::Unconfirmed,
    };

    let user_id = store
        .create_user(&user, &UserProfile::new(0))
        .api_err("Failed to create user")?;

    let expiration = Utc::now() + state.config.confirmation_ttl();
    let code = ConfirmationCode {
        id: 0,
        code: Some(Uuid::new_v4().simple().to_string()),
        expiration: Some(expiration),
        used: false,
        user_id,
    };

    if let Err(e) = store.create_confirmation_code(&code) {
        // Leave no half-registered account behind
        if let Err(cleanup) = store.delete_user(user_id) {
            tracing::warn!("Failed to remove user {user_id} after registration error: {cleanup}");
        }
        return Err(ApiError::from(e));
    }

    tracing::info!("Registered user {user_id}, awaiting confirmation");

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            code: code.code.unwrap_or_default(),
            expiration,
        }),
    ))
}

pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let code = store
        .get_confirmation_code(&code)
        .api_err("Failed to get confirmation code")?
        .or_not_found("Confirmation code not found")?;

    if code.used {
        return Err(ApiError::conflict("Confirmation code has already been used"));
    }
    if code.is_expired(Utc::now()) {
        return Err(ApiError::bad_request("Confirmation code has expired"));
    }

    store
        .confirm_user(code.id, code.user_id)
        .api_err("Failed to confirm user")?;

    Ok::<_, ApiError>("Account confirmed")
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let user = store
        .get_user_by_name(&req.name)
        .api_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    // Seeded accounts carry no password and cannot log in
    let hash = user
        .password
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&req.password, hash).api_err("Failed to verify password")? {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    if user.access_level == AccessLevel::Unconfirmed {
        return Err(ApiError::forbidden("Account has not been confirmed"));
    }

    let (_, raw_token) = issue_token(store, user.id, state.config.session_ttl())
        .api_err("Failed to create token")?;

    tracing::info!("User {} logged in", user.id);

    Ok::<_, ApiError>(Json(LoginResponse {
        token: raw_token,
        user: with_profile(store, user)?,
    }))
}

pub async fn logout(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state
        .store
        .delete_token(&session.token.id)
        .api_err("Failed to delete token")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn me(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let user: UserWithProfile = with_profile(state.store.as_ref(), session.user)?;
    Ok::<_, ApiError>(Json(user))
}
