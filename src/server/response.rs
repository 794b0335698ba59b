use axum::{
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};

use crate::error::{Error, Result as StoreResult};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const SEARCH_LIMIT: i64 = 20;

/// API error rendered as a plain-text body with its status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Maps a store error, using `context` as the message for server faults.
    fn from_store(err: Error, context: &str) -> Self {
        match err {
            Error::BadRequest(msg) => Self::bad_request(msg),
            Error::Unauthorized | Error::InvalidTokenFormat | Error::TokenExpired => {
                Self::unauthorized(err.to_string())
            }
            Error::Forbidden => Self::forbidden("Forbidden"),
            Error::NotFound => Self::not_found("Not found"),
            Error::InvalidReference(msg) => Self::not_found(msg),
            Error::Conflict(msg) => Self::conflict(msg),
            other => {
                tracing::error!("{context}: {other}");
                Self::internal(context)
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::from_store(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.message).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer realm=\"storekeep\""));
        }

        response
    }
}

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_store(e, message))
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

/// Resolves a requested page window against the configured maximum.
pub fn page_window(
    offset: Option<i64>,
    limit: Option<i64>,
    max_page_size: i64,
) -> Result<(i64, i64), ApiError> {
    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

    if offset < 0 {
        return Err(ApiError::bad_request("offset cannot be negative"));
    }
    if limit < 1 {
        return Err(ApiError::bad_request("limit must be at least 1"));
    }

    Ok((offset, limit.min(max_page_size)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults_and_clamp() {
        assert_eq!(page_window(None, None, 1000).unwrap(), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(page_window(Some(20), Some(5000), 1000).unwrap(), (20, 1000));
        assert_eq!(page_window(Some(3), Some(7), 1000).unwrap(), (3, 7));
    }

    #[test]
    fn test_page_window_rejects_bad_values() {
        assert_eq!(
            page_window(Some(-1), None, 10).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            page_window(None, Some(0), 10).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let cases = [
            (Error::NotFound, StatusCode::NOT_FOUND),
            (Error::InvalidReference("x".into()), StatusCode::NOT_FOUND),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (Error::Forbidden, StatusCode::FORBIDDEN),
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err: Result<(), _> = Err(Error::Config("secret path".into()));
        let api = err.api_err("Failed to load store").unwrap_err();
        assert_eq!(api.message, "Failed to load store");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::unauthorized("nope").into_response();
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));
    }
}
