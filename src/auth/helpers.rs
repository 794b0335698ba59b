use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{TokenGenerator, parse_token};
use crate::error::{Error, Result};
use crate::store::DataStore;
use crate::types::{Token, User};

const MAX_LOOKUP_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidToken,
    TokenExpired,
    InternalError,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Token,
    pub user: User,
}

/// Validates a raw token string against the store and resolves its user.
pub fn validate_token(
    store: &dyn DataStore,
    raw_token: &str,
) -> std::result::Result<Session, TokenValidationError> {
    let (lookup, _secret) =
        parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = store
        .get_token_by_lookup(&lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let user = store
        .get_user(token.user_id)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    if let Err(e) = store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(Session { token, user })
}

/// Creates and persists a token for `user_id`, returning the raw token string.
/// Lookup collisions are retried with a fresh token.
pub fn issue_token(
    store: &dyn DataStore,
    user_id: i64,
    ttl: Option<Duration>,
) -> Result<(Token, String)> {
    let generator = TokenGenerator::new();

    for _ in 0..MAX_LOOKUP_ATTEMPTS {
        let (raw_token, lookup, hash) = generator.generate()?;
        let now = Utc::now();
        let token = Token {
            id: Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            user_id,
            created_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
            last_used_at: None,
        };

        match store.create_token(&token) {
            Ok(()) => return Ok((token, raw_token)),
            Err(Error::TokenLookupCollision) => {
                tracing::warn!("Token lookup collision, regenerating");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenLookupCollision)
}
