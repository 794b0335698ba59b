use crate::auth::Session;
use crate::server::response::ApiError;

/// Owners may change their own rows; moderators and admins may change any row.
pub fn require_owner_or_moderator(
    session: &Session,
    owner_id: Option<i64>,
) -> Result<(), ApiError> {
    if session.user.access_level.can_moderate() || owner_id == Some(session.user.id) {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "You do not have permission to modify this record",
    ))
}

pub fn require_moderator(session: &Session) -> Result<(), ApiError> {
    if session.user.access_level.can_moderate() {
        return Ok(());
    }
    Err(ApiError::forbidden("Moderator access required"))
}

pub fn require_self_or_admin(session: &Session, user_id: i64) -> Result<(), ApiError> {
    if session.user.id == user_id || session.user.access_level.is_admin() {
        return Ok(());
    }
    Err(ApiError::forbidden("You can only modify your own account"))
}
