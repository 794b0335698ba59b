use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::validate_count;
use crate::types::{BulkTarget, MAX_BULK_COUNT};

fn parse_request(target: &str, count: &str) -> Result<(BulkTarget, u32), ApiError> {
    let target = BulkTarget::parse(target)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown bulk target '{target}'")))?;

    let count = count.parse::<i64>().map_err(|_| {
        ApiError::bad_request(format!(
            "Please enter a valid number (0 < n <= {MAX_BULK_COUNT})"
        ))
    })?;

    Ok((target, validate_count(count)?))
}

/// Generates `count` synthetic rows of `target`, owned by the calling admin.
pub async fn seed(
    RequireAdmin(session): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((target, count)): Path<(String, String)>,
) -> impl IntoResponse {
    let (target, count) = parse_request(&target, &count)?;

    let inserted = state
        .store
        .seed(target, count, Some(session.user.id))
        .api_err("Failed to generate rows")?;

    tracing::info!(
        "Seeded {target}: requested {count}, inserted {inserted} (admin {})",
        session.user.id
    );

    let message = if inserted < u64::from(count) {
        format!(
            "Generated {inserted} of {count} requested {}; no free store and employee pairs were left",
            target.noun()
        )
    } else {
        format!("Successfully generated {inserted} {}", target.noun())
    };

    Ok::<_, ApiError>(message)
}

/// Deletes the first `count` rows of `target` in key order.
pub async fn purge(
    RequireAdmin(session): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((target, count)): Path<(String, String)>,
) -> impl IntoResponse {
    let (target, count) = parse_request(&target, &count)?;

    let deleted = state
        .store
        .purge(target, count)
        .api_err("Failed to delete rows")?;

    tracing::info!(
        "Purged {target}: requested {count}, deleted {deleted} (admin {})",
        session.user.id
    );

    Ok::<_, ApiError>(format!("Successfully deleted {deleted} {}", target.noun()))
}

pub async fn set_page_preferences(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(value): Path<String>,
) -> impl IntoResponse {
    let value = value
        .parse::<i64>()
        .map_err(|_| {
            ApiError::bad_request(format!(
                "Please enter a valid number (0 < n <= {MAX_BULK_COUNT})"
            ))
        })
        .and_then(validate_count)?;

    let updated = state
        .store
        .set_all_page_preferences(i64::from(value))
        .api_err("Failed to update page preferences")?;

    tracing::info!("Page preference set to {value} on {updated} profiles");

    Ok::<_, ApiError>(format!(
        "Successfully updated page preference to {value} for {updated} users"
    ))
}
