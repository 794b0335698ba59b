mod bulk;
mod enums;
mod models;

pub use bulk::{BulkTarget, MAX_BULK_COUNT, validate_bulk_count};
pub use enums::{AccessLevel, Category, Gender, MaritalStatus, UnknownVariant};
pub use models::*;
