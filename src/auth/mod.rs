mod helpers;
mod middleware;
mod password;
mod token;

pub use helpers::{Session, TokenValidationError, issue_token, validate_token};
pub use middleware::{AuthError, RequireAdmin, RequireAuth};
pub use password::{generate_password, hash_password, verify_password};
pub use token::{TokenGenerator, parse_token};
