mod admin;
mod auth;
mod commands;
pub mod credentials;
pub mod http_client;

pub use admin::{run_admin_page_preference, run_admin_purge, run_admin_seed};
pub use auth::{run_auth_login, run_auth_logout};
pub use commands::{AdminCommands, AuthCommands};
