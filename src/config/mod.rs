mod server;

pub use server::{DEFAULT_CONFIRMATION_TTL_MINUTES, DEFAULT_MAX_PAGE_SIZE, ServerConfig};
