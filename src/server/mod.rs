mod api;
pub mod dto;
pub mod response;
mod router;
pub mod validation;

pub use api::access;
pub use router::{AppState, create_router};
