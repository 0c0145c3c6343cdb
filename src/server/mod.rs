pub mod handlers;
pub mod router;
pub mod templates;

pub use router::{AppState, app_router};
