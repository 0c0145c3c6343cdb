use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};
use axum_extra::extract::cookie::Key;

use crate::db::UserStorage;
use crate::search::ranking::RankingService;
use crate::server::handlers;

#[derive(Clone)]
pub struct AppState {
    pub storage: UserStorage,
    pub ranking: Arc<RankingService>,
    key: Key,
}

impl AppState {
    /// `session_secret` must be at least 32 bytes; `Config::load` enforces
    /// this before we get here.
    pub fn new(storage: UserStorage, ranking: Arc<RankingService>, session_secret: &str) -> Self {
        Self {
            storage,
            ranking,
            key: Key::derive_from(session_secret.as_bytes()),
        }
    }
}

// Lets PrivateCookieJar pull its encryption key out of the shared state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/signup", get(handlers::signup_page).post(handlers::signup))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/search", post(handlers::search))
        .with_state(state)
}
