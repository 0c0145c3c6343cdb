//! The five user-facing flows: signup, login, logout, home, search.
//! Recoverable store failures become inline page messages here; nothing
//! user-triggered should ever surface as a raw error page.

use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::auth::password;
use crate::auth::session::{self, RequireLogin};
use crate::error::AppError;
use crate::server::router::AppState;
use crate::server::templates;

const SEARCH_TOP_K: usize = 5;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub query: String,
}

pub async fn signup_page() -> Html<String> {
    Html(templates::signup_page(""))
}

pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Html(templates::signup_page("Provide username & password.")).into_response();
    }

    let created = match password::hash_password(&form.password) {
        Ok(hashed) => state.storage.create_user(username, &hashed).await,
        Err(e) => Err(e),
    };

    match created {
        Ok(id) => {
            info!(username, id, "user registered");
            Redirect::to("/login").into_response()
        }
        Err(AppError::DuplicateUsername) => {
            Html(templates::signup_page("Username already exists.")).into_response()
        }
        Err(e) => Html(templates::signup_page(&format!("DB error: {e}"))).into_response(),
    }
}

pub async fn login_page() -> Html<String> {
    Html(templates::login_page(""))
}

pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let user = match state.storage.find_by_username(&form.username).await {
        Ok(user) => user,
        Err(e) => {
            return Html(templates::login_page(&format!("DB error: {e}"))).into_response();
        }
    };

    // One generic message for both unknown username and wrong password, so
    // the response does not reveal which usernames exist.
    let Some(user) = user.filter(|u| password::verify_password(&form.password, &u.password_hash))
    else {
        return Html(templates::login_page("Invalid username or password.")).into_response();
    };

    info!(username = %user.username, "login");
    let jar = session::start_session(jar, &user);
    (jar, Redirect::to("/")).into_response()
}

pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    (session::end_session(jar), Redirect::to("/login"))
}

pub async fn home(RequireLogin(user): RequireLogin) -> Html<String> {
    Html(templates::home_page(&user, None, None))
}

pub async fn search(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let results = state.ranking.search(&form.query, SEARCH_TOP_K);
    info!(
        username = %user.username,
        query = %form.query,
        hits = results.len(),
        degraded = state.ranking.is_degraded(),
        "search"
    );
    Html(templates::home_page(&user, Some(&form.query), Some(&results)))
}
