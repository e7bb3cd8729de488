//! Registration, login, logout and the session-backed identity extractors.

use crate::{
    AppState,
    errors::{AppError, AuthError, RepoError},
    forms::{self, Credentials, FormErrors, Registration},
    models::{NewUser, User},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "gif_collector_session";

/// Hashes `password` with Argon2id and a fresh random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Checks `password` against a stored PHC hash. Malformed hashes never match.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// Validates a registration and stores the new user.
///
/// Field errors, an already registered email and an already taken username
/// are all reported as `AuthError::Validation`.
pub async fn register(state: &AppState, form: &forms::RegistrationForm) -> Result<User, AuthError> {
    let Registration { email, username, password } = form.validate().map_err(AuthError::Validation)?;

    let mut errors = FormErrors::default();
    if state.users.find_by_email(&email).await?.is_some() {
        errors.add("email", forms::EMAIL_TAKEN);
    }
    if state.users.find_by_username(&username).await?.is_some() {
        errors.add("username", forms::USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))??;

    let new_user = NewUser {
        username,
        email,
        password_hash,
    };
    match state.users.create(&new_user).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "User registered");
            Ok(user)
        }
        // Lost a race with an identical registration between lookup and insert.
        Err(RepoError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("username", forms::USERNAME_TAKEN);
            Err(AuthError::Validation(errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// Verifies credentials without revealing which of email or password was wrong.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, AuthError> {
    let Some(user) = state.users.find_by_email(email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    if verified {
        Ok(user)
    } else {
        tracing::debug!(user_id = user.id, "Login attempt with wrong password");
        Err(AuthError::InvalidCredentials)
    }
}

/// Authenticates and opens a session, returning the jar with the session cookie.
pub async fn login(state: &AppState, jar: CookieJar, credentials: &Credentials) -> Result<(CookieJar, User), AuthError> {
    let user = authenticate(state, &credentials.email, &credentials.password).await?;

    if let Some(previous) = session_id(&jar) {
        state.sessions.destroy(previous).await;
    }
    let new_session = state.sessions.create(user.id).await;
    tracing::info!(user_id = user.id, remember_me = credentials.remember_me, "User logged in");

    Ok((jar.add(session_cookie(new_session.to_string(), credentials.remember_me)), user))
}

/// Ends the current session, if any, and clears the cookie.
pub async fn logout(state: &AppState, jar: CookieJar) -> CookieJar {
    if let Some(id) = session_id(&jar) {
        state.sessions.destroy(id).await;
    }
    jar.remove(session_cookie(String::new(), false))
}

/// Resolves the session cookie to a user. Unknown, expired or orphaned
/// sessions count as anonymous.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Result<Option<User>, AppError> {
    let Some(id) = session_id(jar) else {
        return Ok(None);
    };
    let Some(user_id) = state.sessions.user_id(id).await else {
        return Ok(None);
    };
    Ok(state.users.get_by_id(user_id).await?)
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE).and_then(|c| Uuid::parse_str(c.value()).ok())
}

fn session_cookie(value: String, persistent: bool) -> Cookie<'static> {
    let builder = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if persistent { builder.permanent().build() } else { builder.build() }
}

/// Login page URL that returns to `next` afterwards.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("/login?next={}", utf8_percent_encode(next, NON_ALPHANUMERIC)),
        None => "/login".to_string(),
    }
}

/// Only local absolute paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

/// The logged-in user. Anonymous requests are redirected to the login page
/// with the original path and query preserved in `next`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match current_user(state, &jar).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let requested = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
                tracing::debug!(%requested, "Anonymous request to a login-only page");
                Err(Redirect::to(&login_url(Some(requested))).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

/// The logged-in user, if any; used for navigation on public pages.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeUser(current_user(state, &jar).await?))
    }
}
