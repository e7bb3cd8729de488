use crate::{
    AppState,
    auth::{self, CurrentUser, MaybeUser},
    errors::{AppError, AuthError},
    flash::{self, Flash},
    forms::{self, CollectionCreateForm, CollectionRequest, FormErrors, GifSearchForm, LoginForm, RegistrationForm},
    services, views,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// GET / : the search form.
pub async fn index(MaybeUser(user): MaybeUser, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::index_page(user.as_ref(), flash, "", &FormErrors::default()))
}

/// POST / : caches the term's GIFs and shows them.
pub async fn search(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<GifSearchForm>,
) -> Result<Response, AppError> {
    let term = match form.validate() {
        Ok(term) => term,
        Err(errors) => {
            let page = views::index_page(user.as_ref(), None, &form.search, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    services::get_or_create_search_term(&state, &term).await?;
    Ok(Redirect::to(&views::search_results_path(&term)).into_response())
}

pub async fn login_form(Query(query): Query<NextQuery>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::login_page(flash, query.next.as_deref(), "", &FormErrors::default(), false))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = query.next.as_deref();
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = views::login_page(None, next, &form.email, &errors, false);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match auth::login(&state, jar, &credentials).await {
        Ok((jar, _user)) => Ok((jar, Redirect::to(auth::safe_next(next))).into_response()),
        Err(AuthError::InvalidCredentials) => {
            let page = views::login_page(None, next, &form.email, &FormErrors::default(), true);
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let jar = auth::logout(&state, jar).await;
    tracing::info!(user_id = user.id, "User logged out");
    (flash::set(jar, Flash::LoggedOut), Redirect::to("/"))
}

pub async fn register_form() -> Html<String> {
    views::register_page("", "", &FormErrors::default())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    match auth::register(&state, &form).await {
        Ok(_user) => Ok((flash::set(jar, Flash::Registered), Redirect::to("/login")).into_response()),
        Err(AuthError::Validation(errors)) => {
            let page = views::register_page(&form.email, &form.username, &errors);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn secret(CurrentUser(_user): CurrentUser) -> &'static str {
    "Only authenticated users can do this! Try to log in or contact the site admin."
}

/// GET /gifs_searched/{term}
pub async fn search_results(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(term): Path<String>,
) -> Result<Html<String>, AppError> {
    let search_term = state
        .search_terms
        .find_by_term(&term)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Search term '{}'", term)))?;
    let gifs = state.search_terms.gifs_for(search_term.id).await?;
    Ok(views::search_results_page(user.as_ref(), &search_term, &gifs))
}

pub async fn search_terms(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let terms = state.search_terms.list_all().await?;
    Ok(views::search_terms_page(user.as_ref(), &terms))
}

pub async fn all_gifs(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let gifs = state.gifs.list_all().await?;
    let mut listing = Vec::with_capacity(gifs.len());
    for gif in gifs {
        let terms = state.search_terms.terms_for_gif(gif.id).await?;
        listing.push((gif, terms));
    }
    tracing::debug!("Listing {} gifs", listing.len());
    Ok(views::all_gifs_page(user.as_ref(), &listing))
}

pub async fn create_collection_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let gifs = state.gifs.list_all().await?;
    Ok(views::create_collection_page(&user, &gifs, "", &[], &FormErrors::default()))
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    axum_extra::extract::Form(form): axum_extra::extract::Form<CollectionCreateForm>,
) -> Result<Response, AppError> {
    let rerender = |gifs: &[crate::models::Gif], selected: &[i64], errors: &FormErrors| {
        let page = views::create_collection_page(&user, gifs, &form.name, selected, errors);
        (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
    };

    let CollectionRequest { name, gif_ids } = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            let gifs = state.gifs.list_all().await?;
            return Ok(rerender(&gifs, &[], &errors));
        }
    };

    let picked = state.gifs.get_many(&gif_ids).await?;
    if picked.len() != gif_ids.len() {
        tracing::debug!(user_id = user.id, "Collection form picked unknown gifs");
        let mut errors = FormErrors::default();
        errors.add("gif_picks", forms::INVALID_CHOICE);
        let gifs = state.gifs.list_all().await?;
        return Ok(rerender(&gifs, &gif_ids, &errors));
    }

    services::get_or_create_collection(&state, &name, &user, &picked).await?;
    Ok((flash::set(jar, Flash::CollectionCreated), Redirect::to("/collections")).into_response())
}

pub async fn collections(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let collections = state.collections.list_for_user(user.id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, views::collections_page(&user, flash, &collections)))
}

/// GET /collection/{id}
pub async fn collection(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let not_found = || AppError::NotFound(format!("Collection '{}'", id));
    let collection_id: i64 = id.parse().map_err(|_| not_found())?;
    let collection = state
        .collections
        .get_by_id(collection_id)
        .await?
        .ok_or_else(not_found)?;

    let owner = state.users.get_by_id(collection.user_id).await?;
    let gifs = state.collections.gifs_for(collection.id).await?;
    Ok(views::collection_page(user.as_ref(), &collection, owner.as_ref(), &gifs))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Page".to_string())
}
