use crate::{
    handlers, // Import handlers module
    AppState,
};
use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::search))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/register", get(handlers::register_form).post(handlers::register))
        .route("/secret", get(handlers::secret))
        .route("/gifs_searched/{term}", get(handlers::search_results))
        .route("/search_terms", get(handlers::search_terms))
        .route("/all_gifs", get(handlers::all_gifs))
        .route(
            "/create_collection",
            get(handlers::create_collection_form).post(handlers::create_collection),
        )
        .route("/collections", get(handlers::collections))
        .route("/collection/{id}", get(handlers::collection))
        .fallback(handlers::not_found)
        // Middleware Layers
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
