use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod flash;
pub mod forms;
pub mod giphy;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod startup;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

use crate::domain::{
    CollectionRepository, GifRepository, GifSearchClient, SearchTermRepository, SessionStore, UserRepository,
};

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub gifs: Arc<dyn GifRepository>,
    pub search_terms: Arc<dyn SearchTermRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub gif_search: Arc<dyn GifSearchClient>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Wires every repository to one store that implements them all.
    pub fn from_store<S>(store: Arc<S>, gif_search: Arc<dyn GifSearchClient>, sessions: Arc<dyn SessionStore>) -> Self
    where
        S: UserRepository + GifRepository + SearchTermRepository + CollectionRepository,
    {
        Self {
            users: store.clone(),
            gifs: store.clone(),
            search_terms: store.clone(),
            collections: store,
            gif_search,
            sessions,
        }
    }
}
