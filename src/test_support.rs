use crate::{
    AppState,
    db,
    domain::GifSearchClient,
    errors::GifSearchError,
    models::{Gif, NewGif, NewUser, User},
    repositories::SqliteStore,
    sessions::MemorySessionStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Canned search provider that counts how often it is queried.
#[derive(Clone, Default)]
pub struct FakeGifSearch {
    results: Arc<HashMap<String, Vec<NewGif>>>,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeGifSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_results(mut self, term: &str, gifs: &[(&str, &str)]) -> Self {
        let gifs = gifs
            .iter()
            .map(|(title, url)| NewGif {
                title: title.to_string(),
                url: url.to_string(),
            })
            .collect();
        Arc::make_mut(&mut self.results).insert(term.to_string(), gifs);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GifSearchClient for FakeGifSearch {
    async fn search(&self, term: &str) -> Result<Vec<NewGif>, GifSearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GifSearchError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        Ok(self.results.get(term).cloned().unwrap_or_default())
    }
}

pub async fn test_state(search: FakeGifSearch) -> AppState {
    let pool = db::connect("sqlite::memory:").await.unwrap();
    AppState::from_store(
        Arc::new(SqliteStore::new(pool)),
        Arc::new(search),
        Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
    )
}

pub async fn test_user(state: &AppState, username: &str) -> User {
    state
        .users
        .create(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .unwrap()
}

pub async fn gif(state: &AppState, title: &str) -> Gif {
    state
        .gifs
        .get_or_insert(&NewGif {
            title: title.to_string(),
            url: format!("https://giphy.com/gifs/{}", title.replace(' ', "-")),
        })
        .await
        .unwrap()
}
