use crate::errors::{GifSearchError, RepoError};
use crate::models::{Gif, GifCollection, NewGif, NewUser, SearchTerm, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for registered accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Inserts a user. Fails with `RepoError::Conflict` when the username or
    /// email is already taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepoError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Storage for cached GIFs, keyed by title.
#[async_trait]
pub trait GifRepository: Send + Sync + 'static {
    /// Returns the GIF with `gif.title`, inserting it first if absent.
    /// An existing row keeps its original URL.
    async fn get_or_insert(&self, gif: &NewGif) -> Result<Gif, RepoError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Gif>, RepoError>;

    /// Fetches the GIFs whose ids appear in `ids`, in ascending id order.
    /// Unknown ids are skipped.
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Gif>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Gif>, RepoError>;
}

/// Storage for cached search terms and the GIFs each one returned.
#[async_trait]
pub trait SearchTermRepository: Send + Sync + 'static {
    async fn find_by_term(&self, term: &str) -> Result<Option<SearchTerm>, RepoError>;

    /// Stores `term` linked to `gif_ids` (in result order) atomically. If the
    /// term already exists its links are left untouched and the existing row
    /// is returned.
    async fn create(&self, term: &str, gif_ids: &[i64]) -> Result<SearchTerm, RepoError>;

    async fn list_all(&self) -> Result<Vec<SearchTerm>, RepoError>;

    /// GIFs cached for a term, in the order the provider returned them.
    async fn gifs_for(&self, search_term_id: i64) -> Result<Vec<Gif>, RepoError>;

    /// Terms whose cached results include the given GIF.
    async fn terms_for_gif(&self, gif_id: i64) -> Result<Vec<SearchTerm>, RepoError>;
}

/// Storage for user-owned GIF collections.
#[async_trait]
pub trait CollectionRepository: Send + Sync + 'static {
    async fn find_by_title(&self, title: &str, user_id: i64) -> Result<Option<GifCollection>, RepoError>;

    /// Stores a collection for `user_id` with the given GIFs atomically. If a
    /// collection with the same title already exists for that user it is
    /// returned unchanged.
    async fn create(&self, title: &str, user_id: i64, gif_ids: &[i64]) -> Result<GifCollection, RepoError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<GifCollection>, RepoError>;

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<GifCollection>, RepoError>;

    async fn gifs_for(&self, collection_id: i64) -> Result<Vec<Gif>, RepoError>;
}

/// The external GIF search provider.
#[async_trait]
pub trait GifSearchClient: Send + Sync + 'static {
    /// Returns at most five GIFs matching `term`, deduplicated by title, with
    /// non-empty titles and URLs.
    async fn search(&self, term: &str) -> Result<Vec<NewGif>, GifSearchError>;
}

/// Maps opaque session ids to logged-in user ids.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn create(&self, user_id: i64) -> Uuid;

    /// Returns the user id for a live session. Expired sessions are dropped.
    async fn user_id(&self, session_id: Uuid) -> Option<i64>;

    async fn destroy(&self, session_id: Uuid);
}
