use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. The password hash never leaves the server.
#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Fields needed to insert a user; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A GIF cached from the search provider. Deduplicated by `title`.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Gif {
    pub id: i64,
    pub title: String,
    pub url: String,
}

/// A GIF as reported by the search provider, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGif {
    pub title: String,
    pub url: String,
}

#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub id: i64,
    pub term: String,
}

/// A named set of GIFs owned by exactly one user.
#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GifCollection {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
}
