use crate::{
    domain::{CollectionRepository, GifRepository, SearchTermRepository, UserRepository},
    errors::RepoError,
    models::{Gif, GifCollection, NewGif, NewUser, SearchTerm, User},
};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{self, info};

/// Relational store backing every repository trait with one SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        info!("Initializing SqliteStore");
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn create(&self, user: &NewUser) -> Result<User, RepoError> {
        let result = sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                tracing::debug!(user_id = id, username = %user.username, "SQLite: Inserted user");
                Ok(User {
                    id,
                    username: user.username.clone(),
                    email: user.email.clone(),
                    password_hash: user.password_hash.clone(),
                })
            }
            Err(e) if is_unique_violation(&e) => Err(RepoError::Conflict(format!(
                "user with username '{}' or email '{}'",
                user.username, user.email
            ))),
            Err(e) => Err(RepoError::BackendError(
                anyhow::Error::new(e).context(format!("SQLite: Failed to insert user '{}'", user.username)),
            )),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("SQLite: Failed to get user (id: {})", id))
            .map_err(RepoError::BackendError)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("SQLite: Failed to look up user by email")
            .map_err(RepoError::BackendError)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context(format!("SQLite: Failed to look up user '{}'", username))
            .map_err(RepoError::BackendError)
    }
}

#[async_trait]
impl GifRepository for SqliteStore {
    async fn get_or_insert(&self, gif: &NewGif) -> Result<Gif, RepoError> {
        let inserted = sqlx::query("INSERT INTO gifs (title, url) VALUES (?, ?) ON CONFLICT (title) DO NOTHING")
            .bind(&gif.title)
            .bind(&gif.url)
            .execute(&self.pool)
            .await
            .context(format!("SQLite: Failed to insert gif '{}'", gif.title))
            .map_err(RepoError::BackendError)?;

        if inserted.rows_affected() == 1 {
            tracing::debug!(title = %gif.title, "SQLite: Inserted new gif");
        }

        sqlx::query_as::<_, Gif>("SELECT id, title, url FROM gifs WHERE title = ?")
            .bind(&gif.title)
            .fetch_one(&self.pool)
            .await
            .context(format!("SQLite: Failed to read back gif '{}'", gif.title))
            .map_err(RepoError::BackendError)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Gif>, RepoError> {
        sqlx::query_as::<_, Gif>("SELECT id, title, url FROM gifs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("SQLite: Failed to get gif (id: {})", id))
            .map_err(RepoError::BackendError)
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Gif>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, title, url FROM gifs WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        builder
            .build_query_as::<Gif>()
            .fetch_all(&self.pool)
            .await
            .context(format!("SQLite: Failed to get {} gifs by id", ids.len()))
            .map_err(RepoError::BackendError)
    }

    async fn list_all(&self) -> Result<Vec<Gif>, RepoError> {
        let gifs = sqlx::query_as::<_, Gif>("SELECT id, title, url FROM gifs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("SQLite: Failed to list gifs")
            .map_err(RepoError::BackendError)?;
        tracing::debug!("SQLite: Listed {} gifs", gifs.len());
        Ok(gifs)
    }
}

#[async_trait]
impl SearchTermRepository for SqliteStore {
    async fn find_by_term(&self, term: &str) -> Result<Option<SearchTerm>, RepoError> {
        sqlx::query_as::<_, SearchTerm>("SELECT id, term FROM search_terms WHERE term = ?")
            .bind(term)
            .fetch_optional(&self.pool)
            .await
            .context(format!("SQLite: Failed to look up search term '{}'", term))
            .map_err(RepoError::BackendError)
    }

    async fn create(&self, term: &str, gif_ids: &[i64]) -> Result<SearchTerm, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("SQLite: Failed to begin search term transaction")
            .map_err(RepoError::BackendError)?;

        let inserted = sqlx::query("INSERT INTO search_terms (term) VALUES (?) ON CONFLICT (term) DO NOTHING")
            .bind(term)
            .execute(&mut *tx)
            .await
            .context(format!("SQLite: Failed to insert search term '{}'", term))
            .map_err(RepoError::BackendError)?;

        let search_term = sqlx::query_as::<_, SearchTerm>("SELECT id, term FROM search_terms WHERE term = ?")
            .bind(term)
            .fetch_one(&mut *tx)
            .await
            .context(format!("SQLite: Failed to read back search term '{}'", term))
            .map_err(RepoError::BackendError)?;

        // A term created concurrently keeps the snapshot it was created with.
        if inserted.rows_affected() == 1 {
            for (position, gif_id) in gif_ids.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO search_gifs (search_id, gif_id, position) VALUES (?, ?, ?) \
                     ON CONFLICT (search_id, gif_id) DO NOTHING",
                )
                .bind(search_term.id)
                .bind(gif_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .context(format!("SQLite: Failed to link gif {} to search term '{}'", gif_id, term))
                .map_err(RepoError::BackendError)?;
            }
        } else {
            tracing::debug!(%term, "SQLite: Search term already existed, links unchanged");
        }

        tx.commit()
            .await
            .context(format!("SQLite: Failed to commit search term '{}'", term))
            .map_err(RepoError::BackendError)?;

        Ok(search_term)
    }

    async fn list_all(&self) -> Result<Vec<SearchTerm>, RepoError> {
        sqlx::query_as::<_, SearchTerm>("SELECT id, term FROM search_terms ORDER BY term")
            .fetch_all(&self.pool)
            .await
            .context("SQLite: Failed to list search terms")
            .map_err(RepoError::BackendError)
    }

    async fn gifs_for(&self, search_term_id: i64) -> Result<Vec<Gif>, RepoError> {
        sqlx::query_as::<_, Gif>(
            "SELECT g.id, g.title, g.url FROM gifs g \
             JOIN search_gifs sg ON sg.gif_id = g.id \
             WHERE sg.search_id = ? ORDER BY sg.position",
        )
        .bind(search_term_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("SQLite: Failed to list gifs for search term (id: {})", search_term_id))
        .map_err(RepoError::BackendError)
    }

    async fn terms_for_gif(&self, gif_id: i64) -> Result<Vec<SearchTerm>, RepoError> {
        sqlx::query_as::<_, SearchTerm>(
            "SELECT st.id, st.term FROM search_terms st \
             JOIN search_gifs sg ON sg.search_id = st.id \
             WHERE sg.gif_id = ? ORDER BY st.term",
        )
        .bind(gif_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("SQLite: Failed to list search terms for gif (id: {})", gif_id))
        .map_err(RepoError::BackendError)
    }
}

#[async_trait]
impl CollectionRepository for SqliteStore {
    async fn find_by_title(&self, title: &str, user_id: i64) -> Result<Option<GifCollection>, RepoError> {
        sqlx::query_as::<_, GifCollection>(
            "SELECT id, title, user_id FROM collections WHERE title = ? AND user_id = ?",
        )
        .bind(title)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("SQLite: Failed to look up collection '{}' (user: {})", title, user_id))
        .map_err(RepoError::BackendError)
    }

    async fn create(&self, title: &str, user_id: i64, gif_ids: &[i64]) -> Result<GifCollection, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("SQLite: Failed to begin collection transaction")
            .map_err(RepoError::BackendError)?;

        let inserted = sqlx::query(
            "INSERT INTO collections (title, user_id) VALUES (?, ?) ON CONFLICT (user_id, title) DO NOTHING",
        )
        .bind(title)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context(format!("SQLite: Failed to insert collection '{}' (user: {})", title, user_id))
        .map_err(RepoError::BackendError)?;

        let collection = sqlx::query_as::<_, GifCollection>(
            "SELECT id, title, user_id FROM collections WHERE title = ? AND user_id = ?",
        )
        .bind(title)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .context(format!("SQLite: Failed to read back collection '{}' (user: {})", title, user_id))
        .map_err(RepoError::BackendError)?;

        if inserted.rows_affected() == 1 {
            for gif_id in gif_ids {
                sqlx::query(
                    "INSERT INTO collection_gifs (collection_id, gif_id) VALUES (?, ?) \
                     ON CONFLICT (collection_id, gif_id) DO NOTHING",
                )
                .bind(collection.id)
                .bind(gif_id)
                .execute(&mut *tx)
                .await
                .context(format!("SQLite: Failed to add gif {} to collection {}", gif_id, collection.id))
                .map_err(RepoError::BackendError)?;
            }
        }

        tx.commit()
            .await
            .context(format!("SQLite: Failed to commit collection '{}'", title))
            .map_err(RepoError::BackendError)?;

        Ok(collection)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GifCollection>, RepoError> {
        sqlx::query_as::<_, GifCollection>("SELECT id, title, user_id FROM collections WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("SQLite: Failed to get collection (id: {})", id))
            .map_err(RepoError::BackendError)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<GifCollection>, RepoError> {
        sqlx::query_as::<_, GifCollection>(
            "SELECT id, title, user_id FROM collections WHERE user_id = ? ORDER BY title",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("SQLite: Failed to list collections (user: {})", user_id))
        .map_err(RepoError::BackendError)
    }

    async fn gifs_for(&self, collection_id: i64) -> Result<Vec<Gif>, RepoError> {
        sqlx::query_as::<_, Gif>(
            "SELECT g.id, g.title, g.url FROM gifs g \
             JOIN collection_gifs cg ON cg.gif_id = g.id \
             WHERE cg.collection_id = ? ORDER BY g.id",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("SQLite: Failed to list gifs for collection (id: {})", collection_id))
        .map_err(RepoError::BackendError)
    }
}
