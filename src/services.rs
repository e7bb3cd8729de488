//! Get-or-create helpers shared by the request handlers.

use crate::{
    AppState,
    errors::AppError,
    models::{Gif, GifCollection, NewGif, SearchTerm, User},
};

/// Returns the cached GIF titled `title`, storing it with `url` on first sight.
pub async fn get_or_create_gif(state: &AppState, title: &str, url: &str) -> Result<Gif, AppError> {
    if title.trim().is_empty() || url.trim().is_empty() {
        return Err(AppError::InvalidInput("a GIF needs a title and a url".to_string()));
    }

    let gif = state
        .gifs
        .get_or_insert(&NewGif {
            title: title.to_string(),
            url: url.to_string(),
        })
        .await?;
    Ok(gif)
}

/// Returns the cached search term, querying the provider only the first time
/// a term is seen. The cached GIF set never refreshes.
pub async fn get_or_create_search_term(state: &AppState, term: &str) -> Result<SearchTerm, AppError> {
    if let Some(existing) = state.search_terms.find_by_term(term).await? {
        tracing::debug!(%term, search_term_id = existing.id, "Search term served from cache");
        return Ok(existing);
    }

    let results = state.gif_search.search(term).await?;

    let mut gif_ids = Vec::with_capacity(results.len());
    for result in &results {
        let gif = get_or_create_gif(state, &result.title, &result.url).await?;
        gif_ids.push(gif.id);
    }

    let search_term = state.search_terms.create(term, &gif_ids).await?;
    tracing::info!(%term, search_term_id = search_term.id, gifs = gif_ids.len(), "Search term cached");
    Ok(search_term)
}

/// Returns `owner`'s collection titled `name`, creating it with `gifs` when it
/// does not exist yet. An existing collection is returned unchanged.
pub async fn get_or_create_collection(
    state: &AppState,
    name: &str,
    owner: &User,
    gifs: &[Gif],
) -> Result<GifCollection, AppError> {
    if let Some(existing) = state.collections.find_by_title(name, owner.id).await? {
        tracing::debug!(collection_id = existing.id, user_id = owner.id, "Collection already exists");
        return Ok(existing);
    }

    let gif_ids: Vec<i64> = gifs.iter().map(|gif| gif.id).collect();
    let collection = state.collections.create(name, owner.id, &gif_ids).await?;
    tracing::info!(
        collection_id = collection.id,
        user_id = owner.id,
        gifs = gif_ids.len(),
        "Collection created"
    );
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeGifSearch, gif, test_state, test_user};

    #[tokio::test]
    async fn search_term_is_fetched_once_and_then_cached() {
        let search = FakeGifSearch::new().with_results("cats", &[("Funny Cat", "https://g/1"), ("Sleepy Cat", "https://g/2")]);
        let state = test_state(search.clone()).await;

        let first = get_or_create_search_term(&state, "cats").await.unwrap();
        let second = get_or_create_search_term(&state, "cats").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(search.calls(), 1);

        let first_gifs = state.search_terms.gifs_for(first.id).await.unwrap();
        let second_gifs = state.search_terms.gifs_for(second.id).await.unwrap();
        assert_eq!(first_gifs, second_gifs);
        let titles: Vec<&str> = first_gifs.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["Funny Cat", "Sleepy Cat"]);
    }

    #[tokio::test]
    async fn shared_gif_is_reused_across_terms() {
        let search = FakeGifSearch::new()
            .with_results("cats", &[("Funny Cat", "https://g/1")])
            .with_results("funny", &[("Funny Cat", "https://g/other"), ("Funny Dog", "https://g/3")]);
        let state = test_state(search).await;

        let cats = get_or_create_search_term(&state, "cats").await.unwrap();
        let funny = get_or_create_search_term(&state, "funny").await.unwrap();

        let from_cats = state.search_terms.gifs_for(cats.id).await.unwrap();
        let from_funny = state.search_terms.gifs_for(funny.id).await.unwrap();
        assert_eq!(from_cats[0], from_funny[0]);
        assert_eq!(from_funny[0].url, "https://g/1");
        assert_eq!(state.gifs.list_all().await.unwrap().len(), 2);

        let terms = state.search_terms.terms_for_gif(from_cats[0].id).await.unwrap();
        assert_eq!(terms, vec![cats, funny]);
    }

    #[tokio::test]
    async fn empty_provider_results_still_cache_the_term() {
        let search = FakeGifSearch::new();
        let state = test_state(search.clone()).await;

        let term = get_or_create_search_term(&state, "nothing").await.unwrap();
        get_or_create_search_term(&state, "nothing").await.unwrap();

        assert!(state.search_terms.gifs_for(term.id).await.unwrap().is_empty());
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn provider_failure_caches_nothing() {
        let search = FakeGifSearch::failing();
        let state = test_state(search.clone()).await;

        let err = get_or_create_search_term(&state, "cats").await.unwrap_err();
        assert!(matches!(err, AppError::GifSearchError(_)));
        assert!(state.search_terms.find_by_term("cats").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gifs_need_a_title_and_url() {
        let state = test_state(FakeGifSearch::new()).await;
        assert!(matches!(
            get_or_create_gif(&state, " ", "https://g/1").await,
            Err(AppError::InvalidInput(_))
        ));
        let first = get_or_create_gif(&state, "Funny Cat", "https://g/1").await.unwrap();
        let again = get_or_create_gif(&state, "Funny Cat", "https://g/2").await.unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn collection_is_created_once_per_owner_and_name() {
        let state = test_state(FakeGifSearch::new()).await;
        let alice = test_user(&state, "alice").await;
        let bob = test_user(&state, "bob").await;
        let cat = gif(&state, "Funny Cat").await;
        let dog = gif(&state, "Funny Dog").await;

        let favorites = get_or_create_collection(&state, "Favorites", &alice, &[cat.clone()]).await.unwrap();
        let again = get_or_create_collection(&state, "Favorites", &alice, &[dog]).await.unwrap();
        assert_eq!(favorites, again);
        assert_eq!(state.collections.gifs_for(favorites.id).await.unwrap(), vec![cat]);
        assert_eq!(state.collections.list_for_user(alice.id).await.unwrap().len(), 1);

        let bobs = get_or_create_collection(&state, "Favorites", &bob, &[]).await.unwrap();
        assert_ne!(bobs.id, favorites.id);
        assert_eq!(bobs.user_id, bob.id);
    }

    #[tokio::test]
    async fn concurrent_identical_collections_converge() {
        let state = test_state(FakeGifSearch::new()).await;
        let alice = test_user(&state, "alice").await;

        let (a, b) = tokio::join!(
            get_or_create_collection(&state, "Favorites", &alice, &[]),
            get_or_create_collection(&state, "Favorites", &alice, &[]),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(state.collections.list_for_user(alice.id).await.unwrap().len(), 1);
    }
}
