use crate::{domain::GifSearchClient, errors::GifSearchError, models::NewGif};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

/// Number of results requested from, and accepted from, the provider.
pub const SEARCH_LIMIT: usize = 5;

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<GiphyGif>,
}

#[derive(Deserialize, Debug)]
struct GiphyGif {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

/// `GifSearchClient` backed by the Giphy search endpoint.
#[derive(Debug, Clone)]
pub struct GiphyClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GiphyClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        tracing::info!(%endpoint, "Initializing GiphyClient");
        Self { http, endpoint, api_key }
    }
}

#[async_trait]
impl GifSearchClient for GiphyClient {
    async fn search(&self, term: &str) -> Result<Vec<NewGif>, GifSearchError> {
        tracing::debug!(%term, "Giphy: Searching");

        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str()), ("q", term), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%term, %status, "Giphy: Search rejected");
            return Err(GifSearchError::Status(status));
        }

        let body = response.text().await?;
        let gifs = parse_search_response(&body)?;
        tracing::debug!(%term, count = gifs.len(), "Giphy: Search complete");
        Ok(gifs)
    }
}

/// Decodes a search response body, dropping entries without a title or URL
/// and repeated titles, and keeping at most `SEARCH_LIMIT` entries.
fn parse_search_response(body: &str) -> Result<Vec<NewGif>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let mut seen = HashSet::new();

    Ok(response
        .data
        .into_iter()
        .map(|gif| NewGif {
            title: gif.title.trim().to_string(),
            url: gif.url.trim().to_string(),
        })
        .filter(|gif| {
            let usable = !gif.title.is_empty() && !gif.url.is_empty();
            if !usable {
                tracing::debug!(?gif, "Giphy: Skipping result without title or url");
            }
            usable && seen.insert(gif.title.clone())
        })
        .take(SEARCH_LIMIT)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_title_and_url_in_provider_order() {
        let body = r#"{
            "data": [
                {"title": "Funny Cat", "url": "https://giphy.com/gifs/1", "id": "1"},
                {"title": "Sleepy Cat", "url": "https://giphy.com/gifs/2", "id": "2"}
            ],
            "meta": {"status": 200}
        }"#;
        let gifs = parse_search_response(body).unwrap();
        assert_eq!(
            gifs,
            vec![
                NewGif { title: "Funny Cat".into(), url: "https://giphy.com/gifs/1".into() },
                NewGif { title: "Sleepy Cat".into(), url: "https://giphy.com/gifs/2".into() },
            ]
        );
    }

    #[test]
    fn drops_blank_and_repeated_titles() {
        let body = r#"{"data": [
            {"title": "", "url": "https://giphy.com/gifs/0"},
            {"title": "Cat", "url": ""},
            {"title": "Cat", "url": "https://giphy.com/gifs/1"},
            {"title": "Cat", "url": "https://giphy.com/gifs/2"},
            {"url": "https://giphy.com/gifs/3"}
        ]}"#;
        let gifs = parse_search_response(body).unwrap();
        assert_eq!(gifs.len(), 1);
        assert_eq!(gifs[0].url, "https://giphy.com/gifs/1");
    }

    #[test]
    fn caps_results_at_the_limit() {
        let items: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"title": "gif {i}", "url": "https://giphy.com/gifs/{i}"}}"#))
            .collect();
        let body = format!(r#"{{"data": [{}]}}"#, items.join(","));
        assert_eq!(parse_search_response(&body).unwrap().len(), SEARCH_LIMIT);
    }

    #[test]
    fn missing_data_is_an_empty_result_and_garbage_is_an_error() {
        assert!(parse_search_response("{}").unwrap().is_empty());
        assert!(parse_search_response("<html>").is_err());
    }
}
