use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::TaskError;

/// Attached to a recommendation when photo search fails for that query.
pub const FALLBACK_PHOTO_URL: &str =
    "https://images.unsplash.com/photo-1470770841072-f978cf4d019e";

/// Looks up one illustrative photo per recommendation category.
pub struct PhotoSearch {
    client: Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: String,
}

impl PhotoSearch {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        Self { client, config }
    }

    /// One photo URL for the query; a failed lookup falls back per call
    /// instead of aborting the caller's bundle.
    pub async fn search(&self, query: &str) -> String {
        match self.search_once(query).await {
            Ok(url) => url,
            Err(e) => {
                warn!(query, error = %e, "photo search failed, using fallback photo");
                FALLBACK_PHOTO_URL.to_string()
            }
        }
    }

    async fn search_once(&self, query: &str) -> Result<String, TaskError> {
        let response = self
            .client
            .get(format!("{}/search/photos", self.config.unsplash_base_url))
            .query(&[("query", query), ("per_page", "1")])
            .header(
                "Authorization",
                format!("Client-ID {}", self.config.unsplash_access_key),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Api { status });
        }
        let body: SearchResponse = response.json().await?;
        body.results
            .into_iter()
            .next()
            .map(|r| r.urls.small)
            .ok_or_else(|| TaskError::InvalidResponse("no photo results".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(unsplash_base_url: String) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            port: 0,
            allowed_origin: "http://localhost:3000".into(),
            images_dir: "images".into(),
            variant: Variant::Extended,
            hf_api_token: String::new(),
            sentiment_url: String::new(),
            text_gen_url: String::new(),
            horde_api_key: String::new(),
            horde_base_url: String::new(),
            unsplash_access_key: "test-access-key".into(),
            unsplash_base_url,
            sentiment_max_attempts: 3,
            sentiment_retry_delay: Duration::from_millis(10),
            poll_interval: Duration::from_millis(5),
            poll_ceiling: 3,
        })
    }

    #[tokio::test]
    async fn returns_first_result_small_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "jazz vinyl"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    { "urls": { "small": "https://img.example/jazz-small.jpg" } },
                    { "urls": { "small": "https://img.example/other.jpg" } }
                ]
            })))
            .mount(&server)
            .await;

        let photos = PhotoSearch::new(Client::new(), test_config(server.uri()));
        assert_eq!(
            photos.search("jazz vinyl").await,
            "https://img.example/jazz-small.jpg"
        );
    }

    #[tokio::test]
    async fn empty_results_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .mount(&server)
            .await;

        let photos = PhotoSearch::new(Client::new(), test_config(server.uri()));
        assert_eq!(photos.search("anything").await, FALLBACK_PHOTO_URL);
    }

    #[tokio::test]
    async fn upstream_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let photos = PhotoSearch::new(Client::new(), test_config(server.uri()));
        assert_eq!(photos.search("anything").await, FALLBACK_PHOTO_URL);
    }
}
