// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Join an API root and a path, then append query parameters.
pub fn build_url(base_url: &str, path: &str, query: &[(&str, String)]) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Fetch a URL and parse the body as JSON; non-2xx statuses are errors.
pub async fn fetch_json(client: &reqwest::Client, url: Url) -> Result<Value> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::remote(url.as_str(), format!("HTTP {status}")));
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let url = build_url("https://phimapi.com/", "/new", &[("page", "3".into())]).unwrap();
        assert_eq!(url.as_str(), "https://phimapi.com/new?page=3");
    }

    #[test]
    fn test_build_url_encodes_values() {
        let url = build_url(
            "https://phimapi.com",
            "v1/api/danh-sach/phim-bo",
            &[("page", "1".into()), ("sort", "modified.time".into())],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://phimapi.com/v1/api/danh-sach/phim-bo?page=1&sort=modified.time"
        );
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        assert!(build_url("not a url", "/new", &[]).is_err());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(create_async_client(&SourceConfig::default()).is_ok());
    }
}
