//! HTTP implementation of the remote movie source.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::index::SortSpec;
use crate::models::{MovieRecord, SourceConfig};
use crate::source::{ListPage, MovieSource, extract_items, extract_list_page};
use crate::utils::http::{build_url, create_async_client, fetch_json};

/// Movie source backed by the public movie API.
#[derive(Clone)]
pub struct HttpMovieSource {
    client: Client,
    config: SourceConfig,
}

impl HttpMovieSource {
    /// Create a source with its own configured client.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = create_async_client(&config)?;
        Ok(Self { client, config })
    }
}

/// Query pairs for one page of a remote list.
fn list_query(config: &SourceConfig, page: usize, sort: Option<SortSpec>) -> Vec<(&str, String)> {
    let mut query = vec![("page", page.to_string())];
    if let Some(sort) = sort {
        query.push((config.sort_param.as_str(), sort.field.as_param().to_string()));
        query.push((config.sort_type_param.as_str(), sort.order.as_param().to_string()));
    }
    query
}

/// Path of a remote list under the configured prefix.
fn list_path(config: &SourceConfig, list_slug: &str) -> String {
    format!(
        "{}/{}",
        config.list_path.trim_end_matches('/'),
        list_slug.trim_matches('/')
    )
}

#[async_trait]
impl MovieSource for HttpMovieSource {
    async fn fetch_page(&self, page: usize) -> Result<Vec<MovieRecord>> {
        let url = build_url(
            &self.config.base_url,
            &self.config.latest_path,
            &[("page", page.to_string())],
        )?;
        log::debug!("Fetching {}", url);

        let payload = fetch_json(&self.client, url).await?;
        Ok(extract_items(&payload))
    }

    async fn fetch_list(
        &self,
        list_slug: &str,
        page: usize,
        sort: Option<SortSpec>,
    ) -> Result<ListPage> {
        let url = build_url(
            &self.config.base_url,
            &list_path(&self.config, list_slug),
            &list_query(&self.config, page, sort),
        )?;
        log::debug!("Fetching list {}", url);

        let payload = fetch_json(&self.client, url).await?;
        Ok(extract_list_page(&payload))
    }
}
