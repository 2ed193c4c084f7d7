//! Upstream listing client.
//!
//! Talks to a paginated collection endpoint of the shape
//! `GET {base}/{resource}?limit=N&offset=M` returning
//! `{ "count": total, "results": [{ "name", "url" }, ...] }`.

use std::time::Duration;

use randex_types::ReferenceHandle;
use serde::Deserialize;
use url::Url;

use crate::error::{FetchError, ListingError};
use crate::http;

#[derive(Debug, Deserialize)]
struct ListingPage {
    count: u64,
    #[serde(default)]
    results: Vec<ReferenceHandle>,
}

#[derive(Debug, Clone)]
pub struct ListingClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl ListingClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Client for `{base_url}/{resource}`.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        resource: &str,
    ) -> Result<Self, ListingError> {
        let raw = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            resource.trim_matches('/')
        );
        let endpoint = Url::parse(&raw).map_err(|source| ListingError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        Ok(Self {
            client,
            endpoint,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The shared HTTP client, for detail fetches against the same host.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Total number of records in the collection.
    pub async fn count(&self) -> Result<u64, ListingError> {
        Ok(self.fetch_page(0, 1).await?.count)
    }

    /// One page of handles starting at `offset`.
    pub async fn page(&self, offset: u64, limit: u64) -> Result<Vec<ReferenceHandle>, ListingError> {
        Ok(self.fetch_page(offset, limit).await?.results)
    }

    /// Up to `size` contiguous handles from a uniformly random offset.
    ///
    /// Costs two requests: one to learn the collection size, one for the page.
    pub async fn random_sample(&self, size: usize) -> Result<Vec<ReferenceHandle>, ListingError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let size = size as u64;
        let total = self.count().await?;
        let offset = random_offset(total, size);
        tracing::debug!(total, offset, size, "Sampling listing page");

        let mut handles = self.page(offset, size).await?;
        handles.truncate(size as usize);
        Ok(handles)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<ListingPage, ListingError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let request = get_page(&self.client, &url);
        let result = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        result.map_err(|source| ListingError::Request {
            url: url.to_string(),
            source,
        })
    }
}

async fn get_page(client: &reqwest::Client, url: &Url) -> Result<ListingPage, FetchError> {
    let value = http::get_json(client, url.as_str()).await?;
    serde_json::from_value(value).map_err(FetchError::Decode)
}

/// Offset in `[0, total - size]`; 0 when the collection fits in one sample.
fn random_offset(total: u64, size: u64) -> u64 {
    let max_offset = total.saturating_sub(size);
    if max_offset == 0 {
        return 0;
    }
    let offset = (rand::random::<f64>() * (max_offset + 1) as f64) as u64;
    offset.min(max_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[test]
    fn endpoint_joins_base_and_resource() {
        let listing =
            ListingClient::new(client(), "https://pokeapi.co/api/v2/", "/pokemon/").unwrap();
        assert_eq!(
            listing.endpoint().as_str(),
            "https://pokeapi.co/api/v2/pokemon"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ListingClient::new(client(), "not a url", "pokemon").unwrap_err();
        assert!(matches!(err, ListingError::InvalidUrl { .. }));
    }

    #[test]
    fn random_offset_stays_in_bounds() {
        for _ in 0..1000 {
            let offset = random_offset(1302, 10);
            assert!(offset <= 1292, "offset {offset} out of range");
        }
    }

    #[test]
    fn random_offset_is_zero_when_sample_covers_collection() {
        assert_eq!(random_offset(0, 10), 0);
        assert_eq!(random_offset(7, 10), 0);
        assert_eq!(random_offset(10, 10), 0);
    }

    #[test]
    fn random_offset_reaches_both_ends() {
        let offsets: Vec<u64> = (0..2000).map(|_| random_offset(12, 10)).collect();
        assert!(offsets.contains(&0));
        assert!(offsets.contains(&2));
    }
}
