//! Shared HTTP client and the JSON GET used by both listing and detail fetches.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;

use crate::error::FetchError;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("randex/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 32;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Settings for the shared client.
///
/// No whole-request timeout is set on the client; every request is bounded by
/// its caller's own timer.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientOptions {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if !user_agent.trim().is_empty() {
            self.user_agent = user_agent;
        }
        self
    }
}

/// Build the client shared by the listing and detail fetchers.
///
/// Clone the returned client freely; clones share one connection pool.
pub fn build_client(options: &ClientOptions) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(options.user_agent.clone())
        .connect_timeout(options.connect_timeout)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .build()
        .map_err(FetchError::Client)
}

/// GET `url` and parse the body as JSON.
///
/// Dropping the returned future cancels the in-flight request.
pub(crate) async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, FetchError> {
    let response = client
        .get(url)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .send()
        .await
        .map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.bytes().await.map_err(FetchError::Network)?;
    serde_json::from_slice(&body).map_err(FetchError::Decode)
}
