use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Something that can GET a URL and hand back the raw body.
///
/// The rate pipeline only depends on this trait, so tests can swap in a
/// canned source instead of going over the network.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct HttpRateSource {
    client: Client,
}

impl HttpRateSource {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API request failed with status: {}", status);
        }

        let body = response
            .bytes()
            .await
            .context("Failed to get response body")?;

        Ok(body.to_vec())
    }
}
