use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, ClientBuilder, Response};

use crate::{
    config::{RetryPolicy, ScrapeConfig},
    error::FetchError,
    ratelimit::RateLimiter,
};

/// Something that can turn a URL into a page body.
///
/// Non-2xx responses are errors: implementations only return `Ok` for bodies
/// that are worth parsing.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_page(url).await
    }
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl RequestClient {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let mut builder = ClientBuilder::new();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let rate_limiter = RateLimiter::new(config.request_interval);
        Ok(Self {
            client,
            rate_limiter,
            retry: config.retry,
        })
    }

    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, FetchError> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    pub async fn fetch_url_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch_url_response(url).await?;
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for RequestClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        fetch_with_retry(self.retry, || self.fetch_url_body(url)).await
    }
}

/// Runs `attempt` until it succeeds, fails with a non-transient error, or the
/// policy runs out of retries.
pub async fn fetch_with_retry<F, Fut>(
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut retry = 0;
    loop {
        match attempt().await {
            Ok(body) => return Ok(body),
            Err(err) if err.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_before_retry(retry);
                warn!(
                    "{err}; retry {retry}/{} in {}ms",
                    policy.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
