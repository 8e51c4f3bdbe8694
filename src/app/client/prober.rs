//! HEAD-based availability prober with rate limiting
//!
//! A probe is one `HEAD` request. 200 and 302 mean the file exists;
//! any other status, a transport error or a timeout means it does not.
//! Probes are never retried.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use url::Url;

use crate::app::release::AvailabilityProbe;
use crate::constants::http;
use crate::errors::{ClientError, ClientResult};

use super::config::ClientConfig;

/// Availability prober over HTTP
#[derive(Debug)]
pub struct HttpProber {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpProber {
    /// Build a prober from client configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the client cannot be built or the rate limit
    /// is zero
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = config.build_probe_client()?;
        Self::with_client(client, config.rate_limit_rps)
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, rate_limit_rps: u32) -> ClientResult<Self> {
        Ok(Self {
            client,
            rate_limiter: Self::build_rate_limiter(rate_limit_rps)?,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> ClientResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or(ClientError::ZeroRateLimit)?);
        Ok(RateLimiter::direct(quota))
    }

    /// Status code of a `HEAD` request, or `None` on transport failure
    pub async fn head_status(&self, url: &Url) -> Option<u16> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        match self.client.head(url.clone()).send().await {
            // Dropping the response returns the connection to the pool
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                None
            }
        }
    }
}

/// Whether a probe status means the file exists
pub fn is_available_status(status: u16) -> bool {
    http::AVAILABLE_STATUS_CODES.contains(&status)
}

#[async_trait]
impl AvailabilityProbe for HttpProber {
    async fn probe(&self, url: &Url) -> bool {
        let available = self
            .head_status(url)
            .await
            .map(is_available_status)
            .unwrap_or(false);
        tracing::debug!("Probe {} -> {}", url, available);
        available
    }
}
