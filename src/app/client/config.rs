//! HTTP client configuration and building logic
//!
//! One `ClientConfig` builds both clients: the metadata client, which
//! follows redirects, and the probe client, which does not so that a 302
//! is observed as such.

use std::env;
use std::time::Duration;

use reqwest::{redirect, Client, ClientBuilder, Proxy};
use serde::{Deserialize, Serialize};

use crate::constants::{env as env_constants, http, limits};
use crate::errors::{ClientError, ClientResult};

/// Forward proxy used by the availability prober
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

fn default_proxy_port() -> u16 {
    http::DEFAULT_PROXY_PORT
}

impl ProxyConfig {
    /// Proxy settings, or `None` when the host is blank
    pub fn new(host: impl Into<String>, port: u16) -> Option<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            None
        } else {
            Some(Self { host, port })
        }
    }

    /// Read proxy settings from the process environment
    pub fn from_env() -> Option<Self> {
        let host = env::var(env_constants::PROXY_HOST).ok()?;
        let port = env::var(env_constants::PROXY_PORT)
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(http::DEFAULT_PROXY_PORT);
        Self::new(host, port)
    }

    fn to_proxy(&self) -> ClientResult<Proxy> {
        Proxy::all(format!("http://{}:{}", self.host, self.port)).map_err(|_| {
            ClientError::InvalidProxy {
                host: self.host.clone(),
                port: self.port,
            }
        })
    }
}

/// Configuration for HTTP clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// TCP keep-alive settings
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Request timeout, applied to every fetch and probe
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Probe rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Forward proxy for probes; direct connection when unset
    pub proxy: Option<ProxyConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_PROBE_RATE_LIMIT_RPS,
            proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn with_proxy(mut self, proxy: Option<ProxyConfig>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit_rps: u32) -> Self {
        self.rate_limit_rps = rate_limit_rps;
        self
    }

    /// Builds the metadata client
    pub fn build_http_client(&self) -> ClientResult<Client> {
        self.base_builder().build().map_err(ClientError::Http)
    }

    /// Builds the probe client: no redirects, optional proxy
    pub fn build_probe_client(&self) -> ClientResult<Client> {
        let mut builder = self.base_builder().redirect(redirect::Policy::none());

        match &self.proxy {
            Some(proxy) => {
                tracing::debug!("Probing through proxy {}:{}", proxy.host, proxy.port);
                builder = builder.proxy(proxy.to_proxy()?);
            }
            None => builder = builder.no_proxy(),
        }

        builder.build().map_err(ClientError::Http)
    }

    fn base_builder(&self) -> ClientBuilder {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder
    }
}
