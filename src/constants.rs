//! Application constants for Chart Cycles
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for process-level overrides
pub mod env {
    /// Forward proxy host used by the availability prober
    pub const PROXY_HOST: &str = "CHART_CYCLES_PROXY_HOST";

    /// Forward proxy port used by the availability prober
    pub const PROXY_PORT: &str = "CHART_CYCLES_PROXY_PORT";

    /// Override for the metadata service base URL
    pub const METADATA_URL: &str = "CHART_CYCLES_METADATA_URL";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Chart-Cycles/0.1.0 (Product Release Resolver)";

    /// Default HTTP request timeout (metadata fetch and probes)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 16;

    /// Default forward proxy port when only a host is configured
    pub const DEFAULT_PROXY_PORT: u16 = 8080;

    /// Status codes a probe treats as "available"
    pub const AVAILABLE_STATUS_CODES: [u16; 2] = [200, 302];
}

/// Rate limiting configuration
pub mod limits {
    /// Default probe rate limit (requests per second)
    pub const DEFAULT_PROBE_RATE_LIMIT_RPS: u32 = 25;
}

/// Upstream service URLs
pub mod services {
    /// Base URL of the cycle metadata service
    pub const METADATA_BASE_URL: &str = "https://external-api.faa.gov/apra/";

    /// Path of the cycle listing endpoint, relative to the metadata base URL
    pub const CYCLES_ENDPOINT: &str = "cycles";

    /// Base URL all product download paths are resolved against
    pub const PRODUCT_BASE_URL: &str = "https://aeronav.faa.gov/";
}

/// Cycle cache constants
pub mod cache {
    use super::Duration;

    /// Snapshot age after which a family is refetched
    pub const DEFAULT_AGE_LIMIT: Duration = Duration::from_secs(60 * 60);

    /// Upper bound on a single metadata fetch
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Publication cycle constants
pub mod cycles {
    /// Effective date of cycle 1 for the 28-day digital products (YYYY-MM-DD)
    pub const AIRAC_EPOCH: &str = "2020-01-02";

    /// Length of an AIRAC cycle in days
    pub const AIRAC_CYCLE_DAYS: u32 = 28;

    /// Record type code for 56-day chart cycles
    pub const TYPE_56_DAY: &str = "56 DAY";

    /// Record type code for 28-day cycles
    pub const TYPE_28_DAY: &str = "28 DAY";

    /// Record type code for helicopter route charts
    pub const TYPE_HELICOPTER: &str = "Helicopter_VFR";
}

/// Logging and debugging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use cache::{DEFAULT_AGE_LIMIT, DEFAULT_FETCH_TIMEOUT};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::DEFAULT_PROBE_RATE_LIMIT_RPS;
pub use services::{METADATA_BASE_URL, PRODUCT_BASE_URL};
