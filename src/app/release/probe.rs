//! Availability probe seam

use async_trait::async_trait;
use url::Url;

/// Existence check for one resolved URL
///
/// Implementations fold every failure into `false`; a probe never returns
/// an error and is never retried by the caller.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn probe(&self, url: &Url) -> bool;
}
