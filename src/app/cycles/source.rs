//! Metadata source seam for the cycle cache

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::app::models::CycleSnapshot;
use crate::errors::FetchResult;

/// Fetches the cycle records of one family from the metadata service
///
/// Implementations report every transport or format problem as an error;
/// the cache turns errors into "no data" for its callers.
#[async_trait]
pub trait CycleSource: Send + Sync {
    /// Fetch all cycle records for `type_code` as of `as_of`
    async fn fetch_cycles(&self, type_code: &str, as_of: NaiveDate) -> FetchResult<CycleSnapshot>;
}
