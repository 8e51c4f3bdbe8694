//! Epoch-based cycle arithmetic
//!
//! Families whose cycle number is not delivered by the metadata service count
//! cycles from a fixed start date in whole days. Calendar dates carry no time
//! of day, so daylight-saving changes and month lengths never skew the count.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Compute the cycle number containing `reference`
///
/// `floor((reference - epoch) / cycle_length_days) + 1`. Dates before the
/// epoch produce zero or negative numbers; a cycle length of zero is treated
/// as one day.
pub fn cycle_number(reference: NaiveDate, epoch: NaiveDate, cycle_length_days: u32) -> i64 {
    let length = i64::from(cycle_length_days.max(1));
    let days = reference.signed_duration_since(epoch).num_days();
    days.div_euclid(length) + 1
}

/// Fixed start date and cycle length for one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSchedule {
    /// Effective date of cycle 1
    pub epoch: NaiveDate,
    /// Days per cycle
    pub cycle_length_days: u32,
}

impl EpochSchedule {
    pub fn new(epoch: NaiveDate, cycle_length_days: u32) -> Self {
        Self {
            epoch,
            cycle_length_days,
        }
    }

    /// Cycle number at `reference`, or `None` before the first cycle
    pub fn cycle_at(&self, reference: NaiveDate) -> Option<u32> {
        let number = cycle_number(reference, self.epoch, self.cycle_length_days);
        u32::try_from(number).ok().filter(|n| *n > 0)
    }

    /// Cycle following the one containing `reference`
    pub fn next_cycle_at(&self, reference: NaiveDate) -> Option<u32> {
        self.cycle_at(reference).map(|n| n + 1)
    }

    /// First day of a cycle
    pub fn start_of(&self, cycle: u32) -> NaiveDate {
        let offset = i64::from(cycle.saturating_sub(1)) * i64::from(self.cycle_length_days.max(1));
        self.epoch + Duration::days(offset)
    }
}
