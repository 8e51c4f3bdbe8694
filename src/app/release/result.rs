//! Resolution results

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::app::models::CycleRecord;
use crate::app::naming::CandidatePath;

/// Overall status reported to the calling layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u16")]
pub enum ResolutionStatus {
    /// At least one usable path
    Ok,
    /// No record, no candidates, or nothing reachable
    NotFound,
    /// Family is not configured
    ServerError,
}

impl ResolutionStatus {
    /// HTTP-style status code
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }
}

impl From<ResolutionStatus> for u16 {
    fn from(status: ResolutionStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why a resolution ended the way it did
///
/// Several outcomes share the 404 status; the outcome keeps them apart for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Metadata fetch failed or carried no matching record
    MetadataUnavailable,
    /// The request maps to zero expected files
    NoCandidatePaths,
    /// Every probed candidate was unreachable
    AllCandidatesUnreachable,
    /// Candidates were probed and at least one is available
    Available,
    /// Verification is disabled; candidates are returned unprobed
    Unverified,
    /// No naming descriptor for the family
    UnknownFamily,
}

impl ResolutionOutcome {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            Self::Available | Self::Unverified => ResolutionStatus::Ok,
            Self::MetadataUnavailable | Self::NoCandidatePaths | Self::AllCandidatesUnreachable => {
                ResolutionStatus::NotFound
            }
            Self::UnknownFamily => ResolutionStatus::ServerError,
        }
    }
}

/// Outcome of one release resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub status: ResolutionStatus,
    pub outcome: ResolutionOutcome,
    /// Cycle record the paths were built from
    pub cycle: Option<CycleRecord>,
    /// Returned paths; only available ones when verification ran
    pub candidate_paths: Vec<CandidatePath>,
    /// Absolute URLs, in the same order as `candidate_paths`
    pub urls: Vec<String>,
    /// Probe result per relative path; empty when verification is disabled
    pub availability: BTreeMap<String, bool>,
}

impl ResolutionResult {
    /// Result carrying no paths
    pub fn empty(outcome: ResolutionOutcome, cycle: Option<CycleRecord>) -> Self {
        Self {
            status: outcome.status(),
            outcome,
            cycle,
            candidate_paths: Vec::new(),
            urls: Vec::new(),
            availability: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResolutionStatus::Ok
    }

    /// Candidates whose probe succeeded
    pub fn available_count(&self) -> usize {
        self.availability.values().filter(|available| **available).count()
    }
}
