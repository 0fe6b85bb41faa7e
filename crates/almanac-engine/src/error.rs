//! Error types for almanac-engine operations.
//!
//! Calendar lookups never fail: inputs outside the supported year window
//! degrade to `None` or an empty list. Errors are reserved for the alarm
//! side, where a holiday lookup can fail and a scan can run past its bound.

use thiserror::Error;

use crate::alarm::AlarmId;

/// Errors raised while computing the next fire time of an alarm.
#[derive(Error, Debug)]
pub enum AlarmError {
    /// A bounded scan finished without finding a candidate. This marks a
    /// defect in the rule or the engine, not an exhausted schedule.
    #[error("{recurrence} scan exceeded its horizon of {horizon} steps")]
    ScanBoundExceeded {
        recurrence: &'static str,
        horizon: u32,
    },

    #[error("holiday lookup failed: {0}")]
    Holiday(#[from] HolidayError),

    #[error("Invalid alarm field: {0}")]
    InvalidField(String),
}

/// Errors raised by holiday sources and the holiday cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HolidayError {
    /// Another caller is already refreshing this year. Retry later or fall
    /// back to cached or heuristic data.
    #[error("holiday fetch for {year} already in progress")]
    FetchInProgress { year: i32 },

    #[error("holiday fetch failed: {0}")]
    Fetch(String),

    #[error("holiday response could not be parsed: {0}")]
    Parse(String),

    #[error("holiday service returned code {code}")]
    Status { code: i64 },
}

/// Errors raised by alarm stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("alarm {0} not found")]
    NotFound(AlarmId),

    #[error("alarm {0} already exists")]
    DuplicateId(AlarmId),
}

pub type Result<T, E = AlarmError> = std::result::Result<T, E>;
