//! Error types for reflow operations.

use thiserror::Error;

use crate::budget::BudgetViolation;
use crate::model::Itinerary;

/// Failures surfaced by an [`ItineraryStore`](crate::traits::ItineraryStore).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("trip '{trip_id}' has no version {version}")]
    NotFound { trip_id: String, version: u64 },

    #[error("trip '{trip_id}' moved past version {base_version} (latest is {latest_version})")]
    VersionConflict {
        trip_id: String,
        base_version: u64,
        latest_version: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ReflowError {
    #[error("Invalid change-set field '{field}': {reason}")]
    InvalidChangeSet { field: String, reason: String },

    #[error("Budget exceeded: {violation}")]
    BudgetExceeded {
        violation: BudgetViolation,
        attempted: Box<Itinerary>,
    },

    #[error("Version conflict on trip '{trip_id}': base {base_version}, latest {latest_version}")]
    VersionConflict {
        trip_id: String,
        base_version: u64,
        latest_version: u64,
    },

    #[error("Trip '{trip_id}' version {version} not found")]
    NotFound { trip_id: String, version: u64 },

    #[error("Activity '{activity_id}' on day {day_index} would run past midnight")]
    ScheduleOverflow { day_index: usize, activity_id: String },

    #[error("Could not generate an unused activity id (last tried '{activity_id}')")]
    DuplicateId { activity_id: String },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl ReflowError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReflowError::InvalidChangeSet {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ReflowError::InvalidChangeSet { .. } => "invalid_change_set",
            ReflowError::BudgetExceeded { .. } => "budget_exceeded",
            ReflowError::VersionConflict { .. } => "version_conflict",
            ReflowError::NotFound { .. } => "not_found",
            ReflowError::ScheduleOverflow { .. } => "schedule_overflow",
            ReflowError::DuplicateId { .. } => "duplicate_id",
            ReflowError::Store(_) => "store",
        }
    }

    /// The computed but unsaved itinerary, when the failure carries one.
    pub fn attempted_itinerary(&self) -> Option<&Itinerary> {
        match self {
            ReflowError::BudgetExceeded { attempted, .. } => Some(&**attempted),
            _ => None,
        }
    }
}

impl From<StoreError> for ReflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { trip_id, version } => ReflowError::NotFound { trip_id, version },
            StoreError::VersionConflict {
                trip_id,
                base_version,
                latest_version,
            } => ReflowError::VersionConflict {
                trip_id,
                base_version,
                latest_version,
            },
            other => ReflowError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReflowError>;
