//! Reflow entry point.
//!
//! Reads the base version, applies the change-set, and commits the result as
//! `baseVersion + 1`. Nothing is written unless every step succeeds, and the
//! store rejects the write if another reflow committed first.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::budget::BudgetBreakdown;
use crate::changeset::{ChangeSet, ChangeSetProcessor, ChangeSummary};
use crate::config::ReflowConfig;
use crate::error::{ReflowError, Result};
use crate::haversine::HaversineMatrix;
use crate::model::Itinerary;
use crate::schedule::ScheduleWarning;
use crate::traits::{Clock, DistanceMatrixProvider, IdGenerator, ItineraryStore, SystemClock, UuidIdGenerator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub optimize_route: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { optimize_route: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowRequest {
    pub trip_id: String,
    pub base_version: u64,
    #[serde(default)]
    pub change_set: ChangeSet,
    #[serde(default)]
    pub preferences: Preferences,
}

impl ReflowRequest {
    pub fn new(trip_id: impl Into<String>, base_version: u64, change_set: ChangeSet) -> Self {
        Self {
            trip_id: trip_id.into(),
            base_version,
            change_set,
            preferences: Preferences::default(),
        }
    }

    /// Parse a JSON request. Malformed input, including unknown patch
    /// operations, is reported as an invalid change-set.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| ReflowError::invalid("request", err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowResponse {
    pub success: bool,
    pub itinerary: Itinerary,
    pub version: u64,
    pub change_summary: ChangeSummary,
    #[serde(default)]
    pub warnings: Vec<ScheduleWarning>,
    pub budget: BudgetBreakdown,
}

/// Wire shape for a failed reflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowFailure {
    pub success: bool,
    pub error: String,
    pub message: String,
    /// The computed but unsaved itinerary, for client-side diffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted: Option<Itinerary>,
}

impl From<&ReflowError> for ReflowFailure {
    fn from(err: &ReflowError) -> Self {
        Self {
            success: false,
            error: err.kind().to_string(),
            message: err.to_string(),
            attempted: err.attempted_itinerary().cloned(),
        }
    }
}

pub struct ReflowEngine<S, M = HaversineMatrix, C = SystemClock, G = UuidIdGenerator> {
    store: S,
    config: ReflowConfig,
    matrix_provider: M,
    clock: C,
    ids: G,
}

impl<S: ItineraryStore> ReflowEngine<S> {
    /// Engine with haversine distances, the system clock and UUID ids.
    pub fn new(store: S, config: ReflowConfig) -> Self {
        Self::with_collaborators(store, config, HaversineMatrix, SystemClock, UuidIdGenerator)
    }
}

impl<S, M, C, G> ReflowEngine<S, M, C, G>
where
    S: ItineraryStore,
    M: DistanceMatrixProvider,
    C: Clock,
    G: IdGenerator,
{
    pub fn with_collaborators(store: S, config: ReflowConfig, matrix_provider: M, clock: C, ids: G) -> Self {
        Self {
            store,
            config,
            matrix_provider,
            clock,
            ids,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    pub fn reflow(&self, request: &ReflowRequest) -> Result<ReflowResponse> {
        if request.trip_id.trim().is_empty() {
            return Err(ReflowError::invalid("tripId", "must not be empty"));
        }
        if request.base_version < 1 {
            return Err(ReflowError::invalid("baseVersion", "must be at least 1"));
        }

        let current = self.store.get(&request.trip_id, request.base_version)?;
        debug!(
            trip_id = %request.trip_id,
            base_version = request.base_version,
            days = current.days.len(),
            "loaded base itinerary"
        );

        let optimize_route = self.config.optimize_route && request.preferences.optimize_route;
        let processor = ChangeSetProcessor::new(&self.config, &self.matrix_provider, &self.ids);
        let processed = processor.process(&current, &request.change_set, optimize_route)?;

        let mut itinerary = processed.itinerary;
        itinerary.reflow_count += 1;
        itinerary.last_reflowed_at = Some(self.clock.now());

        let version = request.base_version + 1;
        self.store.put(&request.trip_id, version, itinerary.clone())?;

        let summary = processed.summary;
        info!(
            trip_id = %request.trip_id,
            version,
            modified = summary.modified,
            removed = summary.removed,
            added = summary.added,
            locks_preserved = summary.locks_preserved,
            warnings = processed.warnings.len(),
            "reflow committed"
        );

        Ok(ReflowResponse {
            success: true,
            itinerary,
            version,
            change_summary: summary,
            warnings: processed.warnings,
            budget: processed.budget,
        })
    }

    /// Run independent requests in parallel. Results keep request order.
    ///
    /// Requests naming the same trip and base version race; one commits and
    /// the others get `VersionConflict`.
    pub fn reflow_batch(&self, requests: &[ReflowRequest]) -> Vec<Result<ReflowResponse>>
    where
        S: Sync,
        M: Sync,
        C: Sync,
        G: Sync,
    {
        requests.par_iter().map(|request| self.reflow(request)).collect()
    }
}
