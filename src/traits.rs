//! Collaborator seams for the reflow engine.
//!
//! Everything non-deterministic or external (distances, storage, clock, id
//! generation) enters the engine through these traits so the core stays a
//! pure function of its inputs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{Coordinate, Itinerary};

/// Provides a distance matrix (kilometers) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<f64>>;
}

/// Versioned itinerary document store.
///
/// `put` must be atomic: it succeeds only when `version` is exactly one past
/// the latest stored version for the trip.
pub trait ItineraryStore {
    fn get(&self, trip_id: &str, version: u64) -> Result<Itinerary, StoreError>;

    fn put(&self, trip_id: &str, version: u64, itinerary: Itinerary) -> Result<(), StoreError>;
}

impl<T: ItineraryStore + ?Sized> ItineraryStore for Arc<T> {
    fn get(&self, trip_id: &str, version: u64) -> Result<Itinerary, StoreError> {
        (**self).get(trip_id, version)
    }

    fn put(&self, trip_id: &str, version: u64, itinerary: Itinerary) -> Result<(), StoreError> {
        (**self).put(trip_id, version, itinerary)
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh activity ids. Ids must never repeat.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic ids of the form `{prefix}-{n}`, starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
