//! In-memory versioned itinerary store.
//!
//! Keeps every committed version of every trip. Writes are compare-and-set on
//! the latest version, so at most one writer wins per base version.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::model::Itinerary;
use crate::traits::ItineraryStore;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    trips: RwLock<HashMap<String, Vec<Itinerary>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a trip at version 1. Fails if the trip already exists.
    pub fn create_trip(&self, trip_id: &str, itinerary: Itinerary) -> Result<u64, StoreError> {
        let mut trips = self.write()?;
        if let Some(versions) = trips.get(trip_id) {
            return Err(StoreError::VersionConflict {
                trip_id: trip_id.to_string(),
                base_version: 0,
                latest_version: versions.len() as u64,
            });
        }
        trips.insert(trip_id.to_string(), vec![itinerary]);
        Ok(1)
    }

    pub fn latest_version(&self, trip_id: &str) -> Result<u64, StoreError> {
        let trips = self.read()?;
        trips
            .get(trip_id)
            .map(|versions| versions.len() as u64)
            .ok_or_else(|| StoreError::NotFound {
                trip_id: trip_id.to_string(),
                version: 1,
            })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Itinerary>>>, StoreError> {
        self.trips
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Itinerary>>>, StoreError> {
        self.trips
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl ItineraryStore for InMemoryStore {
    fn get(&self, trip_id: &str, version: u64) -> Result<Itinerary, StoreError> {
        let trips = self.read()?;
        version
            .checked_sub(1)
            .and_then(|index| trips.get(trip_id)?.get(index as usize))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                trip_id: trip_id.to_string(),
                version,
            })
    }

    fn put(&self, trip_id: &str, version: u64, itinerary: Itinerary) -> Result<(), StoreError> {
        let mut trips = self.write()?;
        let versions = trips.get_mut(trip_id).ok_or_else(|| StoreError::NotFound {
            trip_id: trip_id.to_string(),
            version: version.saturating_sub(1),
        })?;

        let latest = versions.len() as u64;
        if version != latest + 1 {
            return Err(StoreError::VersionConflict {
                trip_id: trip_id.to_string(),
                base_version: version.saturating_sub(1),
                latest_version: latest,
            });
        }

        versions.push(itinerary);
        Ok(())
    }
}
