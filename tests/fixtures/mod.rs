//! Test fixtures for itinerary-reflow.
//!
//! Provides realistic test data including:
//! - Real Paris landmarks (from OpenStreetMap)
//! - Builders for activities, itineraries, and a deterministic engine
#![allow(dead_code)]

pub mod paris_locations;

pub use paris_locations::*;

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use itinerary_reflow::ReflowEngine;
use itinerary_reflow::config::ReflowConfig;
use itinerary_reflow::haversine::HaversineMatrix;
use itinerary_reflow::model::{Activity, Coordinate, Day, Itinerary, Place, TimeSlot};
use itinerary_reflow::store::InMemoryStore;
use itinerary_reflow::traits::{FixedClock, SequentialIdGenerator};

pub type TestEngine = ReflowEngine<Arc<InMemoryStore>, HaversineMatrix, FixedClock, SequentialIdGenerator>;

pub const TRIP: &str = "paris-2026";

pub fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    TimeSlot::new(t(start.0, start.1), t(end.0, end.1))
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 2, 18, 30, 0).unwrap()
}

/// Builder for test activities with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestActivity {
    id: String,
    location: Location,
    duration_min: u32,
    slot: TimeSlot,
    locked: bool,
    cost: Option<f64>,
}

impl TestActivity {
    pub fn new(id: &str, location: Location) -> Self {
        Self {
            id: id.to_string(),
            location,
            duration_min: 60,
            slot: TimeSlot::placeholder(),
            locked: false,
            cost: None,
        }
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration_min = minutes;
        self
    }

    pub fn slot(mut self, start: (u32, u32), end: (u32, u32)) -> Self {
        self.slot = slot(start, end);
        self
    }

    pub fn locked_at(mut self, start: (u32, u32), end: (u32, u32)) -> Self {
        self.locked = true;
        self.slot(start, end)
    }

    pub fn cost(mut self, amount: f64) -> Self {
        self.cost = Some(amount);
        self
    }

    pub fn build(self) -> Activity {
        Activity {
            id: self.id,
            name: self.location.name.to_string(),
            category: self.location.category.to_string(),
            place: Place {
                id: Some(format!("osm:{}", self.location.name)),
                name: self.location.name.to_string(),
                category: self.location.category.to_string(),
                coordinate: Coordinate::new(self.location.lat, self.location.lng),
                source: "places".to_string(),
            },
            time_slot: self.slot,
            duration_minutes: self.duration_min,
            locked: self.locked,
            cost_estimate: self.cost,
        }
    }
}

pub fn itinerary(days: Vec<Vec<TestActivity>>) -> Itinerary {
    Itinerary::new(
        days.into_iter()
            .map(|activities| Day {
                activities: activities.into_iter().map(TestActivity::build).collect(),
                notes: String::new(),
                total_budget: None,
            })
            .collect(),
    )
}

/// Engine over a fresh store seeded with `itinerary` at version 1.
pub fn engine_with(itinerary: Itinerary) -> TestEngine {
    engine_with_config(itinerary, ReflowConfig::default())
}

pub fn engine_with_config(itinerary: Itinerary, config: ReflowConfig) -> TestEngine {
    let store = Arc::new(InMemoryStore::new());
    store.create_trip(TRIP, itinerary).unwrap();
    ReflowEngine::with_collaborators(
        store,
        config,
        HaversineMatrix,
        FixedClock(fixed_now()),
        SequentialIdGenerator::new("new"),
    )
}

pub fn ids(day: &Day) -> Vec<&str> {
    day.activities.iter().map(|a| a.id.as_str()).collect()
}
