//! Itinerary document model.
//!
//! These are the documents the engine reads from and writes to the versioned
//! store. Field names serialise in camelCase and time slots as `HH:MM`.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Place payload from the place-search collaborator. Never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub coordinate: Coordinate,
    pub source: String,
}

/// Wall-clock slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Slot given to freshly added activities until the scheduler runs.
    pub fn placeholder() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }

    pub fn start_minutes(&self) -> u32 {
        minutes_of_day(self.start)
    }

    pub fn end_minutes(&self) -> u32 {
        minutes_of_day(self.end)
    }
}

/// One scheduled stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    /// Display name; starts as the place name and may be renamed.
    pub name: String,
    /// Budget category; starts as the place category and may be recategorized.
    pub category: String,
    pub place: Place,
    pub time_slot: TimeSlot,
    pub duration_minutes: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub cost_estimate: Option<f64>,
}

impl Activity {
    pub fn coordinate(&self) -> Coordinate {
        self.place.coordinate
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub total_budget: Option<f64>,
}

/// Root document for one trip. Day index is authoritative calendar order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub days: Vec<Day>,
    #[serde(default)]
    pub reflow_count: u32,
    #[serde(default)]
    pub last_reflowed_at: Option<DateTime<Utc>>,
}

impl Itinerary {
    pub fn new(days: Vec<Day>) -> Self {
        Self {
            days,
            reflow_count: 0,
            last_reflowed_at: None,
        }
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.days.iter().flat_map(|day| day.activities.iter())
    }

    pub fn find_activity(&self, id: &str) -> Option<&Activity> {
        self.activities().find(|activity| activity.id == id)
    }
}

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Inverse of [`minutes_of_day`]; `None` at or past midnight.
pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .map_err(|err| D::Error::custom(format!("invalid HH:MM time '{raw}': {err}")))
    }
}
