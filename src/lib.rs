//! itinerary-reflow
//!
//! Applies change-sets to multi-day travel itineraries: reorders unlocked
//! stops, recomputes time slots, checks budgets, and commits the result as a
//! new immutable version.

pub mod budget;
pub mod changeset;
pub mod config;
pub mod error;
pub mod haversine;
pub mod model;
pub mod reflow;
pub mod schedule;
pub mod solver;
pub mod store;
pub mod traits;

pub use error::{ReflowError, Result, StoreError};
pub use reflow::{ReflowEngine, ReflowRequest, ReflowResponse};
