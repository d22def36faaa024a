//! Engine-wide defaults. Requests may override them per call.

use chrono::NaiveTime;

use crate::schedule::ScheduleOptions;

pub const DEFAULT_BUFFER_MINUTES: u32 = 30;

pub const DEFAULT_ACTIVITY_MINUTES: u32 = 120;

pub fn default_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone)]
pub struct ReflowConfig {
    /// Where the scheduling cursor starts each day.
    pub day_start: NaiveTime,
    /// Gap inserted after every activity.
    pub buffer_minutes: u32,
    /// Reorder unlocked stops before scheduling.
    pub optimize_route: bool,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            day_start: default_day_start(),
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            optimize_route: true,
        }
    }
}

impl ReflowConfig {
    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            day_start: self.day_start,
            buffer_minutes: self.buffer_minutes,
        }
    }
}
