//! Change-set types and the processor that applies them.
//!
//! Processing order is fixed: remove, modify, add, then per day route
//! optimization and scheduling, then a whole-trip budget check. The input
//! document is never touched; all work happens on a copy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::budget::{self, BudgetBreakdown, BudgetConstraints};
use crate::config::{DEFAULT_ACTIVITY_MINUTES, ReflowConfig};
use crate::error::{ReflowError, Result};
use crate::model::{Activity, Coordinate, Itinerary, Place, TimeSlot, parse_hhmm};
use crate::schedule::{self, ScheduleOptions, ScheduleWarning};
use crate::solver;
use crate::traits::{DistanceMatrixProvider, IdGenerator};

const MINUTES_PER_DAY: i64 = 24 * 60;
const MAX_ID_ATTEMPTS: usize = 64;

/// Source tag for places created from user input rather than place search.
pub const USER_PLACE_SOURCE: &str = "user";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default)]
    pub locked_activity_ids: Vec<String>,
    #[serde(default)]
    pub modified_activities: Vec<ModifiedActivity>,
    #[serde(default)]
    pub removed_activities: Vec<String>,
    #[serde(default)]
    pub added_activities: Vec<AddedActivity>,
    #[serde(default)]
    pub budget_constraints: Option<BudgetConstraints>,
    #[serde(default)]
    pub time_constraints: Option<TimeConstraints>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConstraints {
    /// `HH:MM`; kept as text so a bad value is reported against its field.
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub buffer_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl PlaceLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedActivity {
    pub name: String,
    pub location: PlaceLocation,
    pub category: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    pub day_index: i64,
    #[serde(default)]
    pub cost_estimate: Option<f64>,
}

fn default_duration() -> i64 {
    i64::from(DEFAULT_ACTIVITY_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedActivity {
    pub id: String,
    pub changes: Vec<ActivityPatch>,
}

/// Permitted field-level edits to an existing activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActivityPatch {
    Rename { name: String },
    Recategorize { category: String },
    Reschedule { duration_minutes: i64 },
    Reprice { cost_estimate: Option<f64> },
    /// Swap in a new place payload; the old one is replaced, not edited.
    Relocate { location: PlaceLocation },
}

impl ActivityPatch {
    fn validate(&self, field: &str) -> Result<()> {
        match self {
            ActivityPatch::Rename { name } => require_text(&format!("{field}.name"), name),
            ActivityPatch::Recategorize { category } => require_text(&format!("{field}.category"), category),
            ActivityPatch::Reschedule { duration_minutes } => {
                require_duration(&format!("{field}.durationMinutes"), *duration_minutes)
            }
            ActivityPatch::Reprice { cost_estimate } => {
                require_amount(&format!("{field}.costEstimate"), *cost_estimate)
            }
            ActivityPatch::Relocate { location } => {
                require_coordinate(&format!("{field}.location"), location.coordinate())
            }
        }
    }

    /// Apply to an activity. Assumes `validate` already passed.
    fn apply(&self, activity: &mut Activity) {
        match self {
            ActivityPatch::Rename { name } => activity.name = name.clone(),
            ActivityPatch::Recategorize { category } => activity.category = category.clone(),
            ActivityPatch::Reschedule { duration_minutes } => {
                activity.duration_minutes = u32::try_from(*duration_minutes).unwrap_or(activity.duration_minutes);
            }
            ActivityPatch::Reprice { cost_estimate } => activity.cost_estimate = *cost_estimate,
            ActivityPatch::Relocate { location } => {
                activity.place = Place {
                    id: None,
                    name: location.name.clone().unwrap_or_else(|| activity.place.name.clone()),
                    category: activity.place.category.clone(),
                    coordinate: location.coordinate(),
                    source: USER_PLACE_SOURCE.to_string(),
                };
            }
        }
    }
}

/// Counts reported back to the caller after a reflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub modified: usize,
    pub removed: usize,
    pub added: usize,
    pub locks_preserved: usize,
}

/// Result of a successful change-set application. Not yet persisted.
#[derive(Debug, Clone)]
pub struct ProcessedItinerary {
    pub itinerary: Itinerary,
    pub summary: ChangeSummary,
    pub warnings: Vec<ScheduleWarning>,
    pub budget: BudgetBreakdown,
}

/// Applies change-sets to itinerary documents.
pub struct ChangeSetProcessor<'a, M: ?Sized, G: ?Sized> {
    config: &'a ReflowConfig,
    matrix_provider: &'a M,
    ids: &'a G,
}

impl<'a, M, G> ChangeSetProcessor<'a, M, G>
where
    M: DistanceMatrixProvider + ?Sized,
    G: IdGenerator + ?Sized,
{
    pub fn new(config: &'a ReflowConfig, matrix_provider: &'a M, ids: &'a G) -> Self {
        Self {
            config,
            matrix_provider,
            ids,
        }
    }

    pub fn process(&self, current: &Itinerary, change_set: &ChangeSet, optimize_route: bool) -> Result<ProcessedItinerary> {
        let schedule_options = validate(change_set, current.days.len(), self.config)?;

        let mut itinerary = current.clone();
        let mut summary = ChangeSummary::default();
        let pinned: HashSet<&str> = change_set.locked_activity_ids.iter().map(String::as_str).collect();
        let is_anchor = |activity: &Activity| activity.locked || pinned.contains(activity.id.as_str());

        let removed: HashSet<&str> = change_set.removed_activities.iter().map(String::as_str).collect();
        for day in &mut itinerary.days {
            let before = day.activities.len();
            day.activities.retain(|activity| !removed.contains(activity.id.as_str()));
            summary.removed += before - day.activities.len();
        }

        let mut modified: HashSet<&str> = HashSet::new();
        for modification in &change_set.modified_activities {
            let target = itinerary
                .days
                .iter_mut()
                .flat_map(|day| day.activities.iter_mut())
                .find(|activity| activity.id == modification.id);

            let Some(activity) = target else {
                debug!(activity_id = %modification.id, "ignoring modification of unknown activity");
                continue;
            };
            if is_anchor(&*activity) {
                debug!(activity_id = %modification.id, "ignoring modification of locked activity");
                continue;
            }

            if modification.changes.is_empty() {
                continue;
            }
            for patch in &modification.changes {
                patch.apply(activity);
            }
            modified.insert(modification.id.as_str());
        }
        summary.modified = modified.len();

        let mut taken: HashSet<String> = current.activities().map(|activity| activity.id.clone()).collect();
        for added in &change_set.added_activities {
            let activity = new_activity(added, self.fresh_id(&mut taken)?);
            // Validation guarantees the index is in range.
            let day_index = added.day_index as usize;
            itinerary.days[day_index].activities.push(activity);
            summary.added += 1;
        }

        let mut warnings = Vec::new();
        for (day_index, day) in itinerary.days.iter_mut().enumerate() {
            if optimize_route {
                let activities = std::mem::take(&mut day.activities);
                day.activities = solver::optimize_day(activities, &is_anchor, self.matrix_provider);
            }

            schedule::schedule_day(day_index, &mut day.activities, &is_anchor, &schedule_options)?;

            for overlap in schedule::find_overlaps(day_index, &day.activities) {
                warn!(
                    day_index,
                    first = %overlap.first_activity_id,
                    second = %overlap.second_activity_id,
                    minutes = overlap.overlap_minutes,
                    "overlapping time slots after scheduling"
                );
                warnings.push(overlap);
            }
        }

        summary.locks_preserved = itinerary.activities().filter(|activity| is_anchor(*activity)).count();

        let budget = match budget::validate(&itinerary, change_set.budget_constraints.as_ref()) {
            Ok(budget) => budget,
            Err(violation) => {
                warn!(%violation, "rejecting reflow over budget");
                return Err(ReflowError::BudgetExceeded {
                    violation,
                    attempted: Box::new(itinerary),
                });
            }
        };

        Ok(ProcessedItinerary {
            itinerary,
            summary,
            warnings,
            budget,
        })
    }

    /// Next generated id not already used by the trip or by this change-set.
    fn fresh_id(&self, taken: &mut HashSet<String>) -> Result<String> {
        let mut last = String::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if taken.insert(id.clone()) {
                return Ok(id);
            }
            debug!(activity_id = %id, "generated id already in use, retrying");
            last = id;
        }
        Err(ReflowError::DuplicateId { activity_id: last })
    }
}

fn new_activity(added: &AddedActivity, id: String) -> Activity {
    Activity {
        id,
        name: added.name.clone(),
        category: added.category.clone(),
        place: Place {
            id: None,
            name: added.location.name.clone().unwrap_or_else(|| added.name.clone()),
            category: added.category.clone(),
            coordinate: added.location.coordinate(),
            source: USER_PLACE_SOURCE.to_string(),
        },
        time_slot: TimeSlot::placeholder(),
        // Validation guarantees a positive duration under a day.
        duration_minutes: added.duration_minutes as u32,
        locked: false,
        cost_estimate: added.cost_estimate,
    }
}

/// Reject malformed input before anything is mutated, and resolve the
/// scheduling options for this change-set.
pub fn validate(change_set: &ChangeSet, day_count: usize, config: &ReflowConfig) -> Result<ScheduleOptions> {
    for (i, modification) in change_set.modified_activities.iter().enumerate() {
        for (j, patch) in modification.changes.iter().enumerate() {
            patch.validate(&format!("modifiedActivities[{i}].changes[{j}]"))?;
        }
    }

    for (i, added) in change_set.added_activities.iter().enumerate() {
        let field = format!("addedActivities[{i}]");
        require_text(&format!("{field}.name"), &added.name)?;
        require_text(&format!("{field}.category"), &added.category)?;
        require_duration(&format!("{field}.durationMinutes"), added.duration_minutes)?;
        require_coordinate(&format!("{field}.location"), added.location.coordinate())?;
        require_amount(&format!("{field}.costEstimate"), added.cost_estimate)?;

        let in_range = usize::try_from(added.day_index).is_ok_and(|index| index < day_count);
        if !in_range {
            return Err(ReflowError::invalid(
                format!("{field}.dayIndex"),
                format!("{} is outside 0..{}", added.day_index, day_count),
            ));
        }
    }

    if let Some(constraints) = &change_set.budget_constraints {
        require_amount("budgetConstraints.maxTotal", constraints.max_total)?;
        for (category, limit) in &constraints.max_per_category {
            require_amount(&format!("budgetConstraints.maxPerCategory.{category}"), Some(*limit))?;
        }
    }

    let mut options = config.schedule_options();
    if let Some(time) = &change_set.time_constraints {
        if let Some(raw) = &time.start_time {
            options.day_start = parse_hhmm(raw)
                .ok_or_else(|| ReflowError::invalid("timeConstraints.startTime", format!("'{raw}' is not HH:MM")))?;
        }
        if let Some(buffer) = time.buffer_minutes {
            if !(0..MINUTES_PER_DAY).contains(&buffer) {
                return Err(ReflowError::invalid(
                    "timeConstraints.bufferMinutes",
                    format!("{buffer} must be between 0 and {}", MINUTES_PER_DAY - 1),
                ));
            }
            options.buffer_minutes = buffer as u32;
        }
    }

    Ok(options)
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReflowError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_duration(field: &str, minutes: i64) -> Result<()> {
    if !(1..MINUTES_PER_DAY).contains(&minutes) {
        return Err(ReflowError::invalid(
            field,
            format!("{minutes} must be between 1 and {}", MINUTES_PER_DAY - 1),
        ));
    }
    Ok(())
}

fn require_amount(field: &str, amount: Option<f64>) -> Result<()> {
    match amount {
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(ReflowError::invalid(field, format!("{value} must be a non-negative amount")))
        }
        _ => Ok(()),
    }
}

fn require_coordinate(field: &str, coordinate: Coordinate) -> Result<()> {
    if !coordinate.is_valid() {
        return Err(ReflowError::invalid(
            field,
            format!("({}, {}) is outside ±90/±180", coordinate.lat, coordinate.lng),
        ));
    }
    Ok(())
}
