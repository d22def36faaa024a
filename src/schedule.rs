//! Sequential time-slot assignment for a day's ordered activities.
//!
//! A cursor walks the day from its start time. Unlocked activities are placed
//! at the cursor; locked activities keep their slot and only ever push the
//! cursor forward. Because the cursor never moves back, a locked slot that
//! ends before the cursor can leave overlapping slots; those are reported by
//! [`find_overlaps`] rather than silently accepted.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{ReflowError, Result};
use crate::model::{Activity, TimeSlot, minutes_of_day, time_from_minutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub day_start: NaiveTime,
    pub buffer_minutes: u32,
}

/// Two activities in one day whose slots overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWarning {
    pub day_index: usize,
    pub first_activity_id: String,
    pub second_activity_id: String,
    pub overlap_minutes: u32,
}

/// Assign slots in place. Fails if an unlocked activity would end at or past
/// midnight.
pub fn schedule_day<F>(
    day_index: usize,
    activities: &mut [Activity],
    is_anchor: F,
    options: &ScheduleOptions,
) -> Result<()>
where
    F: Fn(&Activity) -> bool,
{
    let mut cursor = minutes_of_day(options.day_start);

    for activity in activities.iter_mut() {
        if is_anchor(activity) {
            cursor = cursor.max(activity.time_slot.end_minutes() + options.buffer_minutes);
            continue;
        }

        let start = cursor;
        let end = start + activity.duration_minutes;
        let overflow = || ReflowError::ScheduleOverflow {
            day_index,
            activity_id: activity.id.clone(),
        };
        let start_time = time_from_minutes(start).ok_or_else(overflow)?;
        let end_time = time_from_minutes(end).ok_or_else(overflow)?;

        activity.time_slot = TimeSlot::new(start_time, end_time);
        cursor = end + options.buffer_minutes;
    }

    Ok(())
}

/// Pairwise overlap check. Adjacent slots (one ends as the next starts) do
/// not overlap.
pub fn find_overlaps(day_index: usize, activities: &[Activity]) -> Vec<ScheduleWarning> {
    let mut warnings = Vec::new();

    for (i, a) in activities.iter().enumerate() {
        for b in &activities[i + 1..] {
            let (a_start, a_end) = (a.time_slot.start_minutes(), a.time_slot.end_minutes());
            let (b_start, b_end) = (b.time_slot.start_minutes(), b.time_slot.end_minutes());

            // Inverted stored slots (end before start) must not underflow.
            let overlap_minutes = a_end.min(b_end).saturating_sub(a_start.max(b_start));
            if a_start < b_end && b_start < a_end && overlap_minutes > 0 {
                warnings.push(ScheduleWarning {
                    day_index,
                    first_activity_id: a.id.clone(),
                    second_activity_id: b.id.clone(),
                    overlap_minutes,
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, Place};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn activity(id: &str, duration: u32) -> Activity {
        Activity {
            id: id.to_string(),
            name: id.to_string(),
            category: "sight".to_string(),
            place: Place {
                id: None,
                name: id.to_string(),
                category: "sight".to_string(),
                coordinate: Coordinate::new(0.0, 0.0),
                source: "test".to_string(),
            },
            time_slot: TimeSlot::placeholder(),
            duration_minutes: duration,
            locked: false,
            cost_estimate: None,
        }
    }

    fn locked(id: &str, start: NaiveTime, end: NaiveTime) -> Activity {
        let mut a = activity(id, minutes_of_day(end) - minutes_of_day(start));
        a.locked = true;
        a.time_slot = TimeSlot::new(start, end);
        a
    }

    fn defaults() -> ScheduleOptions {
        ScheduleOptions {
            day_start: t(9, 0),
            buffer_minutes: 30,
        }
    }

    #[test]
    fn test_unlocked_day_is_sequential_with_buffer() {
        let mut day = vec![activity("a", 60), activity("b", 90)];
        schedule_day(0, &mut day, |a| a.locked, &defaults()).unwrap();

        assert_eq!(day[0].time_slot, TimeSlot::new(t(9, 0), t(10, 0)));
        assert_eq!(day[1].time_slot, TimeSlot::new(t(10, 30), t(12, 0)));
    }

    #[test]
    fn test_locked_slot_untouched_and_pushes_cursor() {
        let mut day = vec![locked("l", t(9, 0), t(10, 0)), activity("n", 60)];
        schedule_day(0, &mut day, |a| a.locked, &defaults()).unwrap();

        assert_eq!(day[0].time_slot, TimeSlot::new(t(9, 0), t(10, 0)));
        assert_eq!(day[1].time_slot, TimeSlot::new(t(10, 30), t(11, 30)));
    }

    #[test]
    fn test_cursor_never_moves_back_for_early_locked_slot() {
        let mut day = vec![
            activity("a", 120),
            locked("l", t(9, 30), t(10, 0)),
            activity("b", 30),
        ];
        schedule_day(0, &mut day, |a| a.locked, &defaults()).unwrap();

        // a: 09:00-11:00, cursor 11:30 is later than 10:30 so it stays.
        assert_eq!(day[2].time_slot, TimeSlot::new(t(11, 30), t(12, 0)));

        let overlaps = find_overlaps(0, &day);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first_activity_id, "a");
        assert_eq!(overlaps[0].second_activity_id, "l");
        assert_eq!(overlaps[0].overlap_minutes, 30);
    }

    #[test]
    fn test_anchor_predicate_overrides_flag() {
        let mut pinned = activity("p", 60);
        pinned.time_slot = TimeSlot::new(t(14, 0), t(15, 0));
        let mut day = vec![pinned, activity("n", 60)];
        schedule_day(0, &mut day, |a| a.id == "p", &defaults()).unwrap();

        assert_eq!(day[0].time_slot, TimeSlot::new(t(14, 0), t(15, 0)));
        assert_eq!(day[1].time_slot.start, t(15, 30));
    }

    #[test]
    fn test_overflow_past_midnight_is_an_error() {
        let options = ScheduleOptions {
            day_start: t(22, 0),
            buffer_minutes: 30,
        };
        let mut day = vec![activity("late", 180)];
        let err = schedule_day(2, &mut day, |a| a.locked, &options).unwrap_err();

        match err {
            ReflowError::ScheduleOverflow { day_index, activity_id } => {
                assert_eq!(day_index, 2);
                assert_eq!(activity_id, "late");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inverted_locked_slot_does_not_underflow() {
        let mut overnight = locked("overnight", t(9, 0), t(10, 0));
        overnight.time_slot = TimeSlot::new(t(22, 0), t(2, 0));
        let day = vec![overnight, locked("long", t(1, 0), t(23, 0))];

        let overlaps = find_overlaps(0, &day);
        assert!(overlaps.iter().all(|w| w.overlap_minutes > 0));
    }

    #[test]
    fn test_adjacent_slots_do_not_overlap() {
        let day = vec![
            locked("a", t(9, 0), t(10, 0)),
            locked("b", t(10, 0), t(11, 0)),
        ];
        assert!(find_overlaps(0, &day).is_empty());
    }
}
