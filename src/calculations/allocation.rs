use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::allocation::Allocation;
use crate::calendar::StudyWeek;
use crate::error::{ScheduleError, ScheduleResult};
use crate::item::{Fragment, StudyItem};

/// Remaining minutes at or below this are treated as zero.
pub const MINUTE_EPSILON: f64 = 1e-9;

/// Greedy, order-preserving packer of study items into daily capacity.
///
/// Items are consumed in order. A day is only left once its capacity is used
/// up, and an item that does not fit is split at the day boundary.
pub struct DayAllocator<'a> {
    week: &'a StudyWeek,
    daily_capacity_minutes: f64,
}

impl<'a> DayAllocator<'a> {
    /// Validate the configuration that would otherwise keep the cursor moving forever.
    pub fn new(week: &'a StudyWeek, daily_capacity_minutes: f64) -> ScheduleResult<Self> {
        if week.is_empty() {
            return Err(ScheduleError::NoQualifyingDay);
        }
        if !daily_capacity_minutes.is_finite() || daily_capacity_minutes <= MINUTE_EPSILON {
            return Err(ScheduleError::NonPositiveCapacity {
                minutes: daily_capacity_minutes,
            });
        }
        Ok(Self {
            week,
            daily_capacity_minutes,
        })
    }

    pub fn execute(&self, items: &[StudyItem], start_date: NaiveDate) -> ScheduleResult<Allocation> {
        if let Some(item) = items.iter().find(|item| !item.duration_minutes.is_finite()) {
            return Err(ScheduleError::invalid(
                "duration",
                format!("'{}' has a non-finite duration", item.subject),
            ));
        }

        let mut allocation = Allocation::new();
        let mut cursor = start_date;
        let mut today_left = self.daily_capacity_minutes;

        for (item_index, item) in items.iter().enumerate() {
            let mut item_left = item.duration_minutes;

            while item_left > MINUTE_EPSILON {
                let study_day = self
                    .week
                    .first_available_from(cursor)
                    .ok_or(ScheduleError::DateOverflow { date: cursor })?;
                if study_day != cursor {
                    trace!(from = %cursor, to = %study_day, "skipping to next study day");
                    cursor = study_day;
                    today_left = self.daily_capacity_minutes;
                }

                let placed = if item_left <= today_left + MINUTE_EPSILON {
                    item_left
                } else {
                    today_left
                };
                trace!(date = %cursor, subject = %item.subject, minutes = placed, "placing fragment");
                allocation.push(cursor, Fragment::from_item(item_index, item, placed));
                item_left -= placed;
                today_left -= placed;

                if today_left <= MINUTE_EPSILON {
                    cursor = next_day(cursor)?;
                    today_left = self.daily_capacity_minutes;
                }
            }
        }

        debug!(
            items = items.len(),
            days = allocation.day_count(),
            first = ?allocation.first_day(),
            last = ?allocation.last_day(),
            "allocation finished"
        );
        Ok(allocation)
    }
}

/// Pack `items` into study days starting at `start_date`.
pub fn allocate(
    items: &[StudyItem],
    start_date: NaiveDate,
    week: &StudyWeek,
    daily_capacity_minutes: f64,
) -> ScheduleResult<Allocation> {
    DayAllocator::new(week, daily_capacity_minutes)?.execute(items, start_date)
}

fn next_day(date: NaiveDate) -> ScheduleResult<NaiveDate> {
    date.succ_opt()
        .ok_or(ScheduleError::DateOverflow { date })
}
