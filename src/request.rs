use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::Allocation;
use crate::calculations::{allocate, scale_items};
use crate::calendar::StudyWeek;
use crate::error::{ScheduleError, ScheduleResult};
use crate::ics::{CalendarEmitter, parse_timezone};
use crate::item::StudyItem;
use crate::parser::parse_items;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Raw schedule fields as submitted by a form, a JSON file, or command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub start_date: String,
    pub study_days: String,
    pub start_time: String,
    pub daily_study_limit_hours: String,
    pub multiplier: String,
    pub class_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A validated request: typed values plus the parsed and scaled items.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    pub start_date: NaiveDate,
    pub study_week: StudyWeek,
    pub start_time: NaiveTime,
    pub daily_capacity_minutes: f64,
    pub multiplier: f64,
    pub timezone: Tz,
    pub items: Vec<StudyItem>,
}

/// Result of running the whole pipeline once.
#[derive(Debug, Clone)]
pub struct GeneratedSchedule {
    pub allocation: Allocation,
    pub calendar: Vec<u8>,
}

impl ScheduleRequest {
    /// Check every field and turn the request into a plan.
    ///
    /// Malformed fields fail with `InvalidInput` naming the field. Only once
    /// every field parses does an empty weekday list or a non-positive daily
    /// limit fail as unschedulable.
    pub fn validate(&self) -> ScheduleResult<SchedulePlan> {
        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d")
            .map_err(|err| {
                ScheduleError::invalid(
                    "start_date",
                    format!("'{}' is not a YYYY-MM-DD date ({err})", self.start_date),
                )
            })?;

        let study_week = StudyWeek::parse_iso_list(&self.study_days)?;

        let start_time = NaiveTime::parse_from_str(self.start_time.trim(), "%H:%M").map_err(
            |err| {
                ScheduleError::invalid(
                    "start_time",
                    format!("'{}' is not an HH:MM time ({err})", self.start_time),
                )
            },
        )?;

        let hours = self
            .daily_study_limit_hours
            .trim()
            .parse::<i64>()
            .map_err(|_| {
                ScheduleError::invalid(
                    "daily_study_limit_hours",
                    format!("'{}' is not a whole number of hours", self.daily_study_limit_hours),
                )
            })?;
        let daily_capacity_minutes = (hours as f64) * 60.0;

        let multiplier = self.multiplier.trim().parse::<f64>().map_err(|_| {
            ScheduleError::invalid(
                "multiplier",
                format!("'{}' is not a number", self.multiplier),
            )
        })?;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ScheduleError::invalid(
                "multiplier",
                format!("{multiplier} must be a finite, non-negative number"),
            ));
        }

        let timezone = parse_timezone(self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE))?;

        // Field errors win over configuration that merely cannot be scheduled.
        if study_week.is_empty() {
            return Err(ScheduleError::NoQualifyingDay);
        }
        if hours <= 0 {
            return Err(ScheduleError::NonPositiveCapacity {
                minutes: daily_capacity_minutes,
            });
        }

        let parsed = parse_items(&self.class_input);
        debug!(items = parsed.len(), multiplier, "parsed class input");
        let items = scale_items(&parsed, multiplier);

        Ok(SchedulePlan {
            start_date,
            study_week,
            start_time,
            daily_capacity_minutes,
            multiplier,
            timezone,
            items,
        })
    }
}

impl SchedulePlan {
    pub fn allocate(&self) -> ScheduleResult<Allocation> {
        allocate(
            &self.items,
            self.start_date,
            &self.study_week,
            self.daily_capacity_minutes,
        )
    }

    pub fn emitter(&self) -> ScheduleResult<CalendarEmitter> {
        CalendarEmitter::new(self.start_time, self.timezone, self.daily_capacity_minutes)
    }

    pub fn render_calendar(
        &self,
        allocation: &Allocation,
        dtstamp: DateTime<Utc>,
    ) -> ScheduleResult<Vec<u8>> {
        self.emitter()?.with_dtstamp(dtstamp).emit(allocation)
    }

    pub fn generate(&self, dtstamp: DateTime<Utc>) -> ScheduleResult<GeneratedSchedule> {
        let allocation = self.allocate()?;
        let calendar = self.render_calendar(&allocation, dtstamp)?;
        Ok(GeneratedSchedule {
            allocation,
            calendar,
        })
    }
}

/// Validate `request`, allocate its items and render the calendar.
pub fn generate_schedule(request: &ScheduleRequest) -> ScheduleResult<GeneratedSchedule> {
    request.validate()?.generate(Utc::now())
}
