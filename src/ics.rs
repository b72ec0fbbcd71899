//! iCalendar (RFC 5545) rendering of an [`Allocation`].
//!
//! Every occupied day becomes one event spanning the full daily window,
//! starting at the configured wall-clock time in the configured zone.
//! Timestamps are written in UTC so the document stands on its own without a
//! `VTIMEZONE` block; the zone name is kept in `X-WR-TIMEZONE` for clients
//! that display it. The `ical` generator serializes and folds the content
//! lines.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use ical::generator::{Emitter, IcalCalendar, IcalCalendarBuilder, IcalEvent};
use ical::ical_property;
use ical::property::Property;

use crate::allocation::Allocation;
use crate::calculations::MINUTE_EPSILON;
use crate::error::{ScheduleError, ScheduleResult};

pub const PRODUCT_ID: &str = "-//Study Schedule Calendar//study-schedule//EN";
pub const CALENDAR_MIME_TYPE: &str = "text/calendar";
pub const CALENDAR_FILE_NAME: &str = "study_schedule.ics";

const UID_DOMAIN: &str = "study-schedule";

/// One study block, ready to be written as a `VEVENT`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyBlockEvent {
    pub date: NaiveDate,
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl StudyBlockEvent {
    fn to_vevent(&self, dtstamp: &str) -> IcalEvent {
        let mut vevent = IcalEvent::new();
        vevent.properties = vec![
            ical_property!("UID", self.uid.as_str()),
            ical_property!("DTSTAMP", dtstamp),
            ical_property!("DTSTART", format_utc(&self.start)),
            ical_property!("DTEND", format_utc(&self.end)),
            ical_property!("SUMMARY", escape_text(&self.summary)),
            ical_property!("DESCRIPTION", escape_text(&self.description)),
        ];
        vevent
    }
}

#[derive(Debug, Clone)]
pub struct CalendarEmitter {
    start_time: NaiveTime,
    timezone: Tz,
    daily_capacity_minutes: f64,
    dtstamp: DateTime<Utc>,
}

impl CalendarEmitter {
    pub fn new(
        start_time: NaiveTime,
        timezone: Tz,
        daily_capacity_minutes: f64,
    ) -> ScheduleResult<Self> {
        if !daily_capacity_minutes.is_finite() || daily_capacity_minutes <= MINUTE_EPSILON {
            return Err(ScheduleError::NonPositiveCapacity {
                minutes: daily_capacity_minutes,
            });
        }
        Ok(Self {
            start_time,
            timezone,
            daily_capacity_minutes,
            dtstamp: Utc::now(),
        })
    }

    /// Fix the `DTSTAMP` written on every event.
    pub fn with_dtstamp(mut self, dtstamp: DateTime<Utc>) -> Self {
        self.dtstamp = dtstamp;
        self
    }

    /// Build one event per occupied day.
    ///
    /// A window that ends beyond chrono's representable range fails with
    /// `DateOverflow` for the day it starts on.
    pub fn events(&self, allocation: &Allocation) -> ScheduleResult<Vec<StudyBlockEvent>> {
        let window = block_length(self.daily_capacity_minutes);
        let mut events = Vec::with_capacity(allocation.day_count());

        for (date, fragments) in allocation.days() {
            let start = localize(&self.timezone, date.and_time(self.start_time)).ok_or_else(|| {
                ScheduleError::invalid(
                    "start_time",
                    format!(
                        "{} on {date} cannot be placed in {}",
                        self.start_time,
                        self.timezone.name()
                    ),
                )
            })?;
            let end = window
                .and_then(|window| start.checked_add_signed(window))
                .ok_or(ScheduleError::DateOverflow { date })?;

            let mut description = String::from("Classes today:");
            for fragment in fragments {
                description.push('\n');
                description.push_str(&fragment.subject);
            }

            events.push(StudyBlockEvent {
                date,
                uid: format!("{}-study-block@{UID_DOMAIN}", date.format("%Y-%m-%d")),
                summary: format!("Study Block {}", date.format("%Y-%m-%d")),
                description,
                start,
                end,
            });
        }

        Ok(events)
    }

    /// Assemble the `VCALENDAR` component without serializing it.
    pub fn calendar(&self, allocation: &Allocation) -> ScheduleResult<IcalCalendar> {
        let events = self.events(allocation)?;
        let stamp = format_utc(&self.dtstamp);

        let mut builder = IcalCalendarBuilder::version("2.0")
            .gregorian()
            .prodid(PRODUCT_ID)
            .set(ical_property!("X-WR-TIMEZONE", self.timezone.name()));
        for event in &events {
            builder = builder.add_event(event.to_vevent(&stamp));
        }
        Ok(builder.build())
    }

    pub fn render(&self, allocation: &Allocation) -> ScheduleResult<String> {
        Ok(self.calendar(allocation)?.generate())
    }

    pub fn emit(&self, allocation: &Allocation) -> ScheduleResult<Vec<u8>> {
        self.render(allocation).map(String::into_bytes)
    }
}

/// Serialize `allocation` into calendar bytes in one call.
pub fn emit(
    allocation: &Allocation,
    start_time: NaiveTime,
    timezone_name: &str,
    daily_capacity_minutes: f64,
) -> ScheduleResult<Vec<u8>> {
    let timezone = parse_timezone(timezone_name)?;
    CalendarEmitter::new(start_time, timezone, daily_capacity_minutes)?.emit(allocation)
}

pub fn parse_timezone(name: &str) -> ScheduleResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::invalid("timezone", format!("unknown timezone '{name}'")))
}

/// Attach `tz` to a wall-clock time.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap keep the
/// offset in effect before the gap, which moves them forward by its length.
fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&naive.checked_sub_signed(Duration::days(1))?)
                .earliest()?;
            let offset = before.offset().fix().local_minus_utc();
            let utc = naive.checked_sub_signed(Duration::seconds(i64::from(offset)))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

/// Length of the daily window, or `None` when it does not fit a `Duration`.
fn block_length(minutes: f64) -> Option<Duration> {
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

fn format_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

// The generator writes property values verbatim.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.replace("\r\n", "\n").chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
