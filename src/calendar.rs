use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;
use std::fmt;

use crate::error::{ScheduleError, ScheduleResult};

/// The recurring set of weekdays on which study blocks may be placed.
///
/// Callers number weekdays 1 (Monday) through 7 (Sunday). Internally the set
/// holds [`chrono::Weekday`] values, so the numbering never leaks into date
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudyWeek {
    study_days: HashSet<Weekday>,
}

impl StudyWeek {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self {
            study_days: days.into_iter().collect(),
        }
    }

    pub fn every_day() -> Self {
        Self::new(Self::ALL_WEEKDAYS)
    }

    /// Build a week from 1=Monday..7=Sunday numbers.
    pub fn from_iso_numbers<I>(numbers: I) -> ScheduleResult<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut study_days = HashSet::new();
        for number in numbers {
            let weekday = weekday_from_iso(number).ok_or_else(|| {
                ScheduleError::invalid(
                    "study_days",
                    format!("{number} is not a weekday number (expected 1=Monday..7=Sunday)"),
                )
            })?;
            study_days.insert(weekday);
        }
        Ok(Self { study_days })
    }

    /// Parse a comma separated list such as `"1, 3,5"`. A blank list yields an empty week.
    pub fn parse_iso_list(input: &str) -> ScheduleResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut numbers = Vec::new();
        for entry in input.split(',') {
            let entry = entry.trim();
            let number = entry.parse::<u32>().map_err(|_| {
                ScheduleError::invalid("study_days", format!("'{entry}' is not a weekday number"))
            })?;
            numbers.push(number);
        }
        Self::from_iso_numbers(numbers)
    }

    pub fn is_empty(&self) -> bool {
        self.study_days.is_empty()
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.study_days.contains(&weekday)
    }

    /// Check if a date may receive study fragments
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    /// Weekdays in Monday-first order.
    pub fn weekdays(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| self.study_days.contains(day))
            .collect()
    }

    pub fn iso_numbers(&self) -> Vec<u32> {
        self.weekdays()
            .into_iter()
            .map(|day| day.number_from_monday())
            .collect()
    }

    /// Find the first available date on or after `from`.
    ///
    /// Returns `None` for an empty week or when the search leaves chrono's date range.
    pub fn first_available_from(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.is_empty() {
            return None;
        }
        let mut current = from;
        while !self.is_available(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }
}

impl fmt::Display for StudyWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.weekdays().iter().map(|day| day.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

fn weekday_from_iso(number: u32) -> Option<Weekday> {
    match number {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
