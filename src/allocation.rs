use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::item::Fragment;

/// Fragments scheduled per study day.
///
/// Days iterate chronologically; fragments within a day keep the order in
/// which they were placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    days: BTreeMap<NaiveDate, Vec<Fragment>>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, date: NaiveDate, fragment: Fragment) {
        self.days.entry(date).or_default().push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &[Fragment])> {
        self.days
            .iter()
            .map(|(date, fragments)| (*date, fragments.as_slice()))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn fragments_on(&self, date: NaiveDate) -> &[Fragment] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn minutes_on(&self, date: NaiveDate) -> f64 {
        self.fragments_on(date)
            .iter()
            .map(|fragment| fragment.duration_minutes)
            .sum()
    }

    pub fn total_minutes(&self) -> f64 {
        self.fragments().map(|fragment| fragment.duration_minutes).sum()
    }

    /// Minutes placed for the item at `item_index` across all days.
    pub fn item_minutes(&self, item_index: usize) -> f64 {
        self.fragments()
            .filter(|fragment| fragment.item_index == item_index)
            .map(|fragment| fragment.duration_minutes)
            .sum()
    }

    /// All fragments, chronologically and then in placement order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.days.values().flatten()
    }
}
