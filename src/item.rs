use serde::{Deserialize, Serialize};

/// One unit of study work parsed from the class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyItem {
    pub status: String,
    pub subject: String,
    pub duration_minutes: f64,
}

impl StudyItem {
    pub fn new(
        status: impl Into<String>,
        subject: impl Into<String>,
        duration_minutes: f64,
    ) -> Self {
        Self {
            status: status.into(),
            subject: subject.into(),
            duration_minutes,
        }
    }
}

/// The part of a [`StudyItem`] placed on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Position of the originating item in the allocator input.
    pub item_index: usize,
    pub status: String,
    pub subject: String,
    pub duration_minutes: f64,
}

impl Fragment {
    pub fn from_item(item_index: usize, item: &StudyItem, duration_minutes: f64) -> Self {
        Self {
            item_index,
            status: item.status.clone(),
            subject: item.subject.clone(),
            duration_minutes,
        }
    }
}
