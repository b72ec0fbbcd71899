use crate::item::StudyItem;

/// Multiply every item's duration by `multiplier`, keeping order and labels.
///
/// Non-positive multipliers are passed through; rejecting them is up to the caller.
pub fn scale_items(items: &[StudyItem], multiplier: f64) -> Vec<StudyItem> {
    items
        .iter()
        .map(|item| scale_item(item, multiplier))
        .collect()
}

pub fn scale_item(item: &StudyItem, multiplier: f64) -> StudyItem {
    StudyItem {
        duration_minutes: item.duration_minutes * multiplier,
        ..item.clone()
    }
}
