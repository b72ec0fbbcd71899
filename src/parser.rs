use tracing::debug;

use crate::item::StudyItem;

const DURATION_MARKER: &str = "min";

/// Parse free-form class text into study items.
///
/// Records are three lines long: status, subject, and a duration line such as
/// `45min` or `45 min`. When the third line of a candidate record is not a
/// duration, only the first line is dropped and parsing resumes on the next
/// line, so stray lines never swallow the record that follows them.
pub fn parse_items(text: &str) -> Vec<StudyItem> {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let mut items = Vec::new();
    let mut idx = 0;

    while idx + 2 < lines.len() {
        match parse_duration(lines[idx + 2]) {
            Some(minutes) => {
                items.push(StudyItem::new(lines[idx], lines[idx + 1], f64::from(minutes)));
                idx += 3;
            }
            None => {
                debug!(line = idx + 1, content = lines[idx], "skipping unparsable class line");
                idx += 1;
            }
        }
    }

    items
}

/// Extract the minute count from a duration line, if it is one.
pub fn parse_duration(line: &str) -> Option<u32> {
    if !line.contains(DURATION_MARKER) {
        return None;
    }
    line.replace(DURATION_MARKER, "").trim().parse::<u32>().ok()
}
