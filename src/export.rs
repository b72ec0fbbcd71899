use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::allocation::Allocation;
use crate::error::ExportResult;

/// One CSV row per fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentCsvRecord {
    pub date: NaiveDate,
    pub item_index: usize,
    pub status: String,
    pub subject: String,
    pub duration_minutes: f64,
}

pub fn write_allocation_json<W: Write>(allocation: &Allocation, writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, allocation)?;
    Ok(())
}

pub fn write_allocation_csv<W: Write>(allocation: &Allocation, writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (date, fragments) in allocation.days() {
        for fragment in fragments {
            writer.serialize(FragmentCsvRecord {
                date,
                item_index: fragment.item_index,
                status: fragment.status.clone(),
                subject: fragment.subject.clone(),
                duration_minutes: fragment.duration_minutes,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn save_allocation_to_json<P: AsRef<Path>>(allocation: &Allocation, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_allocation_json(allocation, file)
}

pub fn save_allocation_to_csv<P: AsRef<Path>>(allocation: &Allocation, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_allocation_csv(allocation, file)
}

pub fn load_allocation_from_json<P: AsRef<Path>>(path: P) -> ExportResult<Allocation> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
