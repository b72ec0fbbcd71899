pub mod allocation;
pub mod calculations;
pub mod calendar;
pub mod error;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ics;
pub mod item;
pub mod parser;
pub mod request;

pub use allocation::Allocation;
pub use calculations::{DayAllocator, allocate, scale_items};
pub use calendar::StudyWeek;
pub use error::{ExportError, ScheduleError, ScheduleResult};
pub use export::{
    load_allocation_from_json, save_allocation_to_csv, save_allocation_to_json,
    write_allocation_csv, write_allocation_json,
};
pub use ics::{CalendarEmitter, StudyBlockEvent, emit};
pub use item::{Fragment, StudyItem};
pub use parser::parse_items;
pub use request::{GeneratedSchedule, SchedulePlan, ScheduleRequest, generate_schedule};
