pub mod allocation;
pub mod scaling;

pub use allocation::{DayAllocator, MINUTE_EPSILON, allocate};
pub use scaling::{scale_item, scale_items};
