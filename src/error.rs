use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised while validating input or building a schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// The weekday set is empty, so the cursor would never find a study day.
    #[error("unschedulable configuration: no weekday is selected for study")]
    NoQualifyingDay,

    #[error("unschedulable configuration: daily capacity must be positive (got {minutes} minutes)")]
    NonPositiveCapacity { minutes: f64 },

    #[error("schedule runs past the last representable date ({date})")]
    DateOverflow { date: NaiveDate },
}

impl ScheduleError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ScheduleError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// True for configuration hazards that would keep the allocator from terminating.
    pub fn is_unschedulable(&self) -> bool {
        matches!(
            self,
            ScheduleError::NoQualifyingDay | ScheduleError::NonPositiveCapacity { .. }
        )
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ScheduleError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
