use std::{net::SocketAddr, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::ics::{CALENDAR_FILE_NAME, CALENDAR_MIME_TYPE};
use crate::{Allocation, ScheduleError, ScheduleRequest};

pub const ADDR_ENV: &str = "STUDY_SCHEDULE_HTTP_ADDR";
pub const TIMEZONE_ENV: &str = "STUDY_SCHEDULE_TIMEZONE";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Study Schedule Generator</title></head>
<body>
  <h2>Generate Study Schedule</h2>
  <form method="post">
    <p><label>Start Date (YYYY-MM-DD): <input type="text" name="start_date" required></label></p>
    <p><label>Study Days (1=Monday, ..., 7=Sunday), separated by commas: <input type="text" name="study_days" required></label></p>
    <p><label>Start Time (HH:MM): <input type="text" name="start_time" required></label></p>
    <p><label>Daily Study Limit Hours: <input type="number" name="daily_study_limit_hours" required></label></p>
    <p><label>Multiplier: <input type="text" name="multiplier" required></label></p>
    <p><label>Class Input:<br><textarea name="class_input" rows="10" cols="60"></textarea></label></p>
    <input type="submit" value="Generate Schedule">
  </form>
</body>
</html>
"#;

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Zone applied when a request does not name one.
    pub default_timezone: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            default_timezone: std::env::var(TIMEZONE_ENV)
                .ok()
                .filter(|tz| !tz.trim().is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn prepare(&self, mut request: ScheduleRequest) -> ScheduleRequest {
        let missing = request
            .timezone
            .as_deref()
            .is_none_or(|tz| tz.trim().is_empty());
        if missing {
            request.timezone = self.config.default_timezone.clone();
        }
        request
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Unschedulable(String),
    OutOfRange(String),
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        let message = value.to_string();
        if value.is_unschedulable() {
            ApiError::Unschedulable(message)
        } else if value.field().is_some() {
            ApiError::Invalid(message)
        } else {
            ApiError::OutOfRange(message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unschedulable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unschedulable", message)
            }
            ApiError::OutOfRange(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "date_out_of_range", message)
            }
        };
        warn!(%status, %message, "schedule request rejected");
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page).post(generate_calendar))
        .route("/allocation", post(allocation_json))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: ServerConfig) -> std::io::Result<()> {
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn generate_calendar(
    State(state): State<AppState>,
    Form(request): Form<ScheduleRequest>,
) -> Result<Response, ApiError> {
    let plan = state.prepare(request).validate()?;
    let generated = plan.generate(Utc::now())?;
    info!(
        days = generated.allocation.day_count(),
        fragments = generated.allocation.fragment_count(),
        "calendar generated"
    );
    let headers = [
        (
            header::CONTENT_TYPE,
            format!("{CALENDAR_MIME_TYPE}; charset=utf-8"),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{CALENDAR_FILE_NAME}\""),
        ),
    ];
    Ok((headers, generated.calendar).into_response())
}

async fn allocation_json(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<Allocation>, ApiError> {
    let plan = state.prepare(request).validate()?;
    Ok(Json(plan.allocate()?))
}
