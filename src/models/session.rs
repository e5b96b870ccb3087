// src/models/session.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'study_sessions' table: an append-only log of time spent
/// studying a course, owned by a single user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,

    /// Duration in minutes.
    pub duration: i64,

    pub notes: String,
    pub session_date: chrono::DateTime<chrono::Utc>,
}

/// DTO for logging a study session.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    pub course_id: i64,
    #[validate(range(min = 0, max = 1440, message = "Duration must be between 0 and 1440 minutes."))]
    pub duration: i64,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters."))]
    pub notes: Option<String>,
    /// Defaults to the current time when omitted.
    pub session_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for updating a session. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSessionRequest {
    #[validate(range(min = 0, max = 1440, message = "Duration must be between 0 and 1440 minutes."))]
    pub duration: Option<i64>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters."))]
    pub notes: Option<String>,
}

/// Total study time for one course, for chart consumption.
#[derive(Debug, Serialize)]
pub struct StudyTimeResponse {
    pub course_id: i64,
    pub total_minutes: i64,
}
