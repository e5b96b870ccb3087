// src/handlers/sessions.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{CreateSessionRequest, StudySession, StudyTimeResponse, UpdateSessionRequest},
    utils::{html::clean_text, jwt::Claims},
};

/// Lists the current user's study sessions, most recent first.
pub async fn list_sessions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = sqlx::query_as::<_, StudySession>(
        r#"
        SELECT id, user_id, course_id, duration, notes, session_date
        FROM study_sessions
        WHERE user_id = ?
        ORDER BY session_date DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(sessions))
}

/// Logs a study session for the current user.
pub async fn create_session(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Course not found".to_string()))?;

    let notes = clean_text(payload.notes.as_deref().unwrap_or(""));
    let session_date = payload.session_date.unwrap_or_else(Utc::now);

    let session = sqlx::query_as::<_, StudySession>(
        r#"
        INSERT INTO study_sessions (user_id, course_id, duration, notes, session_date)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, user_id, course_id, duration, notes, session_date
        "#,
    )
    .bind(claims.user_id())
    .bind(payload.course_id)
    .bind(payload.duration)
    .bind(&notes)
    .bind(session_date)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Updates a session's duration or notes. Owner-scoped: a session id
/// belonging to another user reads as not found.
pub async fn update_session(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing = sqlx::query_as::<_, StudySession>(
        r#"
        SELECT id, user_id, course_id, duration, notes, session_date
        FROM study_sessions
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Study session not found".to_string()))?;

    let duration = payload.duration.unwrap_or(existing.duration);
    let notes = payload
        .notes
        .as_deref()
        .map(clean_text)
        .unwrap_or(existing.notes);

    let session = sqlx::query_as::<_, StudySession>(
        r#"
        UPDATE study_sessions SET duration = ?, notes = ?
        WHERE id = ? AND user_id = ?
        RETURNING id, user_id, course_id, duration, notes, session_date
        "#,
    )
    .bind(duration)
    .bind(&notes)
    .bind(id)
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await?;

    Ok(Json(session))
}

/// Deletes one of the current user's sessions.
pub async fn delete_session(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM study_sessions WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Study session not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

/// Total minutes the current user has logged against a course.
pub async fn course_study_time(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Course not found".to_string()))?;

    let total: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(duration) FROM study_sessions WHERE user_id = ? AND course_id = ?",
    )
    .bind(claims.user_id())
    .bind(course_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(StudyTimeResponse {
        course_id,
        total_minutes: total.unwrap_or(0),
    }))
}
