// src/handlers/progress.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::users::sort_by_order,
    models::progress::{CourseProgressResponse, UserProgress},
    ordering::OrderScope,
    store::OrderStore,
};

/// Computes one user's completion percent for a course from the
/// completion rows. A course with no tasks is 0% complete.
pub(crate) async fn user_course_progress(
    pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(pool)
        .await?;

    if total == 0 {
        return Ok(0);
    }

    let completed: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM task_completions tc
        JOIN tasks t ON tc.task_id = t.id
        WHERE t.course_id = ? AND tc.user_id = ? AND tc.completed = TRUE
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok((completed as f64 / total as f64 * 100.0).round() as i64)
}

/// Returns every user's progress for a course, plus the average across
/// users. Both are derived on read; nothing here is cached or stored.
pub async fn course_progress(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Course not found".to_string()))?;

    let users: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users ORDER BY id")
        .fetch_all(&pool)
        .await?;

    // Same display order as the user list
    let ids: Vec<i64> = users.iter().map(|(id, _)| *id).collect();
    let user_order = orders.load_reconciled(&OrderScope::Users, &ids).await;
    let users = sort_by_order(users, &user_order, |(id, _)| *id);

    let mut entries = Vec::with_capacity(users.len());
    for (user_id, name) in users {
        let progress = user_course_progress(&pool, user_id, course_id).await?;
        entries.push(UserProgress {
            user_id,
            name,
            progress,
        });
    }

    let average = if entries.is_empty() {
        0
    } else {
        let total: i64 = entries.iter().map(|e| e.progress).sum();
        (total as f64 / entries.len() as f64).round() as i64
    };

    Ok(Json(CourseProgressResponse {
        course_id,
        users: entries,
        average,
    }))
}
