// src/handlers/tasks.rs

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
    handlers::{progress::user_course_progress, users::sort_by_order},
    models::{
        order::{OrderResponse, ReorderRequest},
        task::{CompletionResponse, CreateTaskRequest, SetCompletionRequest, Task, UpdateTaskRequest},
    },
    ordering::{self, OrderScope},
    store::OrderStore,
    utils::jwt::Claims,
};

async fn ensure_course_exists(pool: &SqlitePool, course_id: i64) -> Result<(), AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(pool)
        .await?;
    exists.ok_or(AppError::NotFound("Course not found".to_string()))?;
    Ok(())
}

async fn fetch_task(pool: &SqlitePool, task_id: i64) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>("SELECT id, course_id, title, created_at FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Task not found".to_string()))
}

/// Lists a course's tasks in display order.
pub async fn list_tasks(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_course_exists(&pool, course_id).await?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, course_id, title, created_at FROM tasks WHERE course_id = ? ORDER BY id",
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let order = orders.load_reconciled(&OrderScope::Tasks(course_id), &ids).await;

    Ok(Json(sort_by_order(tasks, &order, |t| t.id)))
}

/// Creates a task in a course. The new id is appended to the course's
/// task order.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_course_exists(&pool, course_id).await?;

    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (course_id, title, created_at)
        VALUES (?, ?, ?)
        RETURNING id, course_id, title, created_at
        "#,
    )
    .bind(course_id)
    .bind(payload.title.trim())
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE course_id = ? ORDER BY id")
        .bind(course_id)
        .fetch_all(&pool)
        .await?;
    orders.load_reconciled(&OrderScope::Tasks(course_id), &ids).await;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Renames a task.
pub async fn update_task(
    State(pool): State<SqlitePool>,
    Path(task_id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET title = ?
        WHERE id = ?
        RETURNING id, course_id, title, created_at
        "#,
    )
    .bind(payload.title.trim())
    .bind(task_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task and its completion rows, then drops its id from the
/// course's task order.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let task = fetch_task(&pool, task_id).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM task_completions WHERE task_id = ?")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE course_id = ? ORDER BY id")
        .bind(task.course_id)
        .fetch_all(&pool)
        .await?;
    orders.load_reconciled(&OrderScope::Tasks(task.course_id), &ids).await;

    Ok(Json(json!({ "success": true })))
}

/// Moves a task from one position to another within its course.
pub async fn reorder_tasks(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(course_id): Path<i64>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_course_exists(&pool, course_id).await?;

    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE course_id = ? ORDER BY id")
        .bind(course_id)
        .fetch_all(&pool)
        .await?;

    let current = orders.load_reconciled(&OrderScope::Tasks(course_id), &ids).await;
    let moved = ordering::move_item(&current, payload.src_index, payload.dst_index)?;
    let saved = orders.save(&OrderScope::Tasks(course_id), &moved).await?;

    Ok(Json(OrderResponse { order: saved.ids }))
}

/// Sets a completion flag for a task and returns the recomputed course
/// progress. The shared progress view may set the flag for any user;
/// without an explicit user_id the flag belongs to the caller.
pub async fn set_completion(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(task_id): Path<i64>,
    Json(payload): Json<SetCompletionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = fetch_task(&pool, task_id).await?;

    let user_id = match payload.user_id {
        Some(id) => {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&pool)
                .await?;
            exists.ok_or(AppError::NotFound("User not found".to_string()))?
        }
        None => claims.user_id(),
    };

    write_completion(&pool, user_id, &task, payload.completed).await
}

/// Flips the current user's completion flag for a task. Toggling twice
/// restores both the flag and the derived progress percent.
pub async fn toggle_completion(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(task_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let task = fetch_task(&pool, task_id).await?;

    let current: Option<bool> = sqlx::query_scalar(
        "SELECT completed FROM task_completions WHERE user_id = ? AND task_id = ?",
    )
    .bind(claims.user_id())
    .bind(task_id)
    .fetch_optional(&pool)
    .await?;

    write_completion(&pool, claims.user_id(), &task, !current.unwrap_or(false)).await
}

async fn write_completion(
    pool: &SqlitePool,
    user_id: i64,
    task: &Task,
    completed: bool,
) -> Result<Json<CompletionResponse>, AppError> {
    sqlx::query(
        r#"
        INSERT INTO task_completions (user_id, task_id, completed)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, task_id) DO UPDATE SET completed = excluded.completed
        "#,
    )
    .bind(user_id)
    .bind(task.id)
    .bind(completed)
    .execute(pool)
    .await?;

    let progress = user_course_progress(pool, user_id, task.course_id).await?;

    Ok(Json(CompletionResponse {
        task_id: task.id,
        completed,
        progress,
    }))
}
