// src/handlers/courses.rs

use std::collections::HashMap;

use axum::{
    Json,
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
    handlers::users::sort_by_order,
    models::{
        course::{Course, CourseWithTasks, CreateCourseRequest, UpdateCourseRequest},
        order::{OrderResponse, ReorderRequest},
        task::Task,
    },
    ordering::{self, OrderScope},
    store::OrderStore,
    utils::html::clean_text,
};

/// Lists all courses in display order, with each course's tasks inlined
/// in their own display order.
pub async fn list_courses(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, category, created_at FROM courses ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let course_ids: Vec<i64> = courses.iter().map(|c| c.id).collect();
    let course_order = orders.load_reconciled(&OrderScope::Courses, &course_ids).await;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, course_id, title, created_at FROM tasks ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let mut tasks_by_course: HashMap<i64, Vec<Task>> = HashMap::new();
    for task in tasks {
        tasks_by_course.entry(task.course_id).or_default().push(task);
    }

    let mut result = Vec::with_capacity(courses.len());
    for course in sort_by_order(courses, &course_order, |c| c.id) {
        let course_tasks = tasks_by_course.remove(&course.id).unwrap_or_default();
        let task_ids: Vec<i64> = course_tasks.iter().map(|t| t.id).collect();
        let task_order = orders
            .load_reconciled(&OrderScope::Tasks(course.id), &task_ids)
            .await;

        result.push(CourseWithTasks {
            tasks: sort_by_order(course_tasks, &task_order, |t| t.id),
            course,
        });
    }

    Ok(Json(result))
}

/// Creates a course. The new id is appended to the course order.
pub async fn create_course(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let description = clean_text(payload.description.as_deref().unwrap_or(""));

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (title, description, category, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, description, category, created_at
        "#,
    )
    .bind(payload.title.trim())
    .bind(&description)
    .bind(payload.category.unwrap_or_default())
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    // Append the new id to the stored order
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM courses ORDER BY id")
        .fetch_all(&pool)
        .await?;
    orders.load_reconciled(&OrderScope::Courses, &ids).await;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Updates a course's title, description or category.
pub async fn update_course(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, category, created_at FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or(existing.title.as_str());
    let description = payload
        .description
        .as_deref()
        .map(clean_text)
        .unwrap_or(existing.description);
    let category = payload.category.unwrap_or(existing.category);

    let course = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses SET title = ?, description = ?, category = ?
        WHERE id = ?
        RETURNING id, title, description, category, created_at
        "#,
    )
    .bind(title)
    .bind(&description)
    .bind(category)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(course))
}

/// Deletes a course and everything hanging off it: tasks, completions for
/// those tasks, study sessions, and the per-course task order record. A
/// single transaction, so a failed step leaves no orphaned rows.
pub async fn delete_course(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM task_completions WHERE task_id IN (SELECT id FROM tasks WHERE course_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM tasks WHERE course_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM study_sessions WHERE course_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    tx.commit().await?;

    // Drop the per-course task order and scrub the course id out of the
    // stored course order
    orders.remove(&OrderScope::Tasks(id)).await;
    let remaining: Vec<i64> = sqlx::query_scalar("SELECT id FROM courses ORDER BY id")
        .fetch_all(&pool)
        .await?;
    orders.load_reconciled(&OrderScope::Courses, &remaining).await;

    Ok(Json(json!({ "success": true })))
}

/// Moves a course from one position to another in the shared list.
pub async fn reorder_courses(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM courses ORDER BY id")
        .fetch_all(&pool)
        .await?;

    let current = orders.load_reconciled(&OrderScope::Courses, &ids).await;
    let moved = ordering::move_item(&current, payload.src_index, payload.dst_index)?;
    let saved = orders.save(&OrderScope::Courses, &moved).await?;

    Ok(Json(OrderResponse { order: saved.ids }))
}
