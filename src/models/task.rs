// src/models/task.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'tasks' table. A task belongs to exactly one course;
/// completion is tracked per user in 'task_completions'.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a task within a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title length must be between 1 and 200 characters."
        ),
        custom(function = crate::models::not_blank)
    )]
    pub title: String,
}

/// DTO for renaming a task.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title length must be between 1 and 200 characters."
        ),
        custom(function = crate::models::not_blank)
    )]
    pub title: String,
}

/// DTO for setting a task's completion flag. The flag belongs to
/// `user_id` when given, otherwise to the current user.
#[derive(Debug, Deserialize)]
pub struct SetCompletionRequest {
    pub user_id: Option<i64>,
    pub completed: bool,
}

/// Completion flag plus the recomputed course progress after the write.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub task_id: i64,
    pub completed: bool,
    pub progress: i64,
}
