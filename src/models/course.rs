// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::task::Task;

/// Course category. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Programming,
    Language,
    Math,
    Science,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

/// Represents the 'courses' table. Courses are shared across all users.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Course with its tasks inlined, in display order.
#[derive(Debug, Serialize)]
pub struct CourseWithTasks {
    #[serde(flatten)]
    pub course: Course,
    pub tasks: Vec<Task>,
}

/// DTO for creating a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title length must be between 1 and 200 characters."
        ),
        custom(function = crate::models::not_blank)
    )]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// DTO for updating a course. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title length must be between 1 and 200 characters."
        ),
        custom(function = crate::models::not_blank)
    )]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    pub description: Option<String>,
    pub category: Option<Category>,
}
