// src/models/progress.rs

use serde::Serialize;

/// One user's derived completion percent for a course.
///
/// Progress is never stored; it is recomputed from completion rows on
/// every read, so it cannot drift from the underlying data.
#[derive(Debug, Serialize)]
pub struct UserProgress {
    pub user_id: i64,
    pub name: String,
    pub progress: i64,
}

/// Per-course progress for every user plus the cross-user average.
#[derive(Debug, Serialize)]
pub struct CourseProgressResponse {
    pub course_id: i64,
    pub users: Vec<UserProgress>,
    pub average: i64,
}
