// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, courses, progress, sessions, tasks, users},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, courses, tasks, sessions).
/// * Everything outside /api/auth sits behind the JWT middleware.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config, Order Store).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse::<axum::http::HeaderValue>().unwrap(),
        "http://127.0.0.1:3000".parse::<axum::http::HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/reorder", put(users::reorder_users))
        .route(
            "/{id}",
            put(users::update_user).delete(users::delete_user),
        );

    let course_routes = Router::new()
        .route("/", get(courses::list_courses).post(courses::create_course))
        .route("/reorder", put(courses::reorder_courses))
        .route(
            "/{id}",
            put(courses::update_course).delete(courses::delete_course),
        )
        .route(
            "/{id}/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route("/{id}/tasks/reorder", put(tasks::reorder_tasks))
        .route("/{id}/progress", get(progress::course_progress))
        .route("/{id}/study-time", get(sessions::course_study_time));

    let task_routes = Router::new()
        .route(
            "/{id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/{id}/completion", put(tasks::set_completion))
        .route("/{id}/toggle", post(tasks::toggle_completion));

    let session_routes = Router::new()
        .route(
            "/",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/{id}",
            put(sessions::update_session).delete(sessions::delete_session),
        );

    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/sessions", session_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
