// src/handlers/users.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        order::{OrderResponse, ReorderRequest},
        user::{UpdateUserRequest, User},
    },
    ordering::{self, OrderScope},
    store::OrderStore,
    utils::jwt::Claims,
};

/// Lists all users in display order.
///
/// The order array is reconciled against the current user set on every
/// read, so newly registered users appear at the end and deleted users
/// leave no dangling id.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, email, name, password, created_at FROM users ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    let ordered = orders.load_reconciled(&OrderScope::Users, &ids).await;

    Ok(Json(sort_by_order(users, &ordered, |u| u.id)))
}

/// Moves a user from one position to another in the shared list.
pub async fn reorder_users(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM users ORDER BY id")
        .fetch_all(&pool)
        .await?;

    let current = orders.load_reconciled(&OrderScope::Users, &ids).await;
    let moved = ordering::move_item(&current, payload.src_index, payload.dst_index)?;
    let saved = orders.save(&OrderScope::Users, &moved).await?;

    Ok(Json(OrderResponse { order: saved.ids }))
}

/// Renames a user.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET name = ?
        WHERE id = ?
        RETURNING id, email, name, password, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes a user together with their completions and study sessions.
///
/// Deleting the currently logged-in account is rejected.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    State(orders): State<OrderStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id() == id {
        return Err(AppError::BadRequest(
            "Cannot delete the currently logged-in user".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM task_completions WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM study_sessions WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tx.commit().await?;

    // Scrub the deleted id out of the stored order
    let remaining: Vec<i64> = sqlx::query_scalar("SELECT id FROM users ORDER BY id")
        .fetch_all(&pool)
        .await?;
    orders.load_reconciled(&OrderScope::Users, &remaining).await;

    Ok(Json(json!({ "success": true })))
}

/// Sorts `items` by the position of their id in `order`. Ids missing from
/// the order array sort last, keeping their relative order.
pub(crate) fn sort_by_order<T, F>(mut items: Vec<T>, order: &[i64], id_of: F) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    let positions: HashMap<i64, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    items.sort_by_key(|item| positions.get(&id_of(item)).copied().unwrap_or(usize::MAX));
    items
}
