// src/ordering.rs

use crate::error::AppError;

/// A list scope that carries its own persisted order array.
///
/// Courses and users each have a single global order; tasks are ordered
/// per parent course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    Courses,
    Users,
    Tasks(i64),
}

impl OrderScope {
    /// Stable key identifying the scope, shared by the `entity_orders`
    /// table and the local cache file name.
    pub fn key(&self) -> String {
        match self {
            OrderScope::Courses => "course_order".to_string(),
            OrderScope::Users => "user_order".to_string(),
            OrderScope::Tasks(course_id) => format!("task_order_{}", course_id),
        }
    }
}

/// Merges a stored order array against the authoritative set of ids.
///
/// Ids from `stored_order` that still exist keep their relative order;
/// ids missing from the stored order (newly created entities) are appended
/// in their `current_ids` order; stale ids are dropped. The result is
/// always a permutation of `current_ids`, and reconciling an already
/// reconciled order is a no-op.
pub fn reconcile(current_ids: &[i64], stored_order: &[i64]) -> Vec<i64> {
    let mut ordered: Vec<i64> = stored_order
        .iter()
        .copied()
        .filter(|id| current_ids.contains(id))
        .collect();

    ordered.extend(
        current_ids
            .iter()
            .copied()
            .filter(|id| !stored_order.contains(id)),
    );

    ordered
}

/// Moves a single element from `src` to `dst`.
///
/// The destination index is interpreted against the list after removal,
/// so moving index 0 to index 2 in [A,B,C,D] yields [B,C,A,D]. Equal
/// indices are a successful no-op.
pub fn move_item(list: &[i64], src: usize, dst: usize) -> Result<Vec<i64>, AppError> {
    if src >= list.len() || dst >= list.len() {
        return Err(AppError::BadRequest(format!(
            "Index out of range: src={}, dst={}, len={}",
            src,
            dst,
            list.len()
        )));
    }

    let mut result = list.to_vec();
    if src == dst {
        return Ok(result);
    }

    let moved = result.remove(src);
    result.insert(dst, moved);
    Ok(result)
}
