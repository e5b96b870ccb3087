// src/models/order.rs

use serde::{Deserialize, Serialize};

/// A persisted order array with its write version. One record per scope;
/// the version is incremented on every successful database write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedOrder {
    pub version: i64,
    pub ids: Vec<i64>,
}

/// DTO shared by all reorder endpoints. Indices refer to the current
/// display order of the list being reordered.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub src_index: usize,
    pub dst_index: usize,
}

/// The new display order after a reorder.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Vec<i64>,
}
