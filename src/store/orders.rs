// src/store/orders.rs

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::{
    error::AppError,
    models::order::VersionedOrder,
    ordering::{self, OrderScope},
    store::local::LocalCache,
};

/// Versioned order persistence with a local-file fallback.
///
/// One store serves every ordered scope (courses, users, tasks per
/// course). The write path goes to the database first and degrades to the
/// local cache on failure; the read path prefers the database and falls
/// back to the cache. An absent order on both tiers means the caller uses
/// natural (creation) order.
#[derive(Clone)]
pub struct OrderStore {
    pool: SqlitePool,
    cache: LocalCache,
}

impl OrderStore {
    pub fn new(pool: SqlitePool, cache: LocalCache) -> Self {
        Self { pool, cache }
    }

    /// Loads the stored order for a scope, database first, cache second.
    pub async fn load(&self, scope: &OrderScope) -> Option<VersionedOrder> {
        let key = scope.key();

        let row = sqlx::query("SELECT order_array, version FROM entity_orders WHERE scope_key = ?")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some(row)) => {
                let raw: String = row.get("order_array");
                let version: i64 = row.get("version");
                match serde_json::from_str::<Vec<i64>>(&raw) {
                    Ok(ids) => Some(VersionedOrder { version, ids }),
                    Err(e) => {
                        tracing::warn!("Unparsable order array for scope '{}': {}", key, e);
                        self.cache.read(&key)
                    }
                }
            }
            Ok(None) => self.cache.read(&key),
            Err(e) => {
                tracing::warn!("Order read failed for scope '{}', using local cache: {}", key, e);
                self.cache.read(&key)
            }
        }
    }

    /// Persists an order array with create-or-update semantics.
    ///
    /// On database failure the identical array is written to the local
    /// cache and the operation still reports success (degraded). A
    /// successful database write is mirrored to the cache as well.
    pub async fn save(&self, scope: &OrderScope, ids: &[i64]) -> Result<VersionedOrder, AppError> {
        let key = scope.key();
        let raw = serde_json::to_string(ids)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let written = sqlx::query(
            r#"
            INSERT INTO entity_orders (scope_key, order_array, version, updated_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(scope_key) DO UPDATE SET
                order_array = excluded.order_array,
                version = version + 1,
                updated_at = excluded.updated_at
            RETURNING version
            "#,
        )
        .bind(&key)
        .bind(&raw)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        let value = match written {
            Ok(row) => {
                let version: i64 = row.get("version");
                VersionedOrder {
                    version,
                    ids: ids.to_vec(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Order write failed for scope '{}', falling back to local cache: {}",
                    key,
                    e
                );
                let version = self.cache.read(&key).map(|v| v.version + 1).unwrap_or(1);
                VersionedOrder {
                    version,
                    ids: ids.to_vec(),
                }
            }
        };

        self.cache.write(&key, &value);
        Ok(value)
    }

    /// Drops the order record for a scope from both tiers.
    pub async fn remove(&self, scope: &OrderScope) {
        let key = scope.key();

        if let Err(e) = sqlx::query("DELETE FROM entity_orders WHERE scope_key = ?")
            .bind(&key)
            .execute(&self.pool)
            .await
        {
            tracing::warn!("Order delete failed for scope '{}': {}", key, e);
        }

        self.cache.remove(&key);
    }

    /// Loads the order for a scope and reconciles it against the current
    /// id set. When the stored order is stale (created or deleted
    /// entities), the healed array is opportunistically persisted back.
    pub async fn load_reconciled(&self, scope: &OrderScope, current_ids: &[i64]) -> Vec<i64> {
        let stored = self.load(scope).await.map(|v| v.ids).unwrap_or_default();
        let merged = ordering::reconcile(current_ids, &stored);

        if merged != stored {
            if let Err(e) = self.save(scope, &merged).await {
                tracing::warn!("Failed to persist reconciled order for '{}': {}", scope.key(), e);
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> OrderStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let dir = std::env::temp_dir().join(format!("study-tracker-store-{}", uuid::Uuid::new_v4()));
        OrderStore::new(pool, LocalCache::new(dir))
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let store = test_store().await;
        let scope = OrderScope::Courses;

        store.save(&scope, &[3, 1, 2]).await.unwrap();
        let loaded = store.load(&scope).await.unwrap();
        assert_eq!(loaded.ids, vec![3, 1, 2]);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn version_increments_on_update() {
        let store = test_store().await;
        let scope = OrderScope::Tasks(7);

        let first = store.save(&scope, &[1, 2]).await.unwrap();
        let second = store.save(&scope, &[2, 1]).await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
    }

    #[tokio::test]
    async fn scopes_are_independent() {
        let store = test_store().await;

        store.save(&OrderScope::Courses, &[1, 2]).await.unwrap();
        store.save(&OrderScope::Users, &[9, 8]).await.unwrap();

        assert_eq!(store.load(&OrderScope::Courses).await.unwrap().ids, vec![1, 2]);
        assert_eq!(store.load(&OrderScope::Users).await.unwrap().ids, vec![9, 8]);
    }

    #[tokio::test]
    async fn load_reconciled_heals_and_persists() {
        let store = test_store().await;
        let scope = OrderScope::Courses;

        // 4 was deleted, 6 is new
        store.save(&scope, &[2, 4, 1]).await.unwrap();
        let merged = store.load_reconciled(&scope, &[1, 2, 6]).await;
        assert_eq!(merged, vec![2, 1, 6]);

        // healed array was written back
        let stored = store.load(&scope).await.unwrap();
        assert_eq!(stored.ids, vec![2, 1, 6]);
    }

    #[tokio::test]
    async fn load_reconciled_without_stored_order_uses_natural_order() {
        let store = test_store().await;
        assert_eq!(
            store.load_reconciled(&OrderScope::Users, &[5, 3, 8]).await,
            vec![5, 3, 8]
        );
    }

    #[tokio::test]
    async fn write_falls_back_to_cache_when_database_is_down() {
        let store = test_store().await;
        let scope = OrderScope::Courses;

        store.pool.close().await;

        // write reports success and lands in the cache
        let written = store.save(&scope, &[4, 2]).await.unwrap();
        assert_eq!(written.ids, vec![4, 2]);

        // read falls back to the cache as well
        let loaded = store.load(&scope).await.unwrap();
        assert_eq!(loaded.ids, vec![4, 2]);
    }

    #[tokio::test]
    async fn remove_clears_both_tiers() {
        let store = test_store().await;
        let scope = OrderScope::Tasks(3);

        store.save(&scope, &[1, 2, 3]).await.unwrap();
        store.remove(&scope).await;
        assert!(store.load(&scope).await.is_none());
    }
}
