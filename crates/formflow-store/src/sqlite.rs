use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::types::Json;

use crate::blob::BlobStore;
use crate::error::StoreError;

/// SQLite-backed blob store.
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
  pool: SqlitePool,
}

impl SqliteBlobStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) the database file at `path` and migrate it.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let store = Self::new(SqlitePool::connect_with(options).await?);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
    let row: Option<(Json<Value>,)> = sqlx::query_as(
      r#"
      SELECT value
      FROM blobs
      WHERE namespace = ? AND key = ?
      "#,
    )
    .bind(namespace)
    .bind(key)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(|(Json(value),)| value))
  }

  async fn put(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
    sqlx::query(
      r#"
      INSERT INTO blobs (namespace, key, value, updated_at)
      VALUES (?, ?, ?, ?)
      ON CONFLICT (namespace, key)
      DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
      "#,
    )
    .bind(namespace)
    .bind(key)
    .bind(Json(value))
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM blobs WHERE namespace = ? AND key = ?")
      .bind(namespace)
      .bind(key)
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound {
        namespace: namespace.to_string(),
        key: key.to_string(),
      });
    }
    Ok(())
  }

  async fn list(
    &self,
    namespace: &str,
    key_prefix: &str,
  ) -> Result<Vec<(String, Value)>, StoreError> {
    let rows: Vec<(String, Json<Value>)> = sqlx::query_as(
      r#"
      SELECT key, value
      FROM blobs
      WHERE namespace = ?
      ORDER BY key
      "#,
    )
    .bind(namespace)
    .fetch_all(&self.pool)
    .await?;

    Ok(
      rows
        .into_iter()
        .filter(|(key, _)| key.starts_with(key_prefix))
        .map(|(key, Json(value))| (key, value))
        .collect(),
    )
  }
}
