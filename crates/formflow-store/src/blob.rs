use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Namespaced JSON document storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Fetch one document, `None` when absent.
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;

  /// Insert or fully replace a document.
  async fn put(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError>;

  /// Remove a document. `NotFound` when there was nothing to remove.
  async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError>;

  /// Every document in `namespace` whose key starts with `key_prefix`, in key
  /// order.
  async fn list(
    &self,
    namespace: &str,
    key_prefix: &str,
  ) -> Result<Vec<(String, Value)>, StoreError>;
}
