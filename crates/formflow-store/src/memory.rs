use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::blob::BlobStore;
use crate::error::StoreError;

/// Process-local blob store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
  blobs: RwLock<BTreeMap<(String, String), Value>>,
}

impl InMemoryBlobStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
  async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
    let blobs = self.blobs.read().await;
    Ok(blobs.get(&(namespace.to_string(), key.to_string())).cloned())
  }

  async fn put(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
    let mut blobs = self.blobs.write().await;
    blobs.insert((namespace.to_string(), key.to_string()), value.clone());
    Ok(())
  }

  async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
    let mut blobs = self.blobs.write().await;
    match blobs.remove(&(namespace.to_string(), key.to_string())) {
      Some(_) => Ok(()),
      None => Err(StoreError::NotFound {
        namespace: namespace.to_string(),
        key: key.to_string(),
      }),
    }
  }

  async fn list(
    &self,
    namespace: &str,
    key_prefix: &str,
  ) -> Result<Vec<(String, Value)>, StoreError> {
    let blobs = self.blobs.read().await;
    Ok(
      blobs
        .iter()
        .filter(|((ns, key), _)| ns == namespace && key.starts_with(key_prefix))
        .map(|((_, key), value)| (key.clone(), value.clone()))
        .collect(),
    )
  }
}
