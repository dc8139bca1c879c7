use async_trait::async_trait;
use formflow_config::WorkflowConfig;
use formflow_workflow::{RunStatus, Tenant, WorkflowRun};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::blob::BlobStore;
use crate::error::StoreError;

const CONFIG_NAMESPACE: &str = "workflow-configs";

/// Durable store of workflow definitions, keyed by (tenant, workflow id).
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
  async fn get_config(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
  ) -> Result<Option<WorkflowConfig>, StoreError>;

  /// Insert or fully replace a definition.
  async fn put_config(&self, tenant: &Tenant, config: &WorkflowConfig) -> Result<(), StoreError>;

  async fn delete_config(&self, tenant: &Tenant, workflow_id: &str) -> Result<(), StoreError>;

  /// All of the tenant's definitions, newest first.
  async fn list_configs(&self, tenant: &Tenant) -> Result<Vec<WorkflowConfig>, StoreError>;
}

/// Durable store of run records, keyed by (tenant, workflow id, run id).
#[async_trait]
pub trait RunStore: Send + Sync {
  async fn get_run(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<Option<WorkflowRun>, StoreError>;

  /// Insert or fully replace a run record.
  async fn put_run(&self, tenant: &Tenant, run: &WorkflowRun) -> Result<(), StoreError>;

  /// Runs of one workflow, newest first, optionally filtered by status.
  async fn list_runs(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    status: Option<RunStatus>,
  ) -> Result<Vec<WorkflowRun>, StoreError>;
}

/// Typed repositories over any [`BlobStore`].
#[derive(Debug, Clone)]
pub struct BlobRepository<B> {
  blobs: B,
}

impl<B: BlobStore> BlobRepository<B> {
  pub fn new(blobs: B) -> Self {
    Self { blobs }
  }

  pub fn blobs(&self) -> &B {
    &self.blobs
  }
}

/// Tenant ids are escaped in keys so a `:` inside one can never make it a
/// prefix of, or collide with, another tenant's keys.
fn tenant_segment(tenant: &Tenant) -> String {
  tenant.as_str().replace('%', "%25").replace(':', "%3A")
}

fn config_prefix(tenant: &Tenant) -> String {
  format!("{}:", tenant_segment(tenant))
}

fn config_key(tenant: &Tenant, workflow_id: &str) -> String {
  format!("{}{workflow_id}", config_prefix(tenant))
}

fn run_namespace(tenant: &Tenant, workflow_id: &str) -> String {
  format!("workflow-runs:{}:{workflow_id}", tenant_segment(tenant))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
  Ok(serde_json::from_value(value)?)
}

fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
  Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl<B: BlobStore> WorkflowRepository for BlobRepository<B> {
  async fn get_config(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
  ) -> Result<Option<WorkflowConfig>, StoreError> {
    self
      .blobs
      .get(CONFIG_NAMESPACE, &config_key(tenant, workflow_id))
      .await?
      .map(decode)
      .transpose()
  }

  async fn put_config(&self, tenant: &Tenant, config: &WorkflowConfig) -> Result<(), StoreError> {
    self
      .blobs
      .put(CONFIG_NAMESPACE, &config_key(tenant, &config.id), &encode(config)?)
      .await
  }

  async fn delete_config(&self, tenant: &Tenant, workflow_id: &str) -> Result<(), StoreError> {
    self
      .blobs
      .delete(CONFIG_NAMESPACE, &config_key(tenant, workflow_id))
      .await
  }

  async fn list_configs(&self, tenant: &Tenant) -> Result<Vec<WorkflowConfig>, StoreError> {
    let mut configs = self
      .blobs
      .list(CONFIG_NAMESPACE, &config_prefix(tenant))
      .await?
      .into_iter()
      .map(|(_, value)| decode::<WorkflowConfig>(value))
      .collect::<Result<Vec<_>, _>>()?;

    configs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(configs)
  }
}

#[async_trait]
impl<B: BlobStore> RunStore for BlobRepository<B> {
  async fn get_run(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<Option<WorkflowRun>, StoreError> {
    self
      .blobs
      .get(&run_namespace(tenant, workflow_id), run_id)
      .await?
      .map(decode)
      .transpose()
  }

  async fn put_run(&self, tenant: &Tenant, run: &WorkflowRun) -> Result<(), StoreError> {
    self
      .blobs
      .put(
        &run_namespace(tenant, run.workflow_id()),
        run.id(),
        &encode(run)?,
      )
      .await
  }

  async fn list_runs(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    status: Option<RunStatus>,
  ) -> Result<Vec<WorkflowRun>, StoreError> {
    let mut runs = self
      .blobs
      .list(&run_namespace(tenant, workflow_id), "")
      .await?
      .into_iter()
      .map(|(_, value)| decode::<WorkflowRun>(value))
      .collect::<Result<Vec<_>, _>>()?;

    if let Some(status) = status {
      runs.retain(|run| run.status() == status);
    }
    runs.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    Ok(runs)
  }
}
