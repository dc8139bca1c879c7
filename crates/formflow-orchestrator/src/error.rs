use formflow_store::StoreError;
use formflow_workflow::{RunError, Tenant};

/// Errors surfaced to callers of the orchestrator.
///
/// Provider and action failures are not here: they end up on the run record.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
  #[error("workflow config not found: {workflow_id} (tenant {tenant})")]
  ConfigNotFound { tenant: Tenant, workflow_id: String },

  #[error("run not found: {run_id} (workflow {workflow_id})")]
  RunNotFound { workflow_id: String, run_id: String },

  #[error(transparent)]
  InvalidTransition(#[from] RunError),

  #[error("store error: {0}")]
  Store(#[from] StoreError),

  #[error("run runner is not accepting jobs")]
  RunnerClosed,
}
