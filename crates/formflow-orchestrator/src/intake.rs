use std::sync::Arc;

use formflow_workflow::{RunInput, Tenant, WorkflowRun};
use serde::Serialize;
use tracing::error;

use crate::error::OrchestratorError;
use crate::events::{NoopNotifier, RunNotifier};
use crate::orchestrator::RunOrchestrator;
use crate::runner::{RunJob, RunSender};

/// Acknowledgement for an accepted form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub run_id: String,
  pub workflow_id: String,
  /// Where to send the submitter, when the workflow configures it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub redirect_url: Option<String>,
}

/// Accepts submissions and retries and hands them to the background runner.
pub struct Intake<N: RunNotifier = NoopNotifier> {
  orchestrator: Arc<RunOrchestrator<N>>,
  sender: RunSender,
}

impl<N: RunNotifier> Intake<N> {
  pub fn new(orchestrator: Arc<RunOrchestrator<N>>, sender: RunSender) -> Self {
    Self {
      orchestrator,
      sender,
    }
  }

  /// Create a queued run for `form_data` and dispatch it.
  ///
  /// Fails only when the workflow does not exist. Form data is mirrored to
  /// the workflow's named form first when the orchestrator has a submission
  /// sink. If the runner does not accept the job, the run stays `queued`.
  pub async fn submit(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    form_data: RunInput,
  ) -> Result<Submission, OrchestratorError> {
    let (config, run) = self
      .orchestrator
      .enqueue(tenant, workflow_id, form_data)
      .await?;
    self.hand_off(tenant, &run).await;

    Ok(Submission {
      run_id: run.id().to_string(),
      workflow_id: workflow_id.to_string(),
      redirect_url: config.redirect_url,
    })
  }

  /// Create a queued sibling of an existing run and dispatch it.
  pub async fn retry(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<WorkflowRun, OrchestratorError> {
    let run = self
      .orchestrator
      .retry_run(tenant, workflow_id, run_id)
      .await?;
    self.hand_off(tenant, &run).await;
    Ok(run)
  }

  async fn hand_off(&self, tenant: &Tenant, run: &WorkflowRun) {
    let job = RunJob {
      tenant: tenant.clone(),
      workflow_id: run.workflow_id().to_string(),
      run_id: run.id().to_string(),
    };
    if let Err(e) = self.sender.dispatch(job).await {
      error!(run_id = %run.id(), error = %e, "run_dispatch_failed");
    }
  }
}
