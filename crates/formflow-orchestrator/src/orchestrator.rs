use std::sync::Arc;

use formflow_actions::{ActionDispatcher, SideEffectTrigger, SubmissionSink};
use formflow_config::WorkflowConfig;
use formflow_provider::{CompletionGateway, ProviderError};
use formflow_store::{RunStore, WorkflowRepository};
use formflow_workflow::{
  ActionResult, RunInput, RunOutput, RunStatus, RunUpdate, Tenant, WorkflowRun,
};
use tracing::{error, info, instrument, warn};

use crate::error::OrchestratorError;
use crate::events::{NoopNotifier, RunEvent, RunNotifier};

/// Drives one run at a time through its state machine.
///
/// Generic over `N: RunNotifier`; `RunOrchestrator::new` discards events,
/// `with_notifier` forwards them.
pub struct RunOrchestrator<N: RunNotifier = NoopNotifier> {
  workflows: Arc<dyn WorkflowRepository>,
  runs: Arc<dyn RunStore>,
  gateway: Arc<dyn CompletionGateway>,
  dispatcher: ActionDispatcher,
  forms: Option<Arc<dyn SubmissionSink>>,
  notifier: N,
}

impl RunOrchestrator<NoopNotifier> {
  pub fn new(
    workflows: Arc<dyn WorkflowRepository>,
    runs: Arc<dyn RunStore>,
    gateway: Arc<dyn CompletionGateway>,
    trigger: Arc<dyn SideEffectTrigger>,
  ) -> Self {
    Self::with_notifier(workflows, runs, gateway, trigger, NoopNotifier)
  }
}

impl<N: RunNotifier> RunOrchestrator<N> {
  pub fn with_notifier(
    workflows: Arc<dyn WorkflowRepository>,
    runs: Arc<dyn RunStore>,
    gateway: Arc<dyn CompletionGateway>,
    trigger: Arc<dyn SideEffectTrigger>,
    notifier: N,
  ) -> Self {
    Self {
      workflows,
      runs,
      gateway,
      dispatcher: ActionDispatcher::new(trigger),
      forms: None,
      notifier,
    }
  }

  /// Mirror submissions to the site form named by each workflow's `formName`.
  pub fn with_submission_sink(mut self, sink: Arc<dyn SubmissionSink>) -> Self {
    self.forms = Some(sink);
    self
  }

  pub fn workflows(&self) -> &Arc<dyn WorkflowRepository> {
    &self.workflows
  }

  pub fn runs(&self) -> &Arc<dyn RunStore> {
    &self.runs
  }

  /// Create and persist a `queued` run for a form submission.
  ///
  /// When the workflow names a form and a submission sink is configured, the
  /// raw form data is mirrored there first. Neither a mirroring failure nor a
  /// failure to persist the run is returned: both are logged and the run is
  /// still handed back so the caller can dispatch it.
  pub async fn enqueue(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    input: RunInput,
  ) -> Result<(WorkflowConfig, WorkflowRun), OrchestratorError> {
    let config = self.load_config(tenant, workflow_id).await?;
    self.mirror_submission(tenant, &config, &input).await;
    let run = WorkflowRun::queued(&config, input);

    if let Err(e) = self.runs.put_run(tenant, &run).await {
      error!(run_id = %run.id(), workflow_id, error = %e, "run_persist_failed");
    }

    info!(run_id = %run.id(), workflow_id, "run_queued");
    self.notifier.notify(RunEvent::RunQueued {
      run_id: run.id().to_string(),
      workflow_id: workflow_id.to_string(),
      retry_count: run.retry_count(),
    });

    Ok((config, run))
  }

  /// Create a `queued` sibling of an existing run.
  ///
  /// The original run, in whatever state, is left untouched. The caller is
  /// responsible for starting the new run.
  pub async fn retry_run(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<WorkflowRun, OrchestratorError> {
    let original = self.load_run(tenant, workflow_id, run_id).await?;
    let retry = WorkflowRun::retry_of(&original);
    self.runs.put_run(tenant, &retry).await?;

    info!(
      run_id = %retry.id(),
      retry_of = run_id,
      retry_count = retry.retry_count(),
      "run_retried"
    );
    self.notifier.notify(RunEvent::RunQueued {
      run_id: retry.id().to_string(),
      workflow_id: workflow_id.to_string(),
      retry_count: retry.retry_count(),
    });

    Ok(retry)
  }

  /// Process a queued run to a terminal state and return the final record.
  ///
  /// Only a missing config or run is returned as an error; nothing is mutated
  /// in that case. A run that is no longer `queued` (a duplicate dispatch, say)
  /// is logged and handed back as stored. Every other failure is recorded on
  /// the run as status `error`.
  #[instrument(
    name = "run_process",
    skip(self, tenant),
    fields(tenant = %tenant)
  )]
  pub async fn start_run(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<WorkflowRun, OrchestratorError> {
    let config = self.load_config(tenant, workflow_id).await?;
    let mut run = self.load_run(tenant, workflow_id, run_id).await?;

    if run.status() != RunStatus::Queued {
      warn!(run_id, status = %run.status(), "run_not_startable");
      return Ok(run);
    }

    run.apply(RunUpdate::start())?;
    self.persist(tenant, &run).await;
    info!(run_id, provider = %config.provider, model = %config.model, "run_started");
    self.notifier.notify(RunEvent::RunStarted {
      run_id: run_id.to_string(),
      workflow_id: workflow_id.to_string(),
    });

    let update = match self.transform(tenant, config, run.input().clone()).await {
      Ok((output, action_results)) => {
        if let Some(results) = &action_results {
          for result in results {
            self.notifier.notify(RunEvent::ActionCompleted {
              run_id: run_id.to_string(),
              action_id: result.action_id.clone(),
              status: result.status,
            });
          }
        }
        RunUpdate::succeed(output, action_results)
      }
      Err(message) => RunUpdate::fail(message),
    };

    run.apply(update)?;
    self.persist(tenant, &run).await;

    match run.error() {
      None => {
        info!(run_id, "run_succeeded");
        self.notifier.notify(RunEvent::RunSucceeded {
          run_id: run_id.to_string(),
          workflow_id: workflow_id.to_string(),
        });
      }
      Some(message) => {
        warn!(run_id, error = %message, "run_failed");
        self.notifier.notify(RunEvent::RunFailed {
          run_id: run_id.to_string(),
          workflow_id: workflow_id.to_string(),
          error: message.to_string(),
        });
      }
    }

    Ok(run)
  }

  /// Call the gateway, then dispatch actions when there are any.
  ///
  /// Runs on its own task so that a panic inside either stage ends the run
  /// in `error` instead of leaving it in `processing`.
  async fn transform(
    &self,
    tenant: &Tenant,
    config: WorkflowConfig,
    input: RunInput,
  ) -> Result<(RunOutput, Option<Vec<ActionResult>>), String> {
    let gateway = Arc::clone(&self.gateway);
    let dispatcher = self.dispatcher.clone();
    let tenant = tenant.clone();

    let stage = tokio::spawn(async move {
      let output = gateway.invoke(&config, &input).await?;
      let action_results = if config.has_actions() {
        Some(
          dispatcher
            .dispatch(&config.actions, &input, &output, &tenant)
            .await,
        )
      } else {
        None
      };
      Ok::<_, ProviderError>((output, action_results))
    });

    match stage.await {
      Ok(Ok(result)) => Ok(result),
      Ok(Err(e)) => Err(e.to_string()),
      Err(e) => Err(format!("unexpected failure: {e}")),
    }
  }

  async fn mirror_submission(&self, tenant: &Tenant, config: &WorkflowConfig, input: &RunInput) {
    let (Some(sink), Some(form_name)) = (&self.forms, config.form_name.as_deref()) else {
      return;
    };

    match sink.record(tenant, form_name, input).await {
      Ok(()) => info!(workflow_id = %config.id, form_name, "form_mirrored"),
      Err(e) => warn!(workflow_id = %config.id, form_name, error = %e, "form_mirror_failed"),
    }
  }

  async fn load_config(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
  ) -> Result<WorkflowConfig, OrchestratorError> {
    self
      .workflows
      .get_config(tenant, workflow_id)
      .await?
      .ok_or_else(|| OrchestratorError::ConfigNotFound {
        tenant: tenant.clone(),
        workflow_id: workflow_id.to_string(),
      })
  }

  async fn load_run(
    &self,
    tenant: &Tenant,
    workflow_id: &str,
    run_id: &str,
  ) -> Result<WorkflowRun, OrchestratorError> {
    self
      .runs
      .get_run(tenant, workflow_id, run_id)
      .await?
      .ok_or_else(|| OrchestratorError::RunNotFound {
        workflow_id: workflow_id.to_string(),
        run_id: run_id.to_string(),
      })
  }

  /// Write the run, logging rather than returning a failure.
  async fn persist(&self, tenant: &Tenant, run: &WorkflowRun) {
    if let Err(e) = self.runs.put_run(tenant, run).await {
      error!(
        run_id = %run.id(),
        status = %run.status(),
        error = %e,
        "run_persist_failed"
      );
    }
  }
}
