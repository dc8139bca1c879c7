use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use formflow_actions::{SideEffectTrigger, TriggerError, TriggerReceipt};
use formflow_config::{OutputSchema, SchemaType, WorkflowConfig};
use formflow_orchestrator::{ChannelNotifier, Intake, RunEvent, RunOrchestrator, RunRunner};
use formflow_provider::{CompletionGateway, ProviderError};
use formflow_store::{BlobRepository, InMemoryBlobStore, RunStore, WorkflowRepository};
use formflow_workflow::{RunStatus, Tenant};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct EchoGateway;

#[async_trait]
impl CompletionGateway for EchoGateway {
  async fn invoke(
    &self,
    _config: &WorkflowConfig,
    input: &Map<String, Value>,
  ) -> Result<Map<String, Value>, ProviderError> {
    Ok(input.clone())
  }
}

struct NoTrigger;

#[async_trait]
impl SideEffectTrigger for NoTrigger {
  async fn trigger(
    &self,
    _tenant: &Tenant,
    _instruction: &str,
  ) -> Result<TriggerReceipt, TriggerError> {
    Err(TriggerError::MissingToken)
  }
}

fn config() -> WorkflowConfig {
  WorkflowConfig {
    id: "wf-1".to_string(),
    name: "Echo".to_string(),
    form_name: None,
    input_fields: vec![],
    prompt: "Echo".to_string(),
    output_schema: OutputSchema::of(SchemaType::Object),
    provider: "anthropic".to_string(),
    model: "claude-sonnet-4-20250514".to_string(),
    redirect_url: Some("https://example.com/thanks".to_string()),
    actions: vec![],
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

async fn next_terminal(events: &mut mpsc::UnboundedReceiver<RunEvent>) -> RunEvent {
  loop {
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
      .await
      .unwrap()
      .unwrap();
    if matches!(event, RunEvent::RunSucceeded { .. } | RunEvent::RunFailed { .. }) {
      return event;
    }
  }
}

#[tokio::test]
async fn test_submit_processes_in_background() {
  let tenant = Tenant::new("site-1");
  let repo = Arc::new(BlobRepository::new(InMemoryBlobStore::new()));
  repo.put_config(&tenant, &config()).await.unwrap();

  let (tx, mut events) = mpsc::unbounded_channel();
  let orchestrator = Arc::new(RunOrchestrator::with_notifier(
    repo.clone(),
    repo.clone(),
    Arc::new(EchoGateway),
    Arc::new(NoTrigger),
    ChannelNotifier::new(tx),
  ));

  let runner = RunRunner::new(orchestrator.clone());
  let intake = Intake::new(orchestrator, runner.sender());
  let cancel = CancellationToken::new();
  let handle = tokio::spawn(runner.start(cancel.clone()));

  let submission = intake
    .submit(&tenant, "wf-1", json!({ "msg": "hi" }).as_object().cloned().unwrap())
    .await
    .unwrap();
  assert_eq!(submission.redirect_url.as_deref(), Some("https://example.com/thanks"));

  let event = next_terminal(&mut events).await;
  assert_eq!(
    event,
    RunEvent::RunSucceeded {
      run_id: submission.run_id.clone(),
      workflow_id: "wf-1".to_string(),
    }
  );

  let run = repo
    .get_run(&tenant, "wf-1", &submission.run_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(run.status(), RunStatus::Success);
  assert_eq!(run.output().unwrap()["msg"], "hi");

  let retry = intake.retry(&tenant, "wf-1", &submission.run_id).await.unwrap();
  assert_eq!(retry.retry_count(), 1);
  let event = next_terminal(&mut events).await;
  assert!(matches!(event, RunEvent::RunSucceeded { ref run_id, .. } if run_id == retry.id()));

  cancel.cancel();
  handle.await.unwrap();
}

#[tokio::test]
async fn test_runner_stops_when_senders_dropped() {
  let repo = Arc::new(BlobRepository::new(InMemoryBlobStore::new()));
  let orchestrator = Arc::new(RunOrchestrator::new(
    repo.clone(),
    repo,
    Arc::new(EchoGateway),
    Arc::new(NoTrigger),
  ));

  let runner = RunRunner::new(orchestrator);
  let sender = runner.sender();
  let handle = tokio::spawn(runner.start(CancellationToken::new()));

  drop(sender);
  tokio::time::timeout(Duration::from_secs(5), handle)
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn test_closed_runner_leaves_run_queued() {
  let tenant = Tenant::new("site-1");
  let repo = Arc::new(BlobRepository::new(InMemoryBlobStore::new()));
  repo.put_config(&tenant, &config()).await.unwrap();
  let orchestrator = Arc::new(RunOrchestrator::new(
    repo.clone(),
    repo.clone(),
    Arc::new(EchoGateway),
    Arc::new(NoTrigger),
  ));

  let runner = RunRunner::new(orchestrator.clone());
  let intake = Intake::new(orchestrator, runner.sender());
  drop(runner);

  let submission = intake.submit(&tenant, "wf-1", Map::new()).await.unwrap();
  let run = repo
    .get_run(&tenant, "wf-1", &submission.run_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(run.status(), RunStatus::Queued);
}
