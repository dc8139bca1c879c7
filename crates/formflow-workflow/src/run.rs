use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formflow_config::WorkflowConfig;
use serde::{Deserialize, Serialize};

use crate::action_result::ActionResult;
use crate::error::RunError;

/// Form data captured at intake.
pub type RunInput = serde_json::Map<String, serde_json::Value>;

/// Structured record produced by the AI provider.
pub type RunOutput = serde_json::Map<String, serde_json::Value>;

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
  Queued,
  Processing,
  Success,
  Error,
}

impl RunStatus {
  /// `success` and `error` are final.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Success | Self::Error)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Queued => "queued",
      Self::Processing => "processing",
      Self::Success => "success",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RunStatus {
  type Err = RunError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "queued" => Ok(Self::Queued),
      "processing" => Ok(Self::Processing),
      "success" => Ok(Self::Success),
      "error" => Ok(Self::Error),
      other => Err(RunError::UnknownStatus(other.to_string())),
    }
  }
}

/// The only changes a run accepts after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
  /// `queued → processing`.
  Start { started_at: DateTime<Utc> },

  /// `processing → success`.
  Succeed {
    output: RunOutput,
    action_results: Option<Vec<ActionResult>>,
    completed_at: DateTime<Utc>,
  },

  /// `processing → error`.
  Fail {
    error: String,
    completed_at: DateTime<Utc>,
  },
}

impl RunUpdate {
  pub fn start() -> Self {
    Self::Start {
      started_at: Utc::now(),
    }
  }

  pub fn succeed(output: RunOutput, action_results: Option<Vec<ActionResult>>) -> Self {
    Self::Succeed {
      output,
      action_results,
      completed_at: Utc::now(),
    }
  }

  pub fn fail(error: impl Into<String>) -> Self {
    Self::Fail {
      error: error.into(),
      completed_at: Utc::now(),
    }
  }

  fn target(&self) -> RunStatus {
    match self {
      Self::Start { .. } => RunStatus::Processing,
      Self::Succeed { .. } => RunStatus::Success,
      Self::Fail { .. } => RunStatus::Error,
    }
  }

  fn allowed_from(&self) -> RunStatus {
    match self {
      Self::Start { .. } => RunStatus::Queued,
      Self::Succeed { .. } | Self::Fail { .. } => RunStatus::Processing,
    }
  }
}

/// One execution attempt of a workflow against one captured input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
  id: String,
  workflow_id: String,
  status: RunStatus,
  input: RunInput,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  output: Option<RunOutput>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  action_results: Option<Vec<ActionResult>>,
  provider: String,
  model: String,
  created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  started_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  completed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  retry_count: u32,
}

impl WorkflowRun {
  /// A fresh `queued` run for a form submission.
  ///
  /// Provider and model are copied from the definition so later edits to it
  /// do not change what this run records.
  pub fn queued(config: &WorkflowConfig, input: RunInput) -> Self {
    Self::new_queued(
      config.id.clone(),
      input,
      config.provider.clone(),
      config.model.clone(),
      0,
    )
  }

  /// A new `queued` sibling of `original` with the same input, provider and
  /// model, a fresh id and `retryCount + 1`. `original` is not touched.
  pub fn retry_of(original: &WorkflowRun) -> Self {
    Self::new_queued(
      original.workflow_id.clone(),
      original.input.clone(),
      original.provider.clone(),
      original.model.clone(),
      original.retry_count.saturating_add(1),
    )
  }

  fn new_queued(
    workflow_id: String,
    input: RunInput,
    provider: String,
    model: String,
    retry_count: u32,
  ) -> Self {
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      workflow_id,
      status: RunStatus::Queued,
      input,
      output: None,
      error: None,
      action_results: None,
      provider,
      model,
      created_at: Utc::now(),
      started_at: None,
      completed_at: None,
      retry_count,
    }
  }

  /// Apply a state transition.
  ///
  /// Fails without modifying the run if the update is not valid from the
  /// current status.
  pub fn apply(&mut self, update: RunUpdate) -> Result<(), RunError> {
    if self.status != update.allowed_from() {
      return Err(RunError::InvalidTransition {
        run_id: self.id.clone(),
        from: self.status,
        to: update.target(),
      });
    }

    match update {
      RunUpdate::Start { started_at } => {
        self.status = RunStatus::Processing;
        self.started_at = Some(started_at);
      }
      RunUpdate::Succeed {
        output,
        action_results,
        completed_at,
      } => {
        self.status = RunStatus::Success;
        self.output = Some(output);
        self.action_results = action_results;
        self.error = None;
        self.completed_at = Some(completed_at);
      }
      RunUpdate::Fail {
        error,
        completed_at,
      } => {
        self.status = RunStatus::Error;
        self.error = Some(error);
        self.output = None;
        self.completed_at = Some(completed_at);
      }
    }

    Ok(())
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn workflow_id(&self) -> &str {
    &self.workflow_id
  }

  pub fn status(&self) -> RunStatus {
    self.status
  }

  pub fn input(&self) -> &RunInput {
    &self.input
  }

  pub fn output(&self) -> Option<&RunOutput> {
    self.output.as_ref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn action_results(&self) -> Option<&[ActionResult]> {
    self.action_results.as_deref()
  }

  pub fn provider(&self) -> &str {
    &self.provider
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    self.started_at
  }

  pub fn completed_at(&self) -> Option<DateTime<Utc>> {
    self.completed_at
  }

  pub fn retry_count(&self) -> u32 {
    self.retry_count
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use formflow_config::{OutputSchema, SchemaType};
  use serde_json::json;

  fn config() -> WorkflowConfig {
    WorkflowConfig {
      id: "wf-1".to_string(),
      name: "Test".to_string(),
      form_name: None,
      input_fields: vec!["msg".to_string()],
      prompt: "Summarize: {{msg}}".to_string(),
      output_schema: OutputSchema::of(SchemaType::Object),
      provider: "anthropic".to_string(),
      model: "claude-sonnet-4-20250514".to_string(),
      redirect_url: None,
      actions: vec![],
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn input() -> RunInput {
    json!({ "msg": "hello" }).as_object().cloned().unwrap()
  }

  #[test]
  fn test_queued_copies_provider_and_model() {
    let run = WorkflowRun::queued(&config(), input());

    assert_eq!(run.status(), RunStatus::Queued);
    assert_eq!(run.workflow_id(), "wf-1");
    assert_eq!(run.provider(), "anthropic");
    assert_eq!(run.model(), "claude-sonnet-4-20250514");
    assert_eq!(run.retry_count(), 0);
    assert!(run.started_at().is_none());
  }

  #[test]
  fn test_full_success_lifecycle() {
    let mut run = WorkflowRun::queued(&config(), input());

    run.apply(RunUpdate::start()).unwrap();
    assert_eq!(run.status(), RunStatus::Processing);
    assert!(run.started_at().is_some());

    let output = json!({ "summary": "hi" }).as_object().cloned().unwrap();
    run.apply(RunUpdate::succeed(output.clone(), None)).unwrap();
    assert_eq!(run.status(), RunStatus::Success);
    assert_eq!(run.output(), Some(&output));
    assert!(run.completed_at().is_some());
    assert!(run.error().is_none());
  }

  #[test]
  fn test_failure_records_message() {
    let mut run = WorkflowRun::queued(&config(), input());
    run.apply(RunUpdate::start()).unwrap();
    run.apply(RunUpdate::fail("boom")).unwrap();

    assert_eq!(run.status(), RunStatus::Error);
    assert_eq!(run.error(), Some("boom"));
    assert!(run.output().is_none());
  }

  #[test]
  fn test_terminal_states_are_final() {
    let mut run = WorkflowRun::queued(&config(), input());
    run.apply(RunUpdate::start()).unwrap();
    run.apply(RunUpdate::fail("boom")).unwrap();
    let before = run.clone();

    for update in [
      RunUpdate::start(),
      RunUpdate::fail("again"),
      RunUpdate::succeed(RunOutput::new(), None),
    ] {
      assert!(matches!(
        run.apply(update),
        Err(RunError::InvalidTransition { from: RunStatus::Error, .. })
      ));
    }
    assert_eq!(run, before);
  }

  #[test]
  fn test_cannot_complete_queued_run() {
    let mut run = WorkflowRun::queued(&config(), input());
    let err = run.apply(RunUpdate::succeed(RunOutput::new(), None)).unwrap_err();

    assert_eq!(
      err,
      RunError::InvalidTransition {
        run_id: run.id().to_string(),
        from: RunStatus::Queued,
        to: RunStatus::Success,
      }
    );
  }

  #[test]
  fn test_retry_of_creates_sibling() {
    let mut original = WorkflowRun::queued(&config(), input());
    original.apply(RunUpdate::start()).unwrap();
    original.apply(RunUpdate::fail("timeout")).unwrap();
    let snapshot = original.clone();

    let retry = WorkflowRun::retry_of(&original);
    let second = WorkflowRun::retry_of(&retry);

    assert_ne!(retry.id(), original.id());
    assert_eq!(retry.workflow_id(), original.workflow_id());
    assert_eq!(retry.input(), original.input());
    assert_eq!(retry.status(), RunStatus::Queued);
    assert_eq!(retry.retry_count(), 1);
    assert!(retry.error().is_none());
    assert_eq!(second.retry_count(), 2);
    assert_eq!(original, snapshot);
  }

  #[test]
  fn test_stored_document_round_trip() {
    let value = json!({
      "id": "run-1",
      "workflowId": "wf-1",
      "status": "success",
      "input": { "msg": "hello" },
      "output": { "summary": "hi" },
      "actionResults": [
        { "actionId": "a1", "actionName": "Notify", "status": "triggered", "agentRunnerId": "r1" }
      ],
      "provider": "anthropic",
      "model": "claude-sonnet-4-20250514",
      "createdAt": "2025-01-01T00:00:00Z",
      "startedAt": "2025-01-01T00:00:01Z",
      "completedAt": "2025-01-01T00:00:02Z",
      "retryCount": 2
    });

    let run: WorkflowRun = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(run.id(), "run-1");
    assert_eq!(run.retry_count(), 2);
    assert_eq!(run.action_results().unwrap()[0].agent_runner_id.as_deref(), Some("r1"));
    assert_eq!(serde_json::to_value(&run).unwrap(), value);
  }

  #[test]
  fn test_status_parse() {
    assert_eq!("processing".parse::<RunStatus>(), Ok(RunStatus::Processing));
    assert_eq!(
      "cancelled".parse::<RunStatus>(),
      Err(RunError::UnknownStatus("cancelled".to_string()))
    );
  }
}
