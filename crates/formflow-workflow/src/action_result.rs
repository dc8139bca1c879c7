use formflow_config::WorkflowAction;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one configured action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
  /// Condition held and the side effect was started.
  Triggered,
  /// Condition did not hold.
  Skipped,
  /// Condition held but the side effect could not be started.
  Error,
}

/// Per-action record stored on a run. `actionName` is copied so the record
/// reads without the workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
  pub action_id: String,
  pub action_name: String,
  pub status: ActionStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub agent_runner_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl ActionResult {
  pub fn skipped(action: &WorkflowAction) -> Self {
    Self::new(action, ActionStatus::Skipped)
  }

  pub fn triggered(action: &WorkflowAction, agent_runner_id: impl Into<String>) -> Self {
    Self {
      agent_runner_id: Some(agent_runner_id.into()),
      ..Self::new(action, ActionStatus::Triggered)
    }
  }

  pub fn failed(action: &WorkflowAction, error: impl Into<String>) -> Self {
    Self {
      error: Some(error.into()),
      ..Self::new(action, ActionStatus::Error)
    }
  }

  fn new(action: &WorkflowAction, status: ActionStatus) -> Self {
    Self {
      action_id: action.id.clone(),
      action_name: action.name.clone(),
      status,
      agent_runner_id: None,
      error: None,
    }
  }
}
