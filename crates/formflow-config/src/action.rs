use serde::{Deserialize, Serialize};

/// Kind of follow-on action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
  /// Start an external agent run with an instruction built from the action's
  /// prompt template.
  #[serde(rename = "trigger-side-effect", alias = "agent_runner")]
  TriggerSideEffect,
}

/// Comparison applied by an [`ActionCondition`].
///
/// Unrecognized operators deserialize to [`ConditionOperator::Unknown`] and
/// never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOperator {
  Always,
  Equals,
  Contains,
  #[serde(other)]
  Unknown,
}

/// Trigger condition for a single action. One condition per action, no
/// composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCondition {
  /// Name of the AI output field to read. Ignored for `always`.
  #[serde(default)]
  pub field: String,

  pub operator: ConditionOperator,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
}

impl ActionCondition {
  /// A condition that always holds.
  pub fn always() -> Self {
    Self {
      field: String::new(),
      operator: ConditionOperator::Always,
      value: None,
    }
  }

  /// `output[field]` equals `value`, ignoring case.
  pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      operator: ConditionOperator::Equals,
      value: Some(value.into()),
    }
  }

  /// `output[field]` contains `value`, ignoring case.
  pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      operator: ConditionOperator::Contains,
      value: Some(value.into()),
    }
  }
}

/// A conditionally-triggered side effect evaluated after a successful AI
/// transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAction {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub action_type: ActionType,
  pub condition: ActionCondition,
  /// Template for the side effect's instruction text. `{{field}}` reads the
  /// form input, `{{output.field}}` reads the AI output.
  pub prompt_template: String,
}
