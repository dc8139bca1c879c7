use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::WorkflowAction;
use crate::schema::OutputSchema;

/// A saved workflow definition.
///
/// Immutable after creation except through a full-document replace, see
/// [`WorkflowDraft::apply_to`](crate::WorkflowDraft::apply_to).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
  pub id: String,
  pub name: String,

  /// Name of the site form raw submissions are mirrored to at intake, if any.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_name: Option<String>,

  /// Expected form field names, in display order.
  #[serde(default)]
  pub input_fields: Vec<String>,

  /// Prompt template rendered against the form input.
  pub prompt: String,

  pub output_schema: OutputSchema,

  /// Provider identifier, e.g. "anthropic", "openai", "google".
  pub provider: String,
  pub model: String,

  /// Where the submitter is sent after intake.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub redirect_url: Option<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub actions: Vec<WorkflowAction>,

  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl WorkflowConfig {
  /// Whether any follow-on actions are configured.
  pub fn has_actions(&self) -> bool {
    !self.actions.is_empty()
  }
}
