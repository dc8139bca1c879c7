use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::WorkflowAction;
use crate::schema::OutputSchema;
use crate::workflow::WorkflowConfig;

/// Errors raised when validating a [`WorkflowDraft`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
  #[error("missing required field: {field}")]
  MissingField { field: &'static str },

  #[error("invalid redirect url '{url}': {message}")]
  InvalidRedirectUrl { url: String, message: String },
}

/// The editable part of a workflow definition.
///
/// Used both to create a definition and to replace every editable field of an
/// existing one. Identity (`id`, `createdAt`) is never taken from a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDraft {
  pub name: String,
  #[serde(default)]
  pub form_name: Option<String>,
  #[serde(default)]
  pub input_fields: Vec<String>,
  pub prompt: String,
  pub output_schema: OutputSchema,
  pub provider: String,
  pub model: String,
  #[serde(default)]
  pub redirect_url: Option<String>,
  #[serde(default)]
  pub actions: Vec<WorkflowAction>,
}

impl WorkflowDraft {
  /// Check required fields and the redirect url.
  pub fn validate(&self) -> Result<(), DraftError> {
    for (field, value) in [
      ("name", &self.name),
      ("prompt", &self.prompt),
      ("provider", &self.provider),
      ("model", &self.model),
    ] {
      if value.trim().is_empty() {
        return Err(DraftError::MissingField { field });
      }
    }

    if let Some(raw) = non_empty(&self.redirect_url) {
      let parsed = url::Url::parse(&raw).map_err(|e| DraftError::InvalidRedirectUrl {
        url: raw.clone(),
        message: e.to_string(),
      })?;
      if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DraftError::InvalidRedirectUrl {
          url: raw,
          message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
      }
    }

    Ok(())
  }

  /// Validate and build a brand-new definition with a fresh id.
  pub fn into_config(self) -> Result<WorkflowConfig, DraftError> {
    self.validate()?;
    let now = Utc::now();

    Ok(WorkflowConfig {
      id: uuid::Uuid::new_v4().to_string(),
      name: self.name,
      form_name: non_empty(&self.form_name),
      input_fields: self.input_fields,
      prompt: self.prompt,
      output_schema: self.output_schema,
      provider: self.provider,
      model: self.model,
      redirect_url: non_empty(&self.redirect_url),
      actions: self.actions,
      created_at: now,
      updated_at: now,
    })
  }

  /// Validate and produce the replacement document for `existing`.
  ///
  /// `id` and `createdAt` are kept, `updatedAt` is bumped.
  pub fn apply_to(self, existing: &WorkflowConfig) -> Result<WorkflowConfig, DraftError> {
    self.validate()?;

    Ok(WorkflowConfig {
      id: existing.id.clone(),
      name: self.name,
      form_name: non_empty(&self.form_name),
      input_fields: self.input_fields,
      prompt: self.prompt,
      output_schema: self.output_schema,
      provider: self.provider,
      model: self.model,
      redirect_url: non_empty(&self.redirect_url),
      actions: self.actions,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    })
  }
}

/// Empty strings are stored as absent.
fn non_empty(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}
