use std::time::Duration;

use async_trait::async_trait;
use formflow_template::stringify;
use formflow_workflow::Tenant;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Environment variable naming the endpoint form submissions are mirrored to.
pub const FORMS_SUBMIT_URL_ENV: &str = "FORMS_SUBMIT_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while mirroring a submission. Logged by the caller, never
/// allowed to block intake.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
  #[error("forms endpoint rejected submission: {status}")]
  Rejected { status: u16 },

  #[error("forms request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

/// Keeps a copy of raw form data under a named site form, independent of
/// whatever happens to the run afterwards.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
  async fn record(
    &self,
    tenant: &Tenant,
    form_name: &str,
    form_data: &Map<String, Value>,
  ) -> Result<(), SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormsSettings {
  pub submit_url: String,
  pub timeout: Duration,
}

impl FormsSettings {
  pub fn new(submit_url: impl Into<String>) -> Self {
    Self {
      submit_url: submit_url.into(),
      timeout: DEFAULT_TIMEOUT,
    }
  }

  /// `None` unless `FORMS_SUBMIT_URL` is set.
  pub fn from_env() -> Option<Self> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
    lookup(FORMS_SUBMIT_URL_ENV)
      .filter(|url| !url.is_empty())
      .map(Self::new)
  }
}

/// Posts submissions as `application/x-www-form-urlencoded`, the way a
/// browser would submit the site form itself.
#[derive(Debug, Clone)]
pub struct FormsClient {
  client: Client,
  settings: FormsSettings,
}

impl FormsClient {
  pub fn new(settings: FormsSettings) -> Result<Self, SubmissionError> {
    let client = Client::builder().timeout(settings.timeout).build()?;
    Ok(Self { client, settings })
  }
}

/// `form-name` first, then every non-null field.
fn encode_fields(form_name: &str, form_data: &Map<String, Value>) -> Vec<(String, String)> {
  let mut fields = vec![("form-name".to_string(), form_name.to_string())];
  fields.extend(
    form_data
      .iter()
      .filter(|(_, value)| !value.is_null())
      .map(|(key, value)| (key.clone(), stringify(Some(value)))),
  );
  fields
}

#[async_trait]
impl SubmissionSink for FormsClient {
  async fn record(
    &self,
    tenant: &Tenant,
    form_name: &str,
    form_data: &Map<String, Value>,
  ) -> Result<(), SubmissionError> {
    let fields = encode_fields(form_name, form_data);
    debug!(tenant = %tenant, form_name, fields = fields.len(), "forms_request");

    let response = self
      .client
      .post(&self.settings.submit_url)
      .form(&fields)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      warn!(tenant = %tenant, form_name, status = status.as_u16(), "forms_error_status");
      return Err(SubmissionError::Rejected {
        status: status.as_u16(),
      });
    }
    Ok(())
  }
}
