use std::time::Duration;

use async_trait::async_trait;
use formflow_workflow::Tenant;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.netlify.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors raised while starting a side effect. Always captured into the
/// action's result, never escalated to the run.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
  #[error("AGENT_RUNNER_API_TOKEN not configured")]
  MissingToken,

  #[error("agent runner API error: {status} {detail}")]
  Api { status: u16, detail: String },

  #[error("agent runner request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

/// Identifier of a started side effect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TriggerReceipt {
  pub id: String,
}

/// Starts an external side effect for a tenant from an instruction text.
#[async_trait]
pub trait SideEffectTrigger: Send + Sync {
  async fn trigger(
    &self,
    tenant: &Tenant,
    instruction: &str,
  ) -> Result<TriggerReceipt, TriggerError>;
}

/// Where the agent runner API lives and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentRunnerSettings {
  pub api_url: String,
  pub token: Option<String>,
  pub timeout: Duration,
}

impl AgentRunnerSettings {
  /// `AGENT_RUNNER_API_URL`, `AGENT_RUNNER_API_TOKEN` and `FORMFLOW_HTTP_TIMEOUT_SECS`.
  pub fn from_env() -> Self {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    Self {
      api_url: lookup("AGENT_RUNNER_API_URL")
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
      token: lookup("AGENT_RUNNER_API_TOKEN").filter(|token| !token.is_empty()),
      timeout: lookup("FORMFLOW_HTTP_TIMEOUT_SECS")
        .and_then(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT),
    }
  }
}

impl std::fmt::Debug for AgentRunnerSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AgentRunnerSettings")
      .field("api_url", &self.api_url)
      .field("token", &self.token.as_ref().map(|_| "<redacted>"))
      .field("timeout", &self.timeout)
      .finish()
  }
}

/// Agent runner API client. The tenant is the site the runner is created on.
#[derive(Debug, Clone)]
pub struct AgentRunnerClient {
  client: Client,
  settings: AgentRunnerSettings,
}

impl AgentRunnerClient {
  pub fn new(settings: AgentRunnerSettings) -> Result<Self, TriggerError> {
    let client = Client::builder().timeout(settings.timeout).build()?;
    Ok(Self { client, settings })
  }
}

#[async_trait]
impl SideEffectTrigger for AgentRunnerClient {
  async fn trigger(
    &self,
    tenant: &Tenant,
    instruction: &str,
  ) -> Result<TriggerReceipt, TriggerError> {
    let token = self.settings.token.as_deref().ok_or(TriggerError::MissingToken)?;
    let url = format!(
      "{}/api/v1/agent_runners",
      self.settings.api_url.trim_end_matches('/')
    );

    debug!(tenant = %tenant, chars = instruction.len(), "agent_runner_request");

    let response = self
      .client
      .post(&url)
      .bearer_auth(token)
      .query(&[("site_id", tenant.as_str())])
      .json(&json!({ "prompt": instruction }))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      warn!(tenant = %tenant, status = status.as_u16(), "agent_runner_error_status");
      return Err(TriggerError::Api {
        status: status.as_u16(),
        detail,
      });
    }

    Ok(response.json::<TriggerReceipt>().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_settings_defaults() {
    let settings = AgentRunnerSettings::from_lookup(|_| None);
    assert_eq!(settings.api_url, "https://api.netlify.com");
    assert!(settings.token.is_none());
    assert_eq!(settings.timeout, Duration::from_secs(120));
  }

  #[test]
  fn test_settings_debug_redacts_token() {
    let settings = AgentRunnerSettings::from_lookup(|name| match name {
      "AGENT_RUNNER_API_TOKEN" => Some("nfp_secret".to_string()),
      _ => None,
    });
    assert!(!format!("{settings:?}").contains("nfp_secret"));
  }
}
