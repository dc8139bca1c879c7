use async_trait::async_trait;
use formflow_config::WorkflowConfig;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::kind::ProviderKind;
use crate::parse::parse_output;
use crate::prompt::build_prompt;
use crate::settings::ProviderSettings;

/// Turns a workflow and a form input into the model's structured output.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
  async fn invoke(
    &self,
    config: &WorkflowConfig,
    input: &Map<String, Value>,
  ) -> Result<Map<String, Value>, ProviderError>;
}

/// HTTP gateway over the supported vendor APIs.
///
/// One request per invocation: no retries, no streaming. The parsed object is
/// not validated against the workflow's output schema.
#[derive(Debug, Clone)]
pub struct AiGateway {
  client: Client,
  settings: ProviderSettings,
}

impl AiGateway {
  pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
    let client = Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(ProviderError::Client)?;
    Ok(Self::with_client(client, settings))
  }

  pub fn with_client(client: Client, settings: ProviderSettings) -> Self {
    Self { client, settings }
  }

  pub fn settings(&self) -> &ProviderSettings {
    &self.settings
  }

  async fn complete(
    &self,
    kind: ProviderKind,
    config: &WorkflowConfig,
    input: &Map<String, Value>,
  ) -> Result<String, ProviderError> {
    let adapter = kind.adapter();
    let prompt = build_prompt(config, input);
    let request = adapter.build_request(self.settings.endpoint(kind), &config.model, &prompt)?;

    let mut builder = self.client.post(&request.url).json(&request.body);
    for (name, value) in &request.headers {
      builder = builder.header(*name, value);
    }
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }

    let transport = |source| ProviderError::Transport {
      provider: kind,
      source,
    };

    let response = builder.send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      warn!(provider = kind.id(), status = status.as_u16(), "provider_error_status");
      return Err(ProviderError::Vendor {
        provider: kind,
        status: status.as_u16(),
        detail,
      });
    }

    let raw = response.text().await.map_err(transport)?;
    let body: Value = serde_json::from_str(&raw).map_err(|e| ProviderError::MissingContent {
      provider: kind,
      detail: format!("response body is not JSON: {e}"),
    })?;
    adapter.parse_response(&body)
  }
}

#[async_trait]
impl CompletionGateway for AiGateway {
  async fn invoke(
    &self,
    config: &WorkflowConfig,
    input: &Map<String, Value>,
  ) -> Result<Map<String, Value>, ProviderError> {
    let kind: ProviderKind = config.provider.parse()?;

    info!(
      workflow_id = %config.id,
      provider = kind.id(),
      model = %config.model,
      "provider_request"
    );

    let text = self.complete(kind, config, input).await?;
    debug!(provider = kind.id(), chars = text.len(), "provider_response");

    parse_output(&text)
  }
}
