use serde_json::{Value, json};

use crate::adapter::{ProviderAdapter, VendorRequest};
use crate::error::ProviderError;
use crate::kind::ProviderKind;
use crate::prompt::CompletionPrompt;
use crate::settings::VendorEndpoint;

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Anthropic Messages API.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicAdapter;

impl ProviderAdapter for AnthropicAdapter {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Anthropic
  }

  fn build_request(
    &self,
    endpoint: &VendorEndpoint,
    model: &str,
    prompt: &CompletionPrompt,
  ) -> Result<VendorRequest, ProviderError> {
    let key = endpoint.require_key(self.kind())?;

    Ok(VendorRequest {
      url: endpoint.url("/v1/messages"),
      headers: vec![
        ("x-api-key", key.to_string()),
        ("anthropic-version", API_VERSION.to_string()),
      ],
      query: vec![],
      body: json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "system": prompt.system,
        "messages": [{ "role": "user", "content": prompt.user }],
      }),
    })
  }

  fn parse_response(&self, body: &Value) -> Result<String, ProviderError> {
    body["content"]
      .as_array()
      .and_then(|blocks| {
        blocks
          .iter()
          .find(|block| block["type"] == "text")
          .and_then(|block| block["text"].as_str())
      })
      .map(str::to_string)
      .ok_or_else(|| ProviderError::MissingContent {
        provider: self.kind(),
        detail: "no text block in content".to_string(),
      })
  }
}
