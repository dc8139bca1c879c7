use serde_json::{Value, json};

use crate::adapter::{ProviderAdapter, VendorRequest};
use crate::error::ProviderError;
use crate::kind::ProviderKind;
use crate::prompt::CompletionPrompt;
use crate::settings::VendorEndpoint;

/// OpenAI Chat Completions API.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiAdapter;

impl ProviderAdapter for OpenAiAdapter {
  fn kind(&self) -> ProviderKind {
    ProviderKind::OpenAi
  }

  fn build_request(
    &self,
    endpoint: &VendorEndpoint,
    model: &str,
    prompt: &CompletionPrompt,
  ) -> Result<VendorRequest, ProviderError> {
    let key = endpoint.require_key(self.kind())?;

    Ok(VendorRequest {
      url: endpoint.url("/v1/chat/completions"),
      headers: vec![("authorization", format!("Bearer {key}"))],
      query: vec![],
      body: json!({
        "model": model,
        "messages": [
          { "role": "system", "content": prompt.system },
          { "role": "user", "content": prompt.user },
        ],
      }),
    })
  }

  fn parse_response(&self, body: &Value) -> Result<String, ProviderError> {
    body["choices"][0]["message"]["content"]
      .as_str()
      .filter(|text| !text.is_empty())
      .map(str::to_string)
      .ok_or_else(|| ProviderError::MissingContent {
        provider: self.kind(),
        detail: "choices[0].message.content is empty".to_string(),
      })
  }
}
