use serde_json::{Value, json};

use crate::adapter::{ProviderAdapter, VendorRequest};
use crate::error::ProviderError;
use crate::kind::ProviderKind;
use crate::prompt::CompletionPrompt;
use crate::settings::VendorEndpoint;

/// Google Gemini `generateContent` API. The key travels as a query parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAdapter;

impl ProviderAdapter for GoogleAdapter {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Google
  }

  fn build_request(
    &self,
    endpoint: &VendorEndpoint,
    model: &str,
    prompt: &CompletionPrompt,
  ) -> Result<VendorRequest, ProviderError> {
    let key = endpoint.require_key(self.kind())?;

    Ok(VendorRequest {
      url: endpoint.url(&format!("/v1beta/models/{model}:generateContent")),
      headers: vec![],
      query: vec![("key", key.to_string())],
      body: json!({
        "systemInstruction": { "parts": [{ "text": prompt.system }] },
        "contents": [{ "parts": [{ "text": prompt.user }] }],
      }),
    })
  }

  fn parse_response(&self, body: &Value) -> Result<String, ProviderError> {
    body["candidates"][0]["content"]["parts"][0]["text"]
      .as_str()
      .filter(|text| !text.is_empty())
      .map(str::to_string)
      .ok_or_else(|| ProviderError::MissingContent {
        provider: self.kind(),
        detail: "candidates[0].content.parts[0].text is empty".to_string(),
      })
  }
}
