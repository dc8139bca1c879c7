use serde_json::Value;

use crate::error::ProviderError;
use crate::kind::ProviderKind;
use crate::prompt::CompletionPrompt;
use crate::settings::VendorEndpoint;

/// A fully described HTTP POST to a vendor API.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRequest {
  pub url: String,
  pub headers: Vec<(&'static str, String)>,
  pub query: Vec<(&'static str, String)>,
  pub body: Value,
}

/// Translates between the neutral prompt and one vendor's wire format.
///
/// Adapters are pure; the gateway owns the HTTP client and error mapping.
pub trait ProviderAdapter: Send + Sync {
  fn kind(&self) -> ProviderKind;

  /// Build the request for `model`, failing closed when no key is configured.
  fn build_request(
    &self,
    endpoint: &VendorEndpoint,
    model: &str,
    prompt: &CompletionPrompt,
  ) -> Result<VendorRequest, ProviderError>;

  /// Extract the single text payload from a successful response body.
  fn parse_response(&self, body: &Value) -> Result<String, ProviderError>;
}
