use crate::kind::ProviderKind;

/// Errors raised while invoking an AI provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
  /// The workflow names a provider this gateway does not speak.
  #[error("unsupported provider: {0}")]
  UnsupportedProvider(String),

  /// The provider's API key is not configured.
  #[error("{env_var} not configured")]
  CredentialMissing {
    provider: ProviderKind,
    env_var: &'static str,
  },

  /// The vendor answered with a non-success status.
  #[error("{provider} API error: {status} {detail}")]
  Vendor {
    provider: ProviderKind,
    status: u16,
    detail: String,
  },

  /// The vendor envelope did not contain the expected text payload.
  #[error("no text content in {provider} response: {detail}")]
  MissingContent {
    provider: ProviderKind,
    detail: String,
  },

  /// The model's text is not a JSON object, even after fence stripping.
  #[error("failed to parse AI response as JSON ({message}): {raw}")]
  UnparseableOutput { raw: String, message: String },

  /// The request never produced a response (connect, TLS, timeout, body read).
  #[error("{provider} request failed: {source}")]
  Transport {
    provider: ProviderKind,
    #[source]
    source: reqwest::Error,
  },

  /// The HTTP client could not be constructed.
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}
