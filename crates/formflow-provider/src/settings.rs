use std::time::Duration;

use crate::error::ProviderError;
use crate::kind::ProviderKind;

/// Environment variable for the HTTP client timeout, in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "FORMFLOW_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Where and how to reach one vendor.
#[derive(Clone, PartialEq, Eq)]
pub struct VendorEndpoint {
  pub base_url: String,
  pub api_key: Option<String>,
}

impl VendorEndpoint {
  pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
    Self {
      base_url: base_url.into(),
      api_key,
    }
  }

  /// The API key, or `CredentialMissing` for `provider`.
  pub fn require_key(&self, provider: ProviderKind) -> Result<&str, ProviderError> {
    self
      .api_key
      .as_deref()
      .filter(|key| !key.is_empty())
      .ok_or(ProviderError::CredentialMissing {
        provider,
        env_var: provider.api_key_env(),
      })
  }

  /// Join `path` onto the base url.
  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }
}

// Hand-written so API keys never end up in logs.
impl std::fmt::Debug for VendorEndpoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VendorEndpoint")
      .field("base_url", &self.base_url)
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

/// Credentials and endpoints for every provider.
///
/// A missing API key is not an error here; the gateway fails closed with
/// [`ProviderError::CredentialMissing`] on the first call that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
  pub anthropic: VendorEndpoint,
  pub openai: VendorEndpoint,
  pub google: VendorEndpoint,
  pub timeout: Duration,
}

impl ProviderSettings {
  /// Read settings from the process environment.
  pub fn from_env() -> Self {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Read settings through an arbitrary variable lookup.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let endpoint = |kind: ProviderKind| {
      VendorEndpoint::new(
        lookup(kind.base_url_env())
          .filter(|url| !url.is_empty())
          .unwrap_or_else(|| kind.default_base_url().to_string()),
        lookup(kind.api_key_env()).filter(|key| !key.is_empty()),
      )
    };

    let timeout = lookup(HTTP_TIMEOUT_ENV)
      .and_then(|secs| secs.parse::<u64>().ok())
      .map(Duration::from_secs)
      .unwrap_or(DEFAULT_TIMEOUT);

    Self {
      anthropic: endpoint(ProviderKind::Anthropic),
      openai: endpoint(ProviderKind::OpenAi),
      google: endpoint(ProviderKind::Google),
      timeout,
    }
  }

  /// Settings with no keys and the public vendor endpoints.
  pub fn unconfigured() -> Self {
    Self::from_lookup(|_| None)
  }

  pub fn endpoint(&self, kind: ProviderKind) -> &VendorEndpoint {
    match kind {
      ProviderKind::Anthropic => &self.anthropic,
      ProviderKind::OpenAi => &self.openai,
      ProviderKind::Google => &self.google,
    }
  }
}
