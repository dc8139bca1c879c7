use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::adapter::ProviderAdapter;
use crate::adapters::{AnthropicAdapter, GoogleAdapter, OpenAiAdapter};
use crate::error::ProviderError;

/// The AI vendors the gateway can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  Anthropic,
  OpenAi,
  Google,
}

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
  pub id: &'static str,
  pub name: &'static str,
}

/// A provider and its default models, for configuration front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
  pub id: &'static str,
  pub name: &'static str,
  pub models: &'static [ModelInfo],
}

const CATALOG: &[ProviderInfo] = &[
  ProviderInfo {
    id: "anthropic",
    name: "Anthropic",
    models: &[
      ModelInfo {
        id: "claude-sonnet-4-20250514",
        name: "Claude Sonnet 4",
      },
      ModelInfo {
        id: "claude-opus-4-5-20251101",
        name: "Claude Opus 4.5",
      },
    ],
  },
  ProviderInfo {
    id: "openai",
    name: "OpenAI",
    models: &[
      ModelInfo {
        id: "gpt-4o",
        name: "GPT-4o",
      },
      ModelInfo {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
      },
    ],
  },
  ProviderInfo {
    id: "google",
    name: "Google",
    models: &[
      ModelInfo {
        id: "gemini-1.5-pro",
        name: "Gemini 1.5 Pro",
      },
      ModelInfo {
        id: "gemini-1.5-flash",
        name: "Gemini 1.5 Flash",
      },
    ],
  },
];

impl ProviderKind {
  pub const ALL: [ProviderKind; 3] = [Self::Anthropic, Self::OpenAi, Self::Google];

  /// Identifier stored in workflow definitions.
  pub fn id(self) -> &'static str {
    match self {
      Self::Anthropic => "anthropic",
      Self::OpenAi => "openai",
      Self::Google => "google",
    }
  }

  /// Environment variable holding the API key.
  pub fn api_key_env(self) -> &'static str {
    match self {
      Self::Anthropic => "ANTHROPIC_API_KEY",
      Self::OpenAi => "OPENAI_API_KEY",
      Self::Google => "GEMINI_API_KEY",
    }
  }

  /// Environment variable overriding the API base url.
  pub fn base_url_env(self) -> &'static str {
    match self {
      Self::Anthropic => "ANTHROPIC_BASE_URL",
      Self::OpenAi => "OPENAI_BASE_URL",
      Self::Google => "GOOGLE_GEMINI_BASE_URL",
    }
  }

  pub fn default_base_url(self) -> &'static str {
    match self {
      Self::Anthropic => "https://api.anthropic.com",
      Self::OpenAi => "https://api.openai.com",
      Self::Google => "https://generativelanguage.googleapis.com",
    }
  }

  /// The request/response adapter for this vendor.
  pub fn adapter(self) -> &'static dyn ProviderAdapter {
    match self {
      Self::Anthropic => &AnthropicAdapter,
      Self::OpenAi => &OpenAiAdapter,
      Self::Google => &GoogleAdapter,
    }
  }

  /// Every supported provider with its default models.
  pub fn catalog() -> &'static [ProviderInfo] {
    CATALOG
  }
}

impl fmt::Display for ProviderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Anthropic => "Anthropic",
      Self::OpenAi => "OpenAI",
      Self::Google => "Google",
    })
  }
}

impl FromStr for ProviderKind {
  type Err = ProviderError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "anthropic" => Ok(Self::Anthropic),
      "openai" => Ok(Self::OpenAi),
      "google" | "gemini" => Ok(Self::Google),
      other => Err(ProviderError::UnsupportedProvider(other.to_string())),
    }
  }
}
