//! Formflow Provider
//!
//! The AI provider gateway: renders a workflow's prompt, sends it to exactly
//! one vendor API, and turns the vendor's text reply into a JSON object.
//!
//! # Flow
//! 1. Render the workflow prompt against the form input ([`build_prompt`]).
//! 2. Wrap it in a fixed instruction preamble that embeds the output schema.
//! 3. Build the vendor request through the [`ProviderAdapter`] selected by
//!    [`ProviderKind`]. Unknown providers fail immediately.
//! 4. Extract the single text payload from the vendor envelope.
//! 5. Strip a surrounding code fence ([`strip_code_fence`]).
//! 6. Parse the remaining text as a JSON object ([`parse_output`]).
//!
//! The parsed object is not validated against the workflow's output schema.
//! Schema conformance is requested from the model, not enforced here, so
//! callers must tolerate drift in the returned fields.

mod adapter;
mod adapters;
mod error;
mod gateway;
mod kind;
mod parse;
mod prompt;
mod settings;

pub use adapter::{ProviderAdapter, VendorRequest};
pub use adapters::{AnthropicAdapter, GoogleAdapter, OpenAiAdapter};
pub use error::ProviderError;
pub use gateway::{AiGateway, CompletionGateway};
pub use kind::{ModelInfo, ProviderInfo, ProviderKind};
pub use parse::{parse_output, strip_code_fence};
pub use prompt::{CompletionPrompt, build_prompt};
pub use settings::{ProviderSettings, VendorEndpoint};
