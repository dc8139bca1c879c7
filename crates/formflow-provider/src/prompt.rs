use formflow_config::WorkflowConfig;
use serde_json::{Map, Value};

/// The two-part prompt sent to every vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
  /// Role, embedded output schema and output-format rules.
  pub system: String,
  /// The form data followed by the rendered workflow prompt.
  pub user: String,
}

/// Build the vendor-neutral prompt for a workflow and a form input.
pub fn build_prompt(config: &WorkflowConfig, input: &Map<String, Value>) -> CompletionPrompt {
  let instructions = formflow_template::interpolate(&config.prompt, input);

  let system = format!(
    "You are a data processing assistant. You will receive form submission data and must \
     transform it according to the user's instructions.\n\n\
     Your response MUST be valid JSON that matches this schema:\n{}\n\n\
     Respond with ONLY the JSON object, no additional text or markdown formatting.",
    config.output_schema.to_pretty_json()
  );

  // A map of JSON values always serializes.
  let submission = serde_json::to_string_pretty(input).unwrap_or_default();
  let user = format!("Form submission data:\n{submission}\n\nInstructions:\n{instructions}");

  CompletionPrompt { system, user }
}
