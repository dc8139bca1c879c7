//! Formflow Template
//!
//! Placeholder interpolation for workflow prompts and action instructions.
//!
//! Every placeholder is replaced by the stringified value of the named
//! variable, or by the empty string when the variable is absent or `null`.
//! There is no escaping, no filters, and no control flow: text outside
//! placeholders is copied through unchanged and rendering never fails.
//!
//! # Prompt templates
//! Workflow prompts only recognise a bare name, `{{name}}`, made of ASCII
//! letters, digits and underscores. Anything else between double braces
//! (example JSON, `{{ spaced }}` names) is left as written:
//! ```text
//! "Hi {{name}}, re: {{topic}}"  +  { "name": "Ann" }  →  "Hi Ann, re: "
//! ```
//!
//! # Action templates
//! Action instructions accept any text between the braces, trimmed, and read
//! from two namespaces. A name prefixed with `output.` resolves against the AI
//! output, any other name against the form input:
//! ```text
//! "Fix {{ output.summary }} reported by {{email}}"
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};

/// Prefix selecting the AI output namespace in action templates.
pub const OUTPUT_PREFIX: &str = "output.";

// Both patterns are literals, so compiling them cannot fail at runtime.
static PROMPT_PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("prompt placeholder pattern"));

static ACTION_PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("action placeholder pattern"));

/// Render a prompt template against a single variable map.
pub fn interpolate(template: &str, vars: &Map<String, Value>) -> String {
  render(&PROMPT_PLACEHOLDER, template, |name| stringify(vars.get(name)))
}

/// Render an action template against the form input and the AI output.
pub fn interpolate_action(
  template: &str,
  input: &Map<String, Value>,
  output: &Map<String, Value>,
) -> String {
  render(&ACTION_PLACEHOLDER, template, |name| {
    let name = name.trim();
    match name.strip_prefix(OUTPUT_PREFIX) {
      Some(key) => stringify(output.get(key)),
      None => stringify(input.get(name)),
    }
  })
}

/// Stringify a variable the way placeholders and conditions see it.
///
/// Follows JavaScript `String()` coercion, since workflow definitions are
/// written against that behaviour:
/// - absent and `null` become the empty string
/// - strings are used as-is, booleans as `true`/`false`
/// - whole numbers never carry a fractional part (`1.0` is `"1"`)
/// - arrays join their elements with `,`, with `null` elements left empty
/// - objects become `[object Object]`
pub fn stringify(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(value) => coerce(value),
  }
}

fn coerce(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => number(n),
    Value::String(s) => s.clone(),
    Value::Array(items) => items.iter().map(coerce).collect::<Vec<_>>().join(","),
    Value::Object(_) => "[object Object]".to_string(),
  }
}

fn number(n: &Number) -> String {
  if n.is_i64() || n.is_u64() {
    return n.to_string();
  }

  match n.as_f64() {
    // Adding zero folds -0 into 0.
    Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f + 0.0),
    _ => n.to_string(),
  }
}

fn render(pattern: &Regex, template: &str, resolve: impl Fn(&str) -> String) -> String {
  pattern
    .replace_all(template, |caps: &Captures<'_>| resolve(&caps[1]))
    .into_owned()
}
