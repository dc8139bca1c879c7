use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
  Object,
  Array,
  String,
  Number,
  Boolean,
}

impl SchemaType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Object => "object",
      Self::Array => "array",
      Self::String => "string",
      Self::Number => "number",
      Self::Boolean => "boolean",
    }
  }
}

/// A JSON-Schema-like description of the structured output a workflow expects.
///
/// The document is kept exactly as written, key order and unrecognised
/// keywords included, because it is handed to the model verbatim as part of
/// its instructions. It is advisory: the engine does not validate AI output
/// against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSchema(Value);

impl OutputSchema {
  /// A bare schema node of the given type.
  pub fn of(schema_type: SchemaType) -> Self {
    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(schema_type.as_str()));
    Self(Value::Object(node))
  }

  /// An object schema with the given properties, in order, all of them required.
  pub fn object<I, K>(properties: I) -> Self
  where
    I: IntoIterator<Item = (K, OutputSchema)>,
    K: Into<String>,
  {
    let properties: Map<String, Value> = properties
      .into_iter()
      .map(|(name, schema)| (name.into(), schema.0))
      .collect();
    let required: Vec<Value> = properties.keys().cloned().map(Value::from).collect();

    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(SchemaType::Object.as_str()));
    node.insert("properties".to_string(), Value::Object(properties));
    node.insert("required".to_string(), Value::Array(required));
    Self(Value::Object(node))
  }

  /// The declared top-level `type`, if it is one of the known kinds.
  pub fn schema_type(&self) -> Option<SchemaType> {
    self
      .0
      .get("type")
      .cloned()
      .and_then(|t| serde_json::from_value(t).ok())
  }

  /// Names of the top-level properties, in declaration order.
  pub fn property_names(&self) -> Vec<&str> {
    self
      .0
      .get("properties")
      .and_then(Value::as_object)
      .map(|props| props.keys().map(String::as_str).collect())
      .unwrap_or_default()
  }

  pub fn as_value(&self) -> &Value {
    &self.0
  }

  /// Render the schema as an indented JSON document.
  pub fn to_pretty_json(&self) -> String {
    // A JSON value always serializes.
    serde_json::to_string_pretty(&self.0).unwrap_or_default()
  }
}

impl From<Value> for OutputSchema {
  fn from(value: Value) -> Self {
    Self(value)
  }
}
