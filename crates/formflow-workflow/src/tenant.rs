use std::fmt;

use serde::{Deserialize, Serialize};

/// The scoping identity (a site) under which workflow definitions and runs
/// are namespaced. Passed explicitly to every storage and dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tenant(String);

impl Tenant {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Tenant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Tenant {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}
