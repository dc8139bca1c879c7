use thiserror::Error;

use crate::run::RunStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
  #[error("run {run_id}: invalid transition from {from} to {to}")]
  InvalidTransition {
    run_id: String,
    from: RunStatus,
    to: RunStatus,
  },

  #[error("unknown run status: {0}")]
  UnknownStatus(String),
}
