//! Formflow Workflow
//!
//! This crate provides the run record for formflow: one execution attempt of a
//! workflow definition against one captured form input.
//!
//! A [`WorkflowRun`] moves through a small state machine:
//!
//! ```text
//! queued ──► processing ──► success
//!                      └──► error
//! ```
//!
//! Identity fields (`id`, `workflowId`, `input`, `provider`, `model`,
//! `retryCount`) are fixed when the run is constructed. Everything else changes
//! only through [`WorkflowRun::apply`] with a [`RunUpdate`], which rejects any
//! transition out of a terminal state. Retrying never resets a run; it creates
//! a sibling with [`WorkflowRun::retry_of`].

mod action_result;
mod error;
mod run;
mod tenant;

pub use action_result::{ActionResult, ActionStatus};
pub use error::RunError;
pub use run::{RunInput, RunOutput, RunStatus, RunUpdate, WorkflowRun};
pub use tenant::Tenant;
