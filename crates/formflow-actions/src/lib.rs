//! Formflow Actions
//!
//! Follow-on actions run after a successful AI transformation. Each action
//! carries one condition over the AI output; when it holds, the action's
//! instruction template is rendered and handed to an external side-effect
//! trigger (an agent runner).
//!
//! Dispatch never fails as a whole. Every per-action outcome, including a
//! failed trigger call, is recorded as an [`ActionResult`] so that one bad
//! action cannot hide a successful transformation.
//!
//! The crate also carries [`SubmissionSink`], which mirrors raw form data to a
//! named site form at intake so it survives a failed run.
//!
//! [`ActionResult`]: formflow_workflow::ActionResult

mod condition;
mod dispatcher;
mod forms;
mod trigger;

pub use condition::evaluate;
pub use dispatcher::ActionDispatcher;
pub use forms::{
  FORMS_SUBMIT_URL_ENV, FormsClient, FormsSettings, SubmissionError, SubmissionSink,
};
pub use trigger::{
  AgentRunnerClient, AgentRunnerSettings, SideEffectTrigger, TriggerError, TriggerReceipt,
};
