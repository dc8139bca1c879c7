//! Formflow Config
//!
//! This crate contains the serializable workflow definition types for formflow.
//! A workflow definition describes how a form submission is turned into a
//! structured record: the prompt template, the JSON schema the AI output should
//! follow, the provider/model to call, and the follow-on actions to consider.
//!
//! Definitions are stored as JSON documents (camelCase field names) and are
//! only ever replaced as a whole. [`WorkflowDraft`] is the editable subset used
//! to create a new definition or replace an existing one.

mod action;
mod draft;
mod schema;
mod workflow;

pub use action::{ActionCondition, ActionType, ConditionOperator, WorkflowAction};
pub use draft::{DraftError, WorkflowDraft};
pub use schema::{OutputSchema, SchemaType};
pub use workflow::WorkflowConfig;
