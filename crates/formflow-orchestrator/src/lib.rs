//! Formflow Orchestrator
//!
//! Drives workflow runs from intake to a terminal state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Intake                             │
//! │  - submit(form data) creates a queued run                   │
//! │  - retry(run) creates a queued sibling run                  │
//! │  - hands (tenant, workflow, run) to the runner              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ RunSender
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RunRunner                            │
//! │  - owns the mpsc channel of RunJobs                         │
//! │  - start(cancel) spawns one task per job                    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RunOrchestrator                         │
//! │  - queued → processing → success | error                    │
//! │  - AI gateway, then action dispatch                         │
//! │  - persists every transition, emits RunEvents               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Jobs live only in memory. A run whose job is lost stays `queued` until an
//! operator retries it.

mod error;
mod events;
mod intake;
mod orchestrator;
mod runner;

pub use error::OrchestratorError;
pub use events::{ChannelNotifier, NoopNotifier, RunEvent, RunNotifier};
pub use intake::{Intake, Submission};
pub use orchestrator::RunOrchestrator;
pub use runner::{RunJob, RunRunner, RunSender};
