//! Run lifecycle events and notifiers.
//!
//! Events let consumers follow runs (stream to a UI, count outcomes, wait in
//! tests) without touching the run store. Observing events never changes a
//! run.

use formflow_workflow::ActionStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while runs move through their lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
  /// A run was created in `queued`.
  RunQueued {
    run_id: String,
    workflow_id: String,
    retry_count: u32,
  },

  /// A run moved to `processing`.
  RunStarted { run_id: String, workflow_id: String },

  /// One action of a successful run was evaluated.
  ActionCompleted {
    run_id: String,
    action_id: String,
    status: ActionStatus,
  },

  /// A run reached `success`.
  RunSucceeded { run_id: String, workflow_id: String },

  /// A run reached `error`.
  RunFailed {
    run_id: String,
    workflow_id: String,
    error: String,
  },
}

/// Receives run events.
pub trait RunNotifier: Send + Sync {
  fn notify(&self, event: RunEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl RunNotifier for NoopNotifier {
  fn notify(&self, _event: RunEvent) {}
}

/// Forwards events to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls a run; volume is a handful of
/// events per run.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<RunEvent>) -> Self {
    Self { sender }
  }
}

impl RunNotifier for ChannelNotifier {
  fn notify(&self, event: RunEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
