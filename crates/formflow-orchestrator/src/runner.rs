//! Background run dispatch.
//!
//! The `RunRunner` owns an mpsc channel of [`RunJob`]s and starts each job on
//! its own task. Jobs are not persisted.

use std::sync::Arc;

use formflow_workflow::Tenant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::OrchestratorError;
use crate::events::{NoopNotifier, RunNotifier};
use crate::orchestrator::RunOrchestrator;

const DEFAULT_BUFFER: usize = 100;

/// A queued run waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunJob {
  pub tenant: Tenant,
  pub workflow_id: String,
  pub run_id: String,
}

/// Handle for handing jobs to a [`RunRunner`].
#[derive(Debug, Clone)]
pub struct RunSender {
  sender: mpsc::Sender<RunJob>,
}

impl RunSender {
  /// Queue a job, waiting for buffer space if the runner is busy.
  pub async fn dispatch(&self, job: RunJob) -> Result<(), OrchestratorError> {
    self
      .sender
      .send(job)
      .await
      .map_err(|_| OrchestratorError::RunnerClosed)
  }

  pub fn is_closed(&self) -> bool {
    self.sender.is_closed()
  }
}

/// Processes queued runs in the background.
///
/// # Usage
///
/// ```ignore
/// let runner = RunRunner::new(orchestrator);
///
/// // Hand the sender to intake
/// let intake = Intake::new(orchestrator.clone(), runner.sender());
///
/// // Start the dispatch loop
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await;
/// ```
pub struct RunRunner<N: RunNotifier = NoopNotifier> {
  sender: mpsc::Sender<RunJob>,
  receiver: mpsc::Receiver<RunJob>,
  orchestrator: Arc<RunOrchestrator<N>>,
}

impl<N: RunNotifier + 'static> RunRunner<N> {
  pub fn new(orchestrator: Arc<RunOrchestrator<N>>) -> Self {
    Self::with_buffer_size(orchestrator, DEFAULT_BUFFER)
  }

  pub fn with_buffer_size(orchestrator: Arc<RunOrchestrator<N>>, buffer_size: usize) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      orchestrator,
    }
  }

  pub fn sender(&self) -> RunSender {
    RunSender {
      sender: self.sender.clone(),
    }
  }

  /// Run the dispatch loop until `cancel` fires or every sender is dropped.
  ///
  /// Each job is processed on its own task; in-flight runs are not aborted
  /// when the loop exits.
  pub async fn start(self, cancel: CancellationToken) {
    let Self {
      sender,
      mut receiver,
      orchestrator,
    } = self;
    // Only external senders keep the loop alive.
    drop(sender);

    info!("run_runner_started");

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!("run_runner_cancelled");
          break;
        }
        job = receiver.recv() => {
          let Some(job) = job else {
            info!("run_runner_channel_closed");
            break;
          };

          let orchestrator = Arc::clone(&orchestrator);
          tokio::spawn(async move {
            match orchestrator.start_run(&job.tenant, &job.workflow_id, &job.run_id).await {
              Ok(run) => {
                info!(run_id = %job.run_id, status = %run.status(), "run_job_finished");
              }
              Err(e) => {
                error!(
                  run_id = %job.run_id,
                  workflow_id = %job.workflow_id,
                  error = %e,
                  "run_job_failed"
                );
              }
            }
          });
        }
      }
    }
  }
}
