use std::sync::Arc;

use formflow_config::WorkflowAction;
use formflow_template::interpolate_action;
use formflow_workflow::{ActionResult, Tenant};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::condition::evaluate;
use crate::trigger::SideEffectTrigger;

/// Runs a workflow's actions against one AI output.
#[derive(Clone)]
pub struct ActionDispatcher {
  trigger: Arc<dyn SideEffectTrigger>,
}

impl ActionDispatcher {
  pub fn new(trigger: Arc<dyn SideEffectTrigger>) -> Self {
    Self { trigger }
  }

  /// Evaluate every action in order and return one result per action.
  ///
  /// Actions are independent and processed sequentially; a trigger failure
  /// becomes an `error` result and does not affect later actions.
  pub async fn dispatch(
    &self,
    actions: &[WorkflowAction],
    input: &Map<String, Value>,
    output: &Map<String, Value>,
    tenant: &Tenant,
  ) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(actions.len());

    for action in actions {
      if !evaluate(&action.condition, output) {
        debug!(action_id = %action.id, operator = ?action.condition.operator, "action_skipped");
        results.push(ActionResult::skipped(action));
        continue;
      }

      let instruction = interpolate_action(&action.prompt_template, input, output);
      let result = match self.trigger.trigger(tenant, &instruction).await {
        Ok(receipt) => {
          info!(action_id = %action.id, runner_id = %receipt.id, "action_triggered");
          ActionResult::triggered(action, receipt.id)
        }
        Err(e) => {
          warn!(action_id = %action.id, error = %e, "action_trigger_failed");
          ActionResult::failed(action, e.to_string())
        }
      };
      results.push(result);
    }

    results
  }
}

impl std::fmt::Debug for ActionDispatcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActionDispatcher").finish_non_exhaustive()
  }
}
