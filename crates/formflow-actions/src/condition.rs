use formflow_config::{ActionCondition, ConditionOperator};
use formflow_template::stringify;
use serde_json::{Map, Value};

/// Decide whether an action's condition holds for the AI output.
///
/// `always` ignores the output entirely. `equals` and `contains` compare the
/// stringified field against the configured value, ignoring case; a missing
/// field compares as the empty string. Unknown operators never hold.
pub fn evaluate(condition: &ActionCondition, output: &Map<String, Value>) -> bool {
  let expected = || condition.value.as_deref().unwrap_or_default().to_lowercase();
  let actual = || stringify(output.get(&condition.field)).to_lowercase();

  match condition.operator {
    ConditionOperator::Always => true,
    ConditionOperator::Equals => actual() == expected(),
    ConditionOperator::Contains => actual().contains(&expected()),
    ConditionOperator::Unknown => false,
  }
}
