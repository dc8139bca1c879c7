use std::sync::Arc;

use formflow_actions::{AgentRunnerClient, AgentRunnerSettings};
use formflow_config::{
  ActionCondition, ActionType, OutputSchema, SchemaType, WorkflowAction, WorkflowDraft,
};
use formflow_orchestrator::RunOrchestrator;
use formflow_provider::{AiGateway, ProviderSettings, VendorEndpoint};
use formflow_store::{BlobRepository, InMemoryBlobStore, RunStore, WorkflowRepository};
use formflow_workflow::{ActionResult, ActionStatus, RunStatus, Tenant};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
  orchestrator: RunOrchestrator,
  repo: Arc<BlobRepository<InMemoryBlobStore>>,
  tenant: Tenant,
}

async fn harness(vendor: &MockServer, runner_api: &MockServer) -> Harness {
  let mut settings = ProviderSettings::unconfigured();
  settings.anthropic = VendorEndpoint::new(vendor.uri(), Some("sk-ant-test".to_string()));
  let gateway = AiGateway::new(settings).unwrap();

  let runner_uri = runner_api.uri();
  let trigger = AgentRunnerClient::new(AgentRunnerSettings::from_lookup(move |name| {
    match name {
      "AGENT_RUNNER_API_URL" => Some(runner_uri.clone()),
      "AGENT_RUNNER_API_TOKEN" => Some("nfp_test".to_string()),
      _ => None,
    }
  }))
  .unwrap();

  let repo = Arc::new(BlobRepository::new(InMemoryBlobStore::new()));
  let orchestrator = RunOrchestrator::new(
    repo.clone(),
    repo.clone(),
    Arc::new(gateway),
    Arc::new(trigger),
  );

  Harness {
    orchestrator,
    repo,
    tenant: Tenant::new("site-1"),
  }
}

fn bug_action() -> WorkflowAction {
  WorkflowAction {
    id: "act-1".to_string(),
    name: "Open bug fix".to_string(),
    action_type: ActionType::TriggerSideEffect,
    condition: ActionCondition::equals("category", "bug"),
    prompt_template: "Fix: {{output.summary}} (from {{email}})".to_string(),
  }
}

async fn save_workflow(h: &Harness, actions: Vec<WorkflowAction>) -> String {
  let config = WorkflowDraft {
    name: "Contact".to_string(),
    form_name: Some("contact".to_string()),
    input_fields: vec!["msg".to_string(), "email".to_string()],
    prompt: "Summarize: {{msg}}".to_string(),
    output_schema: OutputSchema::object([
      ("summary", OutputSchema::of(SchemaType::String)),
      ("category", OutputSchema::of(SchemaType::String)),
    ]),
    provider: "anthropic".to_string(),
    model: "claude-sonnet-4-20250514".to_string(),
    redirect_url: None,
    actions,
  }
  .into_config()
  .unwrap();

  h.repo.put_config(&h.tenant, &config).await.unwrap();
  config.id
}

async fn mock_reply(vendor: &MockServer, text: &str) {
  Mock::given(method("POST"))
    .and(path("/v1/messages"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "content": [{ "type": "text", "text": text }]
    })))
    .mount(vendor)
    .await;
}

fn input() -> serde_json::Map<String, Value> {
  json!({ "msg": "hello", "email": "ann@example.com" })
    .as_object()
    .cloned()
    .unwrap()
}

#[tokio::test]
async fn test_fenced_reply_succeeds() {
  let vendor = MockServer::start().await;
  let runner_api = MockServer::start().await;
  mock_reply(&vendor, "```json\n{\"summary\":\"hi\"}\n```").await;

  let h = harness(&vendor, &runner_api).await;
  let workflow_id = save_workflow(&h, vec![]).await;
  let (_, run) = h
    .orchestrator
    .enqueue(&h.tenant, &workflow_id, input())
    .await
    .unwrap();

  let done = h
    .orchestrator
    .start_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap();

  assert_eq!(done.status(), RunStatus::Success);
  assert_eq!(done.output().cloned().map(Value::Object), Some(json!({ "summary": "hi" })));
  assert!(done.started_at().is_some());
  assert!(done.completed_at().is_some());
  assert!(done.action_results().is_none());

  let stored = h
    .repo
    .get_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, done);
}

#[tokio::test]
async fn test_vendor_error_fails_run() {
  let vendor = MockServer::start().await;
  let runner_api = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/messages"))
    .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
    .mount(&vendor)
    .await;

  let h = harness(&vendor, &runner_api).await;
  let workflow_id = save_workflow(&h, vec![bug_action()]).await;
  let (_, run) = h
    .orchestrator
    .enqueue(&h.tenant, &workflow_id, input())
    .await
    .unwrap();

  let done = h
    .orchestrator
    .start_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap();

  assert_eq!(done.status(), RunStatus::Error);
  assert!(done.error().unwrap().contains("529"));
  assert!(done.output().is_none());
  assert!(done.completed_at().is_some());
}

#[tokio::test]
async fn test_unmatched_condition_skips_action() {
  let vendor = MockServer::start().await;
  let runner_api = MockServer::start().await;
  mock_reply(&vendor, r#"{"summary":"dark mode please","category":"feature"}"#).await;
  Mock::given(method("POST"))
    .and(path("/api/v1/agent_runners"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
    .expect(0)
    .mount(&runner_api)
    .await;

  let h = harness(&vendor, &runner_api).await;
  let workflow_id = save_workflow(&h, vec![bug_action()]).await;
  let (_, run) = h
    .orchestrator
    .enqueue(&h.tenant, &workflow_id, input())
    .await
    .unwrap();

  let done = h
    .orchestrator
    .start_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap();

  assert_eq!(done.status(), RunStatus::Success);
  assert_eq!(
    done.action_results().unwrap(),
    &[ActionResult {
      action_id: "act-1".to_string(),
      action_name: "Open bug fix".to_string(),
      status: ActionStatus::Skipped,
      agent_runner_id: None,
      error: None,
    }]
  );
}

#[tokio::test]
async fn test_matched_condition_triggers_action() {
  let vendor = MockServer::start().await;
  let runner_api = MockServer::start().await;
  mock_reply(&vendor, r#"{"summary":"login broken","category":"bug"}"#).await;
  Mock::given(method("POST"))
    .and(path("/api/v1/agent_runners"))
    .and(query_param("site_id", "site-1"))
    .and(body_json(json!({ "prompt": "Fix: login broken (from ann@example.com)" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "r1" })))
    .expect(1)
    .mount(&runner_api)
    .await;

  let h = harness(&vendor, &runner_api).await;
  let workflow_id = save_workflow(&h, vec![bug_action()]).await;
  let (_, run) = h
    .orchestrator
    .enqueue(&h.tenant, &workflow_id, input())
    .await
    .unwrap();

  let done = h
    .orchestrator
    .start_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap();

  assert_eq!(done.status(), RunStatus::Success);
  assert_eq!(
    done.action_results().unwrap(),
    &[ActionResult {
      action_id: "act-1".to_string(),
      action_name: "Open bug fix".to_string(),
      status: ActionStatus::Triggered,
      agent_runner_id: Some("r1".to_string()),
      error: None,
    }]
  );
}

#[tokio::test]
async fn test_trigger_failure_keeps_run_successful() {
  let vendor = MockServer::start().await;
  let runner_api = MockServer::start().await;
  mock_reply(&vendor, r#"{"summary":"login broken","category":"bug"}"#).await;
  Mock::given(method("POST"))
    .and(path("/api/v1/agent_runners"))
    .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
    .mount(&runner_api)
    .await;

  let h = harness(&vendor, &runner_api).await;
  let workflow_id = save_workflow(&h, vec![bug_action()]).await;
  let (_, run) = h
    .orchestrator
    .enqueue(&h.tenant, &workflow_id, input())
    .await
    .unwrap();

  let done = h
    .orchestrator
    .start_run(&h.tenant, &workflow_id, run.id())
    .await
    .unwrap();

  assert_eq!(done.status(), RunStatus::Success);
  let results = done.action_results().unwrap();
  assert_eq!(results[0].status, ActionStatus::Error);
  assert!(results[0].error.as_deref().unwrap().contains("500"));
}
