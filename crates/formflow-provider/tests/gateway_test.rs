use chrono::Utc;
use formflow_config::{OutputSchema, SchemaType, WorkflowConfig};
use formflow_provider::{
  AiGateway, CompletionGateway, ProviderError, ProviderKind, ProviderSettings, VendorEndpoint,
};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(provider: &str, model: &str) -> WorkflowConfig {
  WorkflowConfig {
    id: "wf-1".to_string(),
    name: "Contact".to_string(),
    form_name: Some("contact".to_string()),
    input_fields: vec!["msg".to_string()],
    prompt: "Summarize: {{msg}}".to_string(),
    output_schema: OutputSchema::object([("summary", OutputSchema::of(SchemaType::String))]),
    provider: provider.to_string(),
    model: model.to_string(),
    redirect_url: None,
    actions: vec![],
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

fn input() -> Map<String, Value> {
  json!({ "msg": "hello" }).as_object().cloned().unwrap()
}

fn gateway_for(kind: ProviderKind, server: &MockServer) -> AiGateway {
  let mut settings = ProviderSettings::unconfigured();
  let endpoint = VendorEndpoint::new(server.uri(), Some("test-key".to_string()));
  match kind {
    ProviderKind::Anthropic => settings.anthropic = endpoint,
    ProviderKind::OpenAi => settings.openai = endpoint,
    ProviderKind::Google => settings.google = endpoint,
  }
  AiGateway::new(settings).unwrap()
}

#[tokio::test]
async fn test_anthropic_fenced_reply() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/messages"))
    .and(header("x-api-key", "test-key"))
    .and(header("anthropic-version", "2023-06-01"))
    .and(body_partial_json(json!({ "model": "claude-sonnet-4-20250514" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "content": [{ "type": "text", "text": "```json\n{\"summary\":\"hi\"}\n```" }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::Anthropic, &server);
  let output = gateway
    .invoke(&config("anthropic", "claude-sonnet-4-20250514"), &input())
    .await
    .unwrap();

  assert_eq!(Value::Object(output), json!({ "summary": "hi" }));
}

#[tokio::test]
async fn test_openai_plain_reply() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/chat/completions"))
    .and(header("authorization", "Bearer test-key"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "choices": [{ "message": { "content": "{\"summary\":\"from openai\"}" } }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::OpenAi, &server);
  let output = gateway.invoke(&config("openai", "gpt-4o"), &input()).await.unwrap();

  assert_eq!(output["summary"], "from openai");
}

#[tokio::test]
async fn test_google_key_in_query() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
    .and(query_param("key", "test-key"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "candidates": [{ "content": { "parts": [{ "text": "{\"summary\":\"g\"}" }] } }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::Google, &server);
  let output = gateway
    .invoke(&config("google", "gemini-1.5-flash"), &input())
    .await
    .unwrap();

  assert_eq!(output["summary"], "g");
}

#[tokio::test]
async fn test_vendor_error_status() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/chat/completions"))
    .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::OpenAi, &server);
  let err = gateway
    .invoke(&config("openai", "gpt-4o"), &input())
    .await
    .unwrap_err();

  match &err {
    ProviderError::Vendor { status, detail, .. } => {
      assert_eq!(*status, 429);
      assert_eq!(detail, "rate limited");
    }
    other => panic!("unexpected error: {other}"),
  }
  assert_eq!(err.to_string(), "OpenAI API error: 429 rate limited");
}

#[tokio::test]
async fn test_prose_reply_is_unparseable() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/messages"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "content": [{ "type": "text", "text": "I cannot help with that." }]
    })))
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::Anthropic, &server);
  let err = gateway
    .invoke(&config("anthropic", "claude-sonnet-4-20250514"), &input())
    .await
    .unwrap_err();

  assert!(matches!(err, ProviderError::UnparseableOutput { ref raw, .. } if raw == "I cannot help with that."));
}

#[tokio::test]
async fn test_non_json_success_body_is_missing_content() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
    .mount(&server)
    .await;

  let gateway = gateway_for(ProviderKind::Google, &server);
  let err = gateway
    .invoke(&config("google", "gemini-1.5-pro"), &input())
    .await
    .unwrap_err();

  match &err {
    ProviderError::MissingContent { provider, detail } => {
      assert_eq!(*provider, ProviderKind::Google);
      assert!(detail.starts_with("response body is not JSON"));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let mut settings = ProviderSettings::unconfigured();
  settings.anthropic = VendorEndpoint::new(server.uri(), None);
  let gateway = AiGateway::new(settings).unwrap();

  let err = gateway
    .invoke(&config("anthropic", "claude-sonnet-4-20250514"), &input())
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "ANTHROPIC_API_KEY not configured");
}

#[tokio::test]
async fn test_unsupported_provider() {
  let gateway = AiGateway::new(ProviderSettings::unconfigured()).unwrap();
  let err = gateway
    .invoke(&config("mistral", "large"), &input())
    .await
    .unwrap_err();

  assert!(matches!(err, ProviderError::UnsupportedProvider(ref p) if p == "mistral"));
}
