mod harness;

use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use harness::server::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn healthy_without_tool_servers() {
    let mock = MockLlm::start(vec![]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new().with_anthropic(&mock.base_url()).build())
        .await
        .unwrap();

    let response = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"], json!({"mcp_server": "ok", "sqlite": "ok"}));
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn degraded_when_tool_server_is_down() {
    let mock = MockLlm::start(vec![]).await.unwrap();
    let config = ConfigBuilder::new()
        .with_anthropic(&mock.base_url())
        .with_broken_mcp_server("fitness")
        .build();
    let server = TestServer::start(config).await.unwrap();

    let response = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["mcp_server"], "error");
    assert_eq!(body["checks"]["sqlite"], "ok");
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let mock = MockLlm::start(vec![]).await.unwrap();
    let config = ConfigBuilder::new()
        .with_anthropic(&mock.base_url())
        .without_health()
        .build();
    let server = TestServer::start(config).await.unwrap();

    let response = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 404);
}
