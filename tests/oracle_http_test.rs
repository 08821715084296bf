use areacode_picker::core::{AreaCodeOracle, OracleRequest};
use areacode_picker::{
    AreaCodeOracleClient, AreaCodeResolver, OpenAiOracle, PickerError, PostalCodeParser,
    TomlConfig,
};
use httpmock::prelude::*;

fn config_for(endpoint: &str, api_key: Option<&str>) -> TomlConfig {
    let key_line = api_key
        .map(|k| format!("api_key = \"{}\"", k))
        .unwrap_or_default();
    TomlConfig::from_toml_str(&format!(
        "[oracle]\nendpoint = \"{}\"\nmodel = \"gpt-4\"\ntimeout_seconds = 5\n{}\n",
        endpoint, key_line
    ))
    .unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

fn request() -> OracleRequest {
    OracleRequest {
        system: "system prompt".to_string(),
        user: "Give me area code info for these ZIP codes:\n[75034]".to_string(),
    }
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-test")
            .body_contains("\"model\":\"gpt-4\"")
            .body_contains("75034");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(completion("### Area Code: 972"));
    });

    let config = config_for(&server.url("/v1/chat/completions"), Some("sk-test"));
    let oracle = OpenAiOracle::new(&config).unwrap();

    let content = oracle.complete(&request()).await.unwrap();

    api_mock.assert();
    assert_eq!(content, "### Area Code: 972");
}

#[tokio::test]
async fn test_missing_api_key_makes_no_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("### Area Code: 972"));
    });

    let config = config_for(&server.url("/v1/chat/completions"), None);
    let oracle = OpenAiOracle::new(&config).unwrap();

    let err = oracle.complete(&request()).await.unwrap_err();

    assert!(matches!(err, PickerError::OracleUnavailable { .. }));
    assert!(!oracle.has_credentials());
    api_mock.assert_hits(0);
}

#[tokio::test]
async fn test_http_error_is_oracle_unavailable() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500);
    });

    let config = config_for(&server.url("/v1/chat/completions"), Some("sk-test"));
    let oracle = OpenAiOracle::new(&config).unwrap();

    let err = oracle.complete(&request()).await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, PickerError::OracleUnavailable { .. }));
}

#[tokio::test]
async fn test_reply_without_choices_is_unparseable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({"choices": []}));
    });

    let config = config_for(&server.url("/v1/chat/completions"), Some("sk-test"));
    let oracle = OpenAiOracle::new(&config).unwrap();

    let err = oracle.complete(&request()).await.unwrap_err();
    assert!(matches!(err, PickerError::UnparseableReply { .. }));
}

#[tokio::test]
async fn test_resolver_over_http_uses_one_batch_call_then_cache() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("75024, 75034");
        then.status(200).json_body(completion(
            "### Area Code: 972\n**Overlays:** 214, 469\n**ZIPs:** 75034, 75024",
        ));
    });

    let config = config_for(&server.url("/v1/chat/completions"), Some("sk-test"));
    let resolver =
        AreaCodeResolver::new(AreaCodeOracleClient::new(OpenAiOracle::new(&config).unwrap()));
    let postal_codes = PostalCodeParser::parse("75034, 75024");

    let first = resolver.resolve(&postal_codes).await;
    let second = resolver.resolve(&postal_codes).await;

    api_mock.assert_hits(1);
    assert_eq!(first, second);
    assert_eq!(
        first.best_area_code.map(|c| c.to_string()),
        Some("972".to_string())
    );
    assert_eq!(first.common_area_codes.len(), 1);
}

#[tokio::test]
async fn test_resolver_over_unreachable_oracle_degrades_to_none() {
    // 沒有任何 server 在這個 port 上
    let config = config_for("http://127.0.0.1:9/v1/chat/completions", Some("sk-test"));
    let resolver =
        AreaCodeResolver::new(AreaCodeOracleClient::new(OpenAiOracle::new(&config).unwrap()));

    let result = resolver
        .resolve(&PostalCodeParser::parse("75034, 75024"))
        .await;

    assert!(result.common_area_codes.is_empty());
    assert_eq!(result.best_area_code, None);
    assert_eq!(resolver.client().cache().len(), 2);
}
