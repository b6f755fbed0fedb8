//! Tests for the sync engine

use super::*;
use crate::config::SourceConfig;
use crate::http::HttpClientConfig;
use crate::streams::ledger_streams;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> SourceConfig {
    SourceConfig {
        stack_url: server.uri(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        ledger: "main".to_string(),
        start_date: None,
    }
}

fn test_engine(server: &MockServer, state: StateManager) -> SyncEngine {
    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url(server.uri())
            .no_rate_limit()
            .build(),
    );
    SyncEngine::new(client, state)
}

fn record_data(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { data, .. } => Some(data.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_single_page_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": false,
                "data": [
                    {"address": "world"},
                    {"address": "acct:1"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(0);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    let records = record_data(&messages);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["address"], "world");
    assert_eq!(records[1]["address"], "acct:1");
    assert_eq!(engine.stats().pages_fetched, 1);
}

#[tokio::test]
async fn test_pagination_carries_advertised_cursor() {
    let server = MockServer::start().await;

    // Page 1: no cursor param
    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": true,
                "next": "page-2-token",
                "data": [{"address": "acct:1"}]
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Page 2: must carry exactly the advertised token
    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .and(query_param("cursor", "page-2-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": false,
                "data": [{"address": "acct:2"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(0);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    let records = record_data(&messages);

    assert_eq!(records.len(), 2);
    assert_eq!(engine.stats().pages_fetched, 2);
}

#[tokio::test]
async fn test_incremental_merges_time_filter_with_cursor() {
    let server = MockServer::start().await;

    // Both pages must carry the startTime from host state
    Mock::given(method("GET"))
        .and(path("/api/ledger/main/transactions"))
        .and(query_param("startTime", "2023-05-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": true,
                "next": "tx-page-2",
                "data": [{"txid": 1, "timestamp": "2023-05-02T00:00:00Z"}]
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/transactions"))
        .and(query_param("startTime", "2023-05-01T00:00:00Z"))
        .and(query_param("cursor", "tx-page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": false,
                "data": [{"txid": 2, "timestamp": "2023-05-03T00:00:00Z"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = StateManager::from_json(
        r#"{"streams": {"transactions": {"timestamp": "2023-05-01T00:00:00Z"}}}"#,
    )
    .unwrap();

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(2);
    let mut engine = test_engine(&server, state);

    let messages = engine.sync_stream(&mut stream).await.unwrap();

    assert_eq!(record_data(&messages).len(), 2);

    // Watermark advanced to the max observed value
    assert_eq!(
        engine.state().get_timestamp("transactions").await,
        Some(json!("2023-05-03T00:00:00Z"))
    );

    // Final state message carries the host-persisted shape
    let state_messages: Vec<_> = messages.iter().filter(|m| m.is_state()).collect();
    assert_eq!(state_messages.len(), 1);
    if let Message::State { data, .. } = state_messages[0] {
        assert_eq!(data, &json!({"timestamp": "2023-05-03T00:00:00Z"}));
    }
}

#[tokio::test]
async fn test_start_date_used_without_host_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/transactions"))
        .and(query_param("startTime", "2023-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {"hasMore": false, "data": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.start_date = Some("2023-01-01T00:00:00Z".to_string());

    let mut stream = ledger_streams(&config).remove(2);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    assert!(record_data(&messages).is_empty());
}

#[tokio::test]
async fn test_balances_flattened_through_engine() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/balances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": false,
                "data": [
                    {"acct:1": {"USD": 100, "EUR": 50}},
                    {"acct:2": {}}
                ]
            }
        })))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(1);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    let records = record_data(&messages);

    // Two (address, asset) pairs; the empty element contributes nothing
    assert_eq!(
        records,
        vec![
            json!({"address": "acct:1", "asset": "USD", "balance": 100}),
            json!({"address": "acct:1", "asset": "EUR", "balance": 50}),
        ]
    );
}

#[tokio::test]
async fn test_malformed_envelope_is_hard_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": []
        })))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(0);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let err = engine.sync_stream(&mut stream).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_full_refresh_emits_no_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {"hasMore": false, "data": [{"address": "acct:1"}]}
        })))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(0);
    let mut engine = test_engine(&server, StateManager::in_memory());

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    assert!(!messages.iter().any(Message::is_state));
}

#[tokio::test]
async fn test_max_records_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": true,
                "next": "never-fetched",
                "data": [
                    {"address": "acct:1"},
                    {"address": "acct:2"},
                    {"address": "acct:3"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(0);
    let mut engine = test_engine(&server, StateManager::in_memory())
        .with_config(SyncConfig::new().with_max_records(2));

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    assert_eq!(record_data(&messages).len(), 2);
}

#[tokio::test]
async fn test_state_per_page_checkpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": true,
                "next": "p2",
                "data": [{"txid": 1, "timestamp": "2023-05-02T00:00:00Z"}]
            }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ledger/main/transactions"))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor": {
                "hasMore": false,
                "data": [{"txid": 2, "timestamp": "2023-05-03T00:00:00Z"}]
            }
        })))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let mut stream = ledger_streams(&config).remove(2);
    let mut engine = test_engine(&server, StateManager::in_memory())
        .with_config(SyncConfig::new().with_state_per_page(true));

    let messages = engine.sync_stream(&mut stream).await.unwrap();
    let state_count = messages.iter().filter(|m| m.is_state()).count();

    // One per page plus the final checkpoint
    assert_eq!(state_count, 3);
}
