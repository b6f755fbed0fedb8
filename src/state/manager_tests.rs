//! Tests for the state manager

use super::*;
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn test_in_memory_state() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());

    assert!(manager.get_timestamp("transactions").await.is_none());

    manager
        .set_timestamp("transactions", json!("2023-01-01T00:00:00Z"))
        .await
        .unwrap();
    assert_eq!(
        manager.get_timestamp("transactions").await,
        Some(json!("2023-01-01T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_state_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let manager = StateManager::new(&path);
        manager
            .set_timestamp("transactions", json!("2023-06-15T10:30:00Z"))
            .await
            .unwrap();
    }

    // Reload from file
    let manager = StateManager::from_file(&path).unwrap();
    assert_eq!(
        manager.get_timestamp("transactions").await,
        Some(json!("2023-06-15T10:30:00Z"))
    );
}

#[tokio::test]
async fn test_from_file_missing_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");

    let manager = StateManager::from_file(&path).unwrap();
    assert!(manager.get_timestamp("transactions").await.is_none());
}

#[tokio::test]
async fn test_from_json_inline() {
    let manager = StateManager::from_json(
        r#"{"streams": {"transactions": {"timestamp": "2023-02-02T00:00:00Z"}}}"#,
    )
    .unwrap();

    assert_eq!(
        manager.get_timestamp("transactions").await,
        Some(json!("2023-02-02T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_from_json_invalid() {
    let result = StateManager::from_json("not json");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_atomic_write_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    manager
        .set_timestamp("transactions", json!("2023-01-01T00:00:00Z"))
        .await
        .unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_clear_stream() {
    let manager = StateManager::in_memory();
    manager
        .set_timestamp("transactions", json!("2023-01-01T00:00:00Z"))
        .await
        .unwrap();

    manager.clear_stream("transactions").await.unwrap();
    assert!(manager.get_timestamp("transactions").await.is_none());
}

#[tokio::test]
async fn test_to_json_exports_stream_shape() {
    let manager = StateManager::in_memory();
    manager
        .set_timestamp("transactions", json!("2023-01-01T00:00:00Z"))
        .await
        .unwrap();

    let exported = manager.to_json().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(
        value["streams"]["transactions"]["timestamp"],
        json!("2023-01-01T00:00:00Z")
    );
}
