//! The ledger source
//!
//! Ties the components together behind the host-facing surface: property
//! spec, connectivity check, stream discovery, and construction of the
//! authenticated transport the engine runs on.

use crate::auth::{Authenticator, OAuthConfig};
use crate::config::{connector_spec, ConnectorSpec, SourceConfig};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::streams::{ledger_streams, LedgerStream, CURSOR_FIELD};
use crate::types::SyncMode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A discoverable stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// Sync modes the stream supports
    pub supported_sync_modes: Vec<SyncMode>,

    /// Default cursor field for incremental streams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

/// The connector's stream catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

// ============================================================================
// Source Trait
// ============================================================================

/// Host-facing surface every source implements
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the connector specification (for UI/validation)
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    async fn check(&self, config: &SourceConfig) -> CheckResult;

    /// Lists available streams from the source
    async fn discover(&self, config: &SourceConfig) -> Result<Catalog>;
}

// ============================================================================
// Ledger Source
// ============================================================================

/// The ledger API source connector
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerSource;

impl LedgerSource {
    /// Create the source
    pub fn new() -> Self {
        Self
    }

    /// Build the authenticator for a configuration
    pub fn authenticator(&self, config: &SourceConfig) -> Arc<Authenticator> {
        Arc::new(Authenticator::new(OAuthConfig::from_source_config(config)))
    }

    /// Build the authenticated transport the engine runs on
    pub fn client(&self, config: &SourceConfig) -> HttpClient {
        let http_config = HttpClientConfig::builder()
            .base_url(config.base_url())
            .build();
        HttpClient::with_config(http_config).with_authenticator(self.authenticator(config))
    }

    /// Build the stream descriptors for a configuration
    pub fn streams(&self, config: &SourceConfig) -> Vec<LedgerStream> {
        ledger_streams(config)
    }
}

#[async_trait]
impl Source for LedgerSource {
    fn spec(&self) -> ConnectorSpec {
        connector_spec()
    }

    /// A token exchange is the whole check: if credentials produce a bearer
    /// token, the stack is reachable and the config is usable.
    async fn check(&self, config: &SourceConfig) -> CheckResult {
        let authenticator = self.authenticator(config);
        match authenticator.auth_header().await {
            Ok(_) => CheckResult::success(),
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }

    async fn discover(&self, config: &SourceConfig) -> Result<Catalog> {
        let streams = self
            .streams(config)
            .iter()
            .map(|stream| CatalogStream {
                name: stream.name.to_string(),
                supported_sync_modes: if stream.is_incremental() {
                    vec![SyncMode::FullRefresh, SyncMode::Incremental]
                } else {
                    vec![SyncMode::FullRefresh]
                },
                default_cursor_field: stream
                    .is_incremental()
                    .then(|| vec![CURSOR_FIELD.to_string()]),
                source_defined_primary_key: stream
                    .primary_key
                    .map(|key| vec![vec![key.to_string()]]),
            })
            .collect();

        Ok(Catalog { streams })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(stack_url: &str) -> SourceConfig {
        SourceConfig {
            stack_url: stack_url.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ledger: "main".to_string(),
            start_date: None,
        }
    }

    #[test]
    fn test_check_result_success() {
        let result = CheckResult::success();
        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_check_result_failure() {
        let result = CheckResult::failure("Connection failed");
        assert!(!result.success);
        assert_eq!(result.message, Some("Connection failed".to_string()));
    }

    #[tokio::test]
    async fn test_check_succeeds_with_valid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let result = LedgerSource::new().check(&test_config(&server.uri())).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_check_reports_exchange_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let result = LedgerSource::new().check(&test_config(&server.uri())).await;
        assert!(!result.success);
        assert!(result.message.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_discover_catalog() {
        let source = LedgerSource::new();
        let catalog = source
            .discover(&test_config("https://acme.sandbox.ledger.dev"))
            .await
            .unwrap();

        assert_eq!(catalog.streams.len(), 3);

        let accounts = &catalog.streams[0];
        assert_eq!(accounts.name, "accounts");
        assert_eq!(accounts.supported_sync_modes, vec![SyncMode::FullRefresh]);
        assert!(accounts.default_cursor_field.is_none());
        assert!(accounts.source_defined_primary_key.is_none());

        let transactions = &catalog.streams[2];
        assert_eq!(transactions.name, "transactions");
        assert_eq!(
            transactions.supported_sync_modes,
            vec![SyncMode::FullRefresh, SyncMode::Incremental]
        );
        assert_eq!(
            transactions.default_cursor_field,
            Some(vec!["timestamp".to_string()])
        );
        assert_eq!(
            transactions.source_defined_primary_key,
            Some(vec![vec!["txid".to_string()]])
        );
    }

    #[test]
    fn test_spec_lists_all_properties() {
        let spec = LedgerSource::new().spec();
        let names: Vec<&str> = spec
            .properties
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "stack_url",
                "client_id",
                "client_secret",
                "ledger",
                "start_date"
            ]
        );
    }
}
