//! Connector configuration
//!
//! The user-supplied configuration for a sync run, plus the machine-readable
//! property specification hosts use to render a setup form and validate
//! input before it reaches the connector.

use crate::error::{Error, Result};
use crate::types::PropertyType;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Source Config
// ============================================================================

/// User-supplied configuration for the ledger source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the ledger stack (e.g. `https://example.sandbox.ledger.dev`)
    pub stack_url: String,

    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Name of the ledger to extract from
    pub ledger: String,

    /// Optional lower bound for incremental streams (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

impl SourceConfig {
    /// Parse a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Validate field contents
    ///
    /// Hosts validate against the spec before calling the connector, but the
    /// CLI entry points accept raw JSON and need the same guarantees.
    pub fn validate(&self) -> Result<()> {
        if self.stack_url.is_empty() {
            return Err(Error::missing_field("stack_url"));
        }
        url::Url::parse(&self.stack_url)?;
        if self.client_id.is_empty() {
            return Err(Error::missing_field("client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field("client_secret"));
        }
        if self.ledger.is_empty() {
            return Err(Error::missing_field("ledger"));
        }
        if let Some(start_date) = &self.start_date {
            chrono::DateTime::parse_from_rfc3339(start_date).map_err(|e| {
                Error::config(format!("start_date must be an ISO 8601 datetime: {e}"))
            })?;
        }
        Ok(())
    }

    /// The stack URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.stack_url.trim_end_matches('/')
    }

    /// The OAuth2 token endpoint for this stack
    pub fn token_url(&self) -> String {
        format!("{}/api/auth/oauth/token", self.base_url())
    }
}

// ============================================================================
// Spec (for host UIs)
// ============================================================================

/// A single property in the connector specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    /// Human-readable title
    pub title: String,

    /// Property description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Format hint (e.g. "date-time", "uri")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Connector specification returned by `spec()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Configuration properties, in form order
    pub properties: Vec<(String, PropertySpec)>,
}

/// Build the specification for this connector
pub fn connector_spec() -> ConnectorSpec {
    let prop = |title: &str, secret: bool, required: bool, format: Option<&str>| PropertySpec {
        property_type: PropertyType::String,
        title: title.to_string(),
        description: None,
        secret,
        required,
        format: format.map(String::from),
    };

    ConnectorSpec {
        name: "source-ledger".to_string(),
        title: "Ledger Source".to_string(),
        properties: vec![
            ("stack_url".to_string(), prop("Stack URL", false, true, Some("uri"))),
            ("client_id".to_string(), prop("Client ID", true, true, None)),
            (
                "client_secret".to_string(),
                prop("Client Secret", true, true, None),
            ),
            ("ledger".to_string(), prop("Ledger", false, true, None)),
            (
                "start_date".to_string(),
                prop("Start Date", false, false, Some("date-time")),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> &'static str {
        r#"{
            "stack_url": "https://acme.sandbox.ledger.dev",
            "client_id": "client-123",
            "client_secret": "secret-456",
            "ledger": "main"
        }"#
    }

    #[test]
    fn test_parse_valid_config() {
        let config = SourceConfig::from_json(valid_json()).unwrap();
        assert_eq!(config.ledger, "main");
        assert!(config.start_date.is_none());
    }

    #[test]
    fn test_token_url() {
        let config = SourceConfig::from_json(valid_json()).unwrap();
        assert_eq!(
            config.token_url(),
            "https://acme.sandbox.ledger.dev/api/auth/oauth/token"
        );
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let mut config = SourceConfig::from_json(valid_json()).unwrap();
        config.stack_url = "https://acme.sandbox.ledger.dev/".to_string();
        assert_eq!(config.base_url(), "https://acme.sandbox.ledger.dev");
        assert_eq!(
            config.token_url(),
            "https://acme.sandbox.ledger.dev/api/auth/oauth/token"
        );
    }

    #[test]
    fn test_missing_field() {
        let err = SourceConfig::from_json(
            r#"{"stack_url": "https://x.dev", "client_id": "a", "client_secret": "b", "ledger": ""}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ledger"));
    }

    #[test]
    fn test_invalid_stack_url() {
        let result = SourceConfig::from_json(
            r#"{"stack_url": "not a url", "client_id": "a", "client_secret": "b", "ledger": "main"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_start_date_validation() {
        let config = SourceConfig::from_json(
            r#"{
                "stack_url": "https://x.dev",
                "client_id": "a",
                "client_secret": "b",
                "ledger": "main",
                "start_date": "2023-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(config.start_date.as_deref(), Some("2023-01-01T00:00:00Z"));

        let result = SourceConfig::from_json(
            r#"{
                "stack_url": "https://x.dev",
                "client_id": "a",
                "client_secret": "b",
                "ledger": "main",
                "start_date": "yesterday"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_spec_marks_secrets() {
        let spec = connector_spec();
        let secret_fields: Vec<&str> = spec
            .properties
            .iter()
            .filter(|(_, p)| p.secret)
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(secret_fields, vec!["client_id", "client_secret"]);
    }
}
