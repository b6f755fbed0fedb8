//! # Ledger Source Connector
//!
//! A data extraction connector for ledger-service REST APIs: pulls accounts,
//! balances and transactions from a named ledger and emits them as
//! normalized JSON records for downstream ingestion.
//!
//! ## Features
//!
//! - **OAuth2 client credentials**: token exchange against the stack's auth
//!   endpoint, cached until expiry
//! - **Cursor pagination**: follows the API's `cursor.hasMore`/`cursor.next`
//!   envelope until the server signals completion
//! - **Incremental sync**: the transactions stream tracks a `timestamp`
//!   watermark persisted between runs
//! - **Record shaping**: nested balance and commit-volume mappings are
//!   flattened into flat, ordered records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use source_ledger::config::SourceConfig;
//! use source_ledger::engine::SyncEngine;
//! use source_ledger::source::{LedgerSource, Source};
//! use source_ledger::state::StateManager;
//!
//! #[tokio::main]
//! async fn main() -> source_ledger::Result<()> {
//!     let config = SourceConfig::from_file("config.json")?;
//!     let source = LedgerSource::new();
//!
//!     // Check credentials
//!     let status = source.check(&config).await;
//!     assert!(status.success);
//!
//!     // Read every stream
//!     let state = StateManager::from_file("state.json")?;
//!     let mut engine = SyncEngine::new(source.client(&config), state);
//!     for mut stream in source.streams(&config) {
//!         for message in engine.sync_stream(&mut stream).await? {
//!             // Process messages
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        LedgerSource                             │
//! │  spec() → ConnectorSpec    check() → CheckResult                │
//! │  discover() → Catalog      streams() → Vec<LedgerStream>        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬────────────┬────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Streams   │   State    │
//! ├──────────┼───────────┼───────────────┼────────────┼────────────┤
//! │ OAuth2   │ GET       │ Cursor        │ Accounts   │ timestamp  │
//! │ client   │ Retry     │ envelope      │ Balances   │ watermark  │
//! │ creds    │ Rate Limit│               │ Txns       │ per stream │
//! └──────────┴───────────┴───────────────┴────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connector configuration and property spec
pub mod config;

/// OAuth2 client-credentials authentication
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Cursor pagination over the response envelope
pub mod pagination;

/// Stream descriptors, shapers and cursor tracking
pub mod streams;

/// State management and persistence
pub mod state;

/// Main read loop
pub mod engine;

/// The host-facing source surface
pub mod source;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use source::{LedgerSource, Source};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
