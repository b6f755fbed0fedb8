//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SourceConfig;
use crate::engine::{LogLevel, Message, SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::source::{LedgerSource, Source};
use crate::state::StateManager;
use serde_json::{json, Value};
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { config_json } => self.check(config_json.as_deref()).await,
            Commands::Discover { config_json } => self.discover(config_json.as_deref()).await,
            Commands::Read {
                streams,
                config_json,
                max_records,
                state_per_page,
            } => {
                self.read(
                    streams.as_deref(),
                    config_json.as_deref(),
                    *max_records,
                    *state_per_page,
                )
                .await
            }
            Commands::Spec => self.spec(),
        }
    }

    /// Load configuration
    fn load_config(&self, inline: Option<&str>) -> Result<SourceConfig> {
        // Inline config takes precedence
        if let Some(json_str) = inline {
            return SourceConfig::from_json(json_str);
        }

        if let Some(path) = &self.cli.config {
            return SourceConfig::from_file(path);
        }

        Err(Error::config(
            "Config not specified (use -C <file> or --config-json)",
        ))
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Check connection
    async fn check(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let source = LedgerSource::new();

        self.output_log("INFO", format!("Checking connection to {}", config.base_url()));

        let result = source.check(&config).await;
        let (status, message) = if result.success {
            ("SUCCEEDED".to_string(), "Connection successful".to_string())
        } else {
            (
                "FAILED".to_string(),
                format!(
                    "Connection failed: {}",
                    result.message.unwrap_or_default()
                ),
            )
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": message
            }
        }));

        Ok(())
    }

    /// Discover streams
    async fn discover(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let source = LedgerSource::new();
        let catalog = source.discover(&config).await?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": serde_json::to_value(&catalog)?
        }));

        Ok(())
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = LedgerSource::new().spec();

        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for (name, property) in &spec.properties {
            properties.insert(name.clone(), serde_json::to_value(property)?);
            if property.required {
                required.push(name.clone());
            }
        }

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "connectionSpecification": {
                    "type": "object",
                    "title": spec.title,
                    "properties": properties,
                    "required": required
                }
            }
        }));

        Ok(())
    }

    /// Read data
    async fn read(
        &self,
        streams: Option<&str>,
        config_json: Option<&str>,
        max_records: Option<usize>,
        state_per_page: bool,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config(config_json)?;
        let state = self.load_state()?;
        let source = LedgerSource::new();

        // Parse streams filter
        let stream_filter: Option<Vec<&str>> = streams.map(|s| s.split(',').collect());

        // Build sync config
        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }
        if state_per_page {
            sync_config = sync_config.with_state_per_page(true);
        }

        let client = source.client(&config);
        let mut engine = SyncEngine::new(client, state).with_config(sync_config);

        // Track per-stream statistics
        let mut stream_results: Vec<Value> = Vec::new();
        let mut total_records = 0usize;

        for mut stream in source.streams(&config) {
            // Check filter
            if let Some(ref filter) = stream_filter {
                if !filter.contains(&stream.name) {
                    continue;
                }
            }

            let stream_start = Instant::now();
            let records_before = engine.stats().records_synced;

            let sync_result = engine.sync_stream(&mut stream).await;

            let stream_duration_ms = stream_start.elapsed().as_millis() as u64;
            let stream_records = engine.stats().records_synced - records_before;

            match sync_result {
                Ok(messages) => {
                    for message in messages {
                        self.output_engine_message(&message);
                    }

                    total_records += stream_records;
                    stream_results.push(json!({
                        "stream": stream.name,
                        "status": "SUCCESS",
                        "records_synced": stream_records,
                        "duration_ms": stream_duration_ms
                    }));
                }
                Err(e) => {
                    self.output_log("ERROR", format!("Error syncing stream {}: {e}", stream.name));
                    stream_results.push(json!({
                        "stream": stream.name,
                        "status": "FAILED",
                        "error": e.to_string(),
                        "records_synced": stream_records,
                        "duration_ms": stream_duration_ms
                    }));
                }
            }
        }

        // Persist final state if a state file was given
        let state_file_path: Option<String> = if let Some(state_path) = &self.cli.state {
            engine.state().save_to_file(state_path).await?;
            Some(state_path.to_string_lossy().to_string())
        } else {
            None
        };

        // Always emit final state to stdout so the caller can capture it
        let final_state = engine.state().to_json().await?;
        self.output_message(&json!({
            "type": "STATE",
            "state": serde_json::from_str::<Value>(&final_state).unwrap_or_default()
        }));

        // Emit sync summary for programmatic consumption
        let total_duration_ms = sync_start.elapsed().as_millis() as u64;
        let successful_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "SUCCESS")
            .count();
        let failed_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "FAILED")
            .count();

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": if failed_streams == 0 { "SUCCEEDED" } else if successful_streams == 0 { "FAILED" } else { "PARTIAL" },
                "connector": "source-ledger",
                "ledger": config.ledger,
                "total_records": total_records,
                "total_streams": stream_results.len(),
                "successful_streams": successful_streams,
                "failed_streams": failed_streams,
                "duration_ms": total_duration_ms,
                "state_file": state_file_path,
                "streams": stream_results
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }

    /// Output a log message
    fn output_log(&self, level: &str, message: impl Into<String>) {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message.into()
            }
        }));
    }

    /// Output an engine message
    fn output_engine_message(&self, message: &Message) {
        match message {
            Message::Record { stream, data } => {
                let emitted_at = chrono::Utc::now().timestamp_millis();
                self.output_message(&json!({
                    "type": "RECORD",
                    "record": {
                        "stream": stream,
                        "data": data,
                        "emitted_at": emitted_at
                    }
                }));
            }
            Message::State { stream, data } => {
                self.output_message(&json!({
                    "type": "STATE",
                    "state": {
                        "type": "STREAM",
                        "stream": {
                            "stream_descriptor": {
                                "name": stream
                            },
                            "stream_state": data
                        }
                    }
                }));
            }
            Message::Log { level, message } => {
                let level_str = match level {
                    LogLevel::Debug => "DEBUG",
                    LogLevel::Info => "INFO",
                    LogLevel::Warn => "WARN",
                    LogLevel::Error => "ERROR",
                };
                if *level == LogLevel::Debug && !self.cli.verbose {
                    return;
                }
                self.output_log(level_str, message.clone());
            }
        }
    }
}
