//! Structured Logging for the Staking Pool
//!
//! Pool, deposit, withdrawal and security events are emitted as JSON payloads
//! on dedicated `tracing` targets so they can be filtered independently:
//!
//! - `stakepool::pool`
//! - `stakepool::deposit`
//! - `stakepool::withdraw`
//! - `stakepool::security`

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

// ============================================================================
// Log Levels
// ============================================================================

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

// ============================================================================
// Structured Event Types
// ============================================================================

/// Event categories for structured logging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Pool creation
    Pool,
    /// Deposit events
    Deposit,
    /// Withdrawal events
    Withdrawal,
    /// Authorization and ownership failures
    Security,
}

/// Structured log event
#[derive(Debug, Serialize)]
pub struct LogEvent {
    /// Event timestamp (ISO 8601)
    pub timestamp: String,
    pub level: String,
    pub category: EventCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Error details for failed operations
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: format!("{:?}", level).to_uppercase(),
            category,
            message: message.into(),
            correlation_id: None,
            data: None,
            error: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some(ErrorDetails {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize log\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

// ============================================================================
// Event Logging
// ============================================================================

/// Log pool creation
pub fn log_pool_event(
    event_type: &str,
    correlation_id: &str,
    pool_id: &str,
    mint: &str,
    vault: &str,
) {
    let event = pool_event(event_type, correlation_id, pool_id, mint, vault);
    tracing::info!(target: "stakepool::pool", "{}", event.to_json());
}

fn pool_event(
    event_type: &str,
    correlation_id: &str,
    pool_id: &str,
    mint: &str,
    vault: &str,
) -> LogEvent {
    LogEvent::new(LogLevel::Info, EventCategory::Pool, event_type)
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({
            "pool_id": pool_id,
            "mint": mint,
            "vault": vault
        }))
}

/// Log a deposit outcome
pub fn log_deposit_event(
    correlation_id: &str,
    pool_id: &str,
    owner: &str,
    amount: u64,
    shares: u64,
    error: Option<(&str, &str)>,
) {
    let success = error.is_none();
    let level = if success { LogLevel::Info } else { LogLevel::Error };
    let mut event = LogEvent::new(level, EventCategory::Deposit, "deposit")
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({
            "pool_id": pool_id,
            "owner": owner,
            "amount": amount,
            "shares": shares,
            "success": success
        }));

    if let Some((code, message)) = error {
        event = event.with_error(code, message);
    }

    if success {
        tracing::info!(target: "stakepool::deposit", "{}", event.to_json());
    } else {
        tracing::error!(target: "stakepool::deposit", "{}", event.to_json());
    }
}

/// Log a withdrawal outcome
pub fn log_withdrawal_event(
    correlation_id: &str,
    pool_id: &str,
    staker_id: &str,
    payout: u64,
    shares: u64,
    error: Option<(&str, &str)>,
) {
    let success = error.is_none();
    let level = if success { LogLevel::Info } else { LogLevel::Error };
    let mut event = LogEvent::new(level, EventCategory::Withdrawal, "withdraw")
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({
            "pool_id": pool_id,
            "staker_id": staker_id,
            "payout": payout,
            "shares": shares,
            "success": success
        }));

    if let Some((code, message)) = error {
        event = event.with_error(code, message);
    }

    if success {
        tracing::info!(target: "stakepool::withdraw", "{}", event.to_json());
    } else {
        tracing::error!(target: "stakepool::withdraw", "{}", event.to_json());
    }
}

/// Log a rejected authorization or ownership check
pub fn log_security_event(event_type: &str, details: serde_json::Value, correlation_id: &str) {
    let event = LogEvent::new(LogLevel::Warn, EventCategory::Security, event_type)
        .with_correlation_id(correlation_id)
        .with_data(details);

    tracing::warn!(target: "stakepool::security", "{}", event.to_json());
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stakepool={}",
            Level::from(level).as_str().to_lowercase()
        ))
    });

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from StakingConfig
pub fn init_from_config(config: &super::config::StakingConfig) -> Result<(), LoggingError> {
    init_logging(LogLevel::from(config.log_level.as_str()), config.json_logs)
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Generate a correlation ID tying together the log lines of one operation
pub fn generate_correlation_id() -> String {
    format!(
        "{:x}-{:04x}",
        chrono::Utc::now().timestamp_micros() & 0xFFFF_FFFF,
        rand::random::<u16>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(LogLevel::Warn, EventCategory::Security, "owner_mismatch")
            .with_correlation_id("test-123")
            .with_data(serde_json::json!({"pool_id": "abc"}))
            .with_error("OWNER_MISMATCH", "caller is not the owner");

        let json = event.to_json();
        assert!(json.contains("owner_mismatch"));
        assert!(json.contains("test-123"));
        assert!(json.contains("\"category\":\"security\""));
        assert!(json.contains("OWNER_MISMATCH"));
    }

    #[test]
    fn test_pool_event_carries_operation_correlation_id() {
        let json = pool_event("pool_initialized", "op-42", "pool-1", "mint-1", "vault-1").to_json();
        assert!(json.contains("\"correlation_id\":\"op-42\""));
        assert!(json.contains("pool-1"));
        assert!(json.contains("\"category\":\"pool\""));
    }

    #[test]
    fn test_log_level_maps_to_tracing_level() {
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Trace).as_str().to_lowercase(), "trace");
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::from("unknown"), LogLevel::Info);
    }

    #[test]
    fn test_correlation_id_generation() {
        let id = generate_correlation_id();
        assert!(id.contains('-'));
        assert!(!id.is_empty());
    }

    #[test]
    fn test_init_twice_fails_cleanly() {
        let config = crate::common::StakingConfig::default();
        // Another test may have installed a global subscriber first.
        let _ = init_from_config(&config);
        assert!(init_logging(LogLevel::Debug, false).is_err());
    }
}
