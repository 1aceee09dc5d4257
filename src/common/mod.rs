//! Common Infrastructure Module
//!
//! This module contains:
//! - Configuration loading from environment variables
//! - Structured logging setup
//! - Common error types

pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use config::{ConfigError, StakingConfig, DEFAULT_MAX_STAKERS, DEFAULT_PROGRAM_ID};
pub use error::{Constraint, Result, StakingError};
pub use logging::{
    generate_correlation_id, init_from_config, init_logging, log_deposit_event, log_pool_event,
    log_security_event, log_withdrawal_event, ErrorDetails, EventCategory, LogEvent, LogLevel,
    LoggingError,
};
