//! Environment-based Configuration for the Staking Pool
//!
//! # Environment Variables
//!
//! - `STAKEPOOL_MAX_STAKERS` - Active depositor cap per pool (default: 5)
//! - `STAKEPOOL_MIN_DEPOSIT` - Smallest accepted deposit (default: 1)
//! - `STAKEPOOL_PROGRAM_ID` - Base58 namespace for vault authority derivation
//! - `STAKEPOOL_LOG_LEVEL` - Logging level (trace, debug, info, warn, error)
//! - `STAKEPOOL_LOG_JSON` - Set to "1" for JSON log output

use std::env;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Default derivation namespace for vault authorities
pub const DEFAULT_PROGRAM_ID: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

/// Observed depositor cap
pub const DEFAULT_MAX_STAKERS: u8 = 5;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Staking pool configuration
#[derive(Debug, Clone)]
pub struct StakingConfig {
    /// Maximum number of concurrently active depositors per pool
    pub max_stakers: u8,

    /// Smallest deposit amount accepted
    pub min_deposit: u64,

    /// Namespace the vault authority is derived under
    pub program_id: Pubkey,

    /// Log level
    pub log_level: String,

    /// Emit JSON logs
    pub json_logs: bool,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            max_stakers: DEFAULT_MAX_STAKERS,
            min_deposit: 1,
            program_id: default_program_id(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl StakingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_stakers = parse_env_or("STAKEPOOL_MAX_STAKERS", DEFAULT_MAX_STAKERS)?;
        let min_deposit = parse_env_or("STAKEPOOL_MIN_DEPOSIT", 1u64)?;

        let program_id = match env::var("STAKEPOOL_PROGRAM_ID") {
            Ok(value) => Pubkey::from_str(&value).map_err(|e| {
                ConfigError::InvalidValue("STAKEPOOL_PROGRAM_ID".to_string(), e.to_string())
            })?,
            Err(_) => default_program_id(),
        };

        let log_level = env::var("STAKEPOOL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_logs = env::var("STAKEPOOL_LOG_JSON").map(|v| v == "1").unwrap_or(false);

        let config = Self {
            max_stakers,
            min_deposit,
            program_id,
            log_level,
            json_logs,
        };
        config.validate()?;

        Ok(config)
    }

    /// Reject settings no pool can operate under
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stakers == 0 {
            return Err(ConfigError::InvalidValue(
                "STAKEPOOL_MAX_STAKERS".to_string(),
                "cap must be at least 1".to_string(),
            ));
        }

        if self.min_deposit == 0 {
            return Err(ConfigError::InvalidValue(
                "STAKEPOOL_MIN_DEPOSIT".to_string(),
                "zero-amount deposits are never accepted".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style override of the depositor cap
    pub fn with_max_stakers(mut self, max_stakers: u8) -> Self {
        self.max_stakers = max_stakers;
        self
    }
}

fn default_program_id() -> Pubkey {
    Pubkey::from_str(DEFAULT_PROGRAM_ID).unwrap_or_default()
}

fn parse_env_or<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var_name) {
        Ok(value) => value.parse().map_err(|_| {
            ConfigError::InvalidValue(var_name.to_string(), format!("cannot parse '{}'", value))
        }),
        Err(_) => Ok(default),
    }
}
