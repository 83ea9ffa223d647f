//! Simulator configuration

use crate::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use sim_core::{Balance, Gas, StorageUsage};
use std::path::PathBuf;

/// Starting balance for accounts created on demand
pub const DEFAULT_BALANCE: Balance = 1_000_000_000_000;

/// Gas attached to a call when the caller does not specify any
pub const DEFAULT_GAS: Gas = 300_000_000_000_000;

/// Storage usage of a freshly created or reset account
pub const DEFAULT_STORAGE_USAGE: StorageUsage = 60;

/// Simulator-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Path to the standalone VM runner binary
    pub runner_binary: PathBuf,
    /// Starting balance for new accounts
    #[serde(with = "sim_core::serialize::u128_dec_format")]
    pub default_balance: Balance,
    /// Gas attached to calls that do not specify any
    pub default_gas: Gas,
    /// Storage usage assigned on account creation and reset
    pub default_storage_usage: StorageUsage,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            runner_binary: PathBuf::from("vm-runner-standalone"),
            default_balance: DEFAULT_BALANCE,
            default_gas: DEFAULT_GAS,
            default_storage_usage: DEFAULT_STORAGE_USAGE,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from TOML
    pub fn from_toml(toml_str: &str) -> VmResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| VmError::Config(format!("failed to parse simulator config: {}", e)))
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> VmResult<String> {
        toml::to_string(self)
            .map_err(|e| VmError::Config(format!("failed to serialize simulator config: {}", e)))
    }
}
