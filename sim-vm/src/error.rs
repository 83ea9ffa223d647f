//! Simulator error types

use sim_core::AccountId;
use std::path::PathBuf;
use thiserror::Error;

/// Simulator error type.
///
/// All of these are fatal to the operation that raised them. Contract-level
/// failures are not errors: they live in `Outcome::err` and flow through the
/// promise graph as `Failed` results.
#[derive(Error, Debug)]
pub enum VmError {
    /// Contract path did not resolve at account creation time
    #[error("contract file not found: {0}")]
    MissingContract(PathBuf),

    /// Lookup of an account that was never added
    #[error("unknown account: {0}")]
    UnknownAccount(AccountId),

    /// The VM runner process could not be spawned
    #[error("failed to launch VM runner: {0}")]
    VmLaunchFailed(#[source] std::io::Error),

    /// The VM runner exited non-zero
    #[error("VM runner exited with status {code:?}: {stderr}")]
    VmCrashed { code: Option<i32>, stderr: String },

    /// The VM runner's output could not be parsed
    #[error("malformed VM runner output: {0}")]
    MalformedOutcome(String),

    /// A receipt carried an action list other than a single function call
    #[error("receipt {index} must carry exactly one function call, got {actions} action(s)")]
    MalformedReceipt { index: u64, actions: usize },

    /// Core data model error
    #[error("core error: {0}")]
    Core(#[from] sim_core::CoreError),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for simulator operations
pub type VmResult<T> = Result<T, VmError>;
