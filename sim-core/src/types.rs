//! Scalar types shared across the simulator

use serde::{Deserialize, Serialize};

/// Account identifier
pub type AccountId = String;

/// Token amount, in the smallest denomination
pub type Balance = u128;

/// Gas amount attached to a call
pub type Gas = u64;

/// Amount of storage consumed by an account, in bytes
pub type StorageUsage = u64;

/// Block height type
pub type BlockNumber = u64;

/// Epoch height type
pub type EpochHeight = u64;

/// Unique token naming a single promised value flowing between calls
pub type DataId = u64;

/// Globally unique index of a scheduled call within one session
pub type CallIndex = u64;

/// Materialized outcome of a prior receipt, delivered to a dependent call.
///
/// When a callback is attached to one or more contract calls, the execution
/// results of those calls are made available to the callback in this form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromiseResult {
    Successful(Vec<u8>),
    Failed,
}

impl PromiseResult {
    /// Check whether the promised call completed successfully
    pub fn is_ok(&self) -> bool {
        matches!(self, PromiseResult::Successful(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promise_result_wire_format() {
        let ok = PromiseResult::Successful(b"42".to_vec());
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"Successful":[52,50]}"#);

        let failed = PromiseResult::Failed;
        assert_eq!(serde_json::to_string(&failed).unwrap(), r#""Failed""#);
        assert!(!failed.is_ok());
        assert!(ok.is_ok());
    }
}
