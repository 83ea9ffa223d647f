//! Execution context handed to the VM runner

use crate::types::{
    AccountId, Balance, BlockNumber, EpochHeight, Gas, PromiseResult, StorageUsage,
};
use serde::{Deserialize, Serialize};

/// Context for one contract execution.
///
/// This is the complete input bundle serialized to the VM runner for a single
/// method invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VMContext {
    /// The account id of the contract being executed
    pub current_account_id: AccountId,
    /// The account id that signed the original transaction that led to this
    /// execution
    pub signer_account_id: AccountId,
    /// The public key that was used to sign the original transaction
    pub signer_account_pk: String,
    /// If this execution is the result of a cross-contract call or a callback
    /// then predecessor is the account that called it; otherwise it is equal
    /// to `signer_account_id`
    pub predecessor_account_id: AccountId,
    /// The input to the contract call, as a string
    pub input: String,
    /// Results of the calls this execution depends on, in dependency order
    pub input_data: Vec<PromiseResult>,
    /// Accounts awaiting this execution's result
    pub output_data_receivers: Vec<AccountId>,
    /// The current block height
    pub block_height: BlockNumber,
    /// The current block timestamp, in nanoseconds since the Unix epoch
    pub block_timestamp: u64,
    /// The current epoch height
    pub epoch_height: EpochHeight,
    /// The balance of the executing account, excluding `attached_deposit`
    #[serde(with = "crate::serialize::u128_dec_format")]
    pub account_balance: Balance,
    /// The balance of locked tokens on the executing account
    #[serde(with = "crate::serialize::u128_dec_format")]
    pub account_locked_balance: Balance,
    /// The executing account's storage usage before the call
    pub storage_usage: StorageUsage,
    /// The balance attached to the call, deposited before execution starts
    #[serde(with = "crate::serialize::u128_dec_format")]
    pub attached_deposit: Balance,
    /// The gas attached to the call
    pub prepaid_gas: Gas,
    /// Seed for in-contract randomness
    pub random_seed: String,
    /// Whether this execution runs in view mode; view executions may not
    /// mutate state
    pub is_view: bool,
}
