//! Context assembly
//!
//! Merges the caller-provided partial context with simulator-wide overrides
//! and per-account derived fields into a complete `VMContext`.

use crate::account::AccountStore;
use crate::config::SimulatorConfig;
use crate::VmResult;
use serde::{Deserialize, Serialize};
use sim_core::{
    AccountId, Balance, BlockNumber, EpochHeight, Gas, PromiseResult, VMContext,
};

/// Caller-provided slice of a context; missing fields fall back to the
/// assembly rules
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Defaults to the callee account id
    pub signer_account_id: Option<AccountId>,
    /// Defaults to the signer account id
    pub predecessor_account_id: Option<AccountId>,
    /// Deposit attached to the call
    pub attached_deposit: Balance,
    /// Defaults to the configured gas per call
    pub prepaid_gas: Option<Gas>,
}

/// Simulator-wide context overrides, set once via `Simulator::set_context`
/// and overlaid onto every assembled context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextOverrides {
    pub block_height: Option<BlockNumber>,
    pub block_timestamp: Option<u64>,
    pub epoch_height: Option<EpochHeight>,
    pub random_seed: Option<String>,
}

/// Assemble the complete context for one execution.
///
/// The callee must already exist; the signer account is created on demand so
/// its derived key can be read.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_context(
    accounts: &mut AccountStore,
    config: &SimulatorConfig,
    overrides: &ContextOverrides,
    current_account_id: &str,
    input: &str,
    call: &CallContext,
    input_data: Vec<PromiseResult>,
    output_data_receivers: Vec<AccountId>,
    is_view: bool,
) -> VmResult<VMContext> {
    // Validate the callee before touching the store: a defaulted signer must
    // not create the very account being looked up
    accounts.get(current_account_id)?;

    let signer_account_id = call
        .signer_account_id
        .clone()
        .unwrap_or_else(|| current_account_id.to_string());
    let predecessor_account_id = call
        .predecessor_account_id
        .clone()
        .unwrap_or_else(|| signer_account_id.clone());
    let signer_account_pk = accounts.get_or_create(&signer_account_id).signer_key.clone();

    let callee = accounts.get(current_account_id)?;

    Ok(VMContext {
        current_account_id: current_account_id.to_string(),
        signer_account_id,
        signer_account_pk,
        predecessor_account_id,
        input: input.to_string(),
        input_data,
        output_data_receivers,
        block_height: overrides.block_height.unwrap_or(1),
        block_timestamp: overrides.block_timestamp.unwrap_or(0),
        epoch_height: overrides.epoch_height.unwrap_or(0),
        account_balance: callee.balance,
        account_locked_balance: callee.locked_balance,
        storage_usage: callee.storage_usage,
        attached_deposit: call.attached_deposit,
        prepaid_gas: call.prepaid_gas.unwrap_or(config.default_gas),
        random_seed: overrides.random_seed.clone().unwrap_or_default(),
        is_view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::signer_public_key;

    fn fixture() -> (AccountStore, SimulatorConfig) {
        let config = SimulatorConfig::default();
        let mut accounts = AccountStore::new(config.default_balance);
        accounts.create("alice", None).unwrap();
        (accounts, config)
    }

    #[test]
    fn test_signer_and_predecessor_default_to_callee() {
        let (mut accounts, config) = fixture();
        let context = build_context(
            &mut accounts,
            &config,
            &ContextOverrides::default(),
            "alice",
            "{}",
            &CallContext::default(),
            vec![],
            vec![],
            false,
        )
        .unwrap();

        assert_eq!(context.signer_account_id, "alice");
        assert_eq!(context.predecessor_account_id, "alice");
        assert_eq!(context.signer_account_pk, signer_public_key("alice"));
        assert_eq!(context.prepaid_gas, config.default_gas);
    }

    #[test]
    fn test_predecessor_defaults_to_signer() {
        let (mut accounts, config) = fixture();
        let call = CallContext {
            signer_account_id: Some("carol".to_string()),
            ..Default::default()
        };
        let context = build_context(
            &mut accounts,
            &config,
            &ContextOverrides::default(),
            "alice",
            "{}",
            &call,
            vec![],
            vec![],
            false,
        )
        .unwrap();

        assert_eq!(context.signer_account_id, "carol");
        assert_eq!(context.predecessor_account_id, "carol");
        // The signer account was created on demand for its key
        assert_eq!(context.signer_account_pk, signer_public_key("carol"));
        assert!(accounts.contains("carol"));
    }

    #[test]
    fn test_balance_snapshot_comes_from_callee() {
        let (mut accounts, config) = fixture();
        accounts.get_mut("alice").unwrap().balance = 12345;
        accounts.get_mut("alice").unwrap().locked_balance = 11;
        accounts.get_mut("alice").unwrap().storage_usage = 90;

        let context = build_context(
            &mut accounts,
            &config,
            &ContextOverrides::default(),
            "alice",
            "{}",
            &CallContext::default(),
            vec![],
            vec![],
            true,
        )
        .unwrap();

        assert_eq!(context.account_balance, 12345);
        assert_eq!(context.account_locked_balance, 11);
        assert_eq!(context.storage_usage, 90);
        assert!(context.is_view);
    }

    #[test]
    fn test_overrides_are_overlaid() {
        let (mut accounts, config) = fixture();
        let overrides = ContextOverrides {
            block_height: Some(42),
            block_timestamp: Some(1_600_000_000_000),
            epoch_height: Some(3),
            random_seed: Some("seed".to_string()),
        };
        let context = build_context(
            &mut accounts,
            &config,
            &overrides,
            "alice",
            "{}",
            &CallContext::default(),
            vec![],
            vec![],
            false,
        )
        .unwrap();

        assert_eq!(context.block_height, 42);
        assert_eq!(context.block_timestamp, 1_600_000_000_000);
        assert_eq!(context.epoch_height, 3);
        assert_eq!(context.random_seed, "seed");
    }

    #[test]
    fn test_unknown_callee_fails() {
        let (mut accounts, config) = fixture();
        let result = build_context(
            &mut accounts,
            &config,
            &ContextOverrides::default(),
            "nobody",
            "{}",
            &CallContext::default(),
            vec![],
            vec![],
            false,
        );
        assert!(matches!(result, Err(crate::VmError::UnknownAccount(_))));
    }
}
