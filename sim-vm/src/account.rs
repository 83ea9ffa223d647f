//! Account model and store

use crate::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use sim_core::{
    decode_state, encode_state, signer_public_key, AccountId, Balance, EncodedState, State,
    StorageUsage,
};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::DEFAULT_STORAGE_USAGE;

/// A simulated account.
///
/// State is held in the encoded form the VM runner consumes; `state()`
/// exposes the decoded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable account identifier
    pub account_id: AccountId,
    /// Contract binary backing this account; absent for plain accounts
    pub contract_file: Option<PathBuf>,
    /// Signer public key, derived from the account id
    pub signer_key: String,
    /// Spendable balance
    #[serde(with = "sim_core::serialize::u128_dec_format")]
    pub balance: Balance,
    /// Locked balance
    #[serde(with = "sim_core::serialize::u128_dec_format")]
    pub locked_balance: Balance,
    /// Storage consumed by the account
    pub storage_usage: StorageUsage,
    state: EncodedState,
}

impl Account {
    fn new(account_id: &str, contract_file: Option<PathBuf>, balance: Balance) -> Self {
        Self {
            account_id: account_id.to_string(),
            contract_file,
            signer_key: signer_public_key(account_id),
            balance,
            locked_balance: 0,
            storage_usage: DEFAULT_STORAGE_USAGE,
            state: EncodedState::new(),
        }
    }

    /// Whether a contract binary backs this account
    pub fn has_contract(&self) -> bool {
        self.contract_file.is_some()
    }

    /// Decoded view of the persisted contract state
    pub fn state(&self) -> VmResult<State> {
        Ok(decode_state(&self.state)?)
    }

    /// Replace the persisted state with a decoded map
    pub fn set_state(&mut self, state: &State) {
        self.state = encode_state(state);
    }

    /// The persisted state in the runner-consumed form
    pub(crate) fn encoded_state(&self) -> &EncodedState {
        &self.state
    }

    /// Apply a successful non-view execution back onto the account
    pub(crate) fn commit(
        &mut self,
        balance: Balance,
        state: EncodedState,
        storage_usage: StorageUsage,
    ) {
        self.balance = balance;
        self.state = state;
        self.storage_usage = storage_usage;
    }

    /// Restore the account to its post-creation state
    pub(crate) fn reset(&mut self, balance: Balance) {
        self.balance = balance;
        self.locked_balance = 0;
        self.storage_usage = DEFAULT_STORAGE_USAGE;
        self.state.clear();
    }
}

/// Mapping from account identifier to account record
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: HashMap<AccountId, Account>,
    default_balance: Balance,
}

impl AccountStore {
    /// Create a new store seeding accounts with the given balance
    pub fn new(default_balance: Balance) -> Self {
        Self {
            accounts: HashMap::new(),
            default_balance,
        }
    }

    /// Explicitly create an account, optionally backed by a contract binary.
    ///
    /// Fails with `MissingContract` when the given path does not resolve to
    /// an existing file. Re-creating an existing id replaces the record.
    pub fn create(
        &mut self,
        account_id: &str,
        contract_file: Option<PathBuf>,
    ) -> VmResult<&Account> {
        if let Some(path) = &contract_file {
            if !path.exists() {
                return Err(VmError::MissingContract(path.clone()));
            }
        }
        let account = Account::new(account_id, contract_file, self.default_balance);
        self.accounts.insert(account_id.to_string(), account);
        Ok(&self.accounts[account_id])
    }

    /// Look up an account, failing with `UnknownAccount` when absent
    pub fn get(&self, account_id: &str) -> VmResult<&Account> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| VmError::UnknownAccount(account_id.to_string()))
    }

    /// Mutable lookup, failing with `UnknownAccount` when absent
    pub fn get_mut(&mut self, account_id: &str) -> VmResult<&mut Account> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| VmError::UnknownAccount(account_id.to_string()))
    }

    /// Look up an account, creating a plain one on first reference
    pub fn get_or_create(&mut self, account_id: &str) -> &mut Account {
        let default_balance = self.default_balance;
        self.accounts
            .entry(account_id.to_string())
            .or_insert_with(|| Account::new(account_id, None, default_balance))
    }

    /// Whether an account with this id exists
    pub fn contains(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    /// Restore every account to its post-creation state without removing any
    pub fn reset_all(&mut self) {
        let default_balance = self.default_balance;
        for account in self.accounts.values_mut() {
            account.reset(default_balance);
        }
    }

    /// Iterate over all accounts
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
