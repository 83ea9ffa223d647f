//! Simulator facade
//!
//! Owns the account store, the configuration, the VM driver, and the
//! simulator-wide context overrides. Multiple simulators can coexist; each
//! owns its own state.

use crate::account::{Account, AccountStore};
use crate::config::SimulatorConfig;
use crate::context::{CallContext, ContextOverrides};
use crate::driver::{StandaloneDriver, VmDriver};
use crate::executor::{StepExecutor, StepResult};
use crate::scheduler::{PendingCall, PromiseScheduler, SessionResult};
use crate::VmResult;
use sim_core::ReturnData;
use std::path::PathBuf;
use tracing::debug;

/// Result of a view call
#[derive(Debug, Clone)]
pub struct ViewResult {
    /// The return value parsed as JSON, when the method returned one
    pub value: Option<serde_json::Value>,
    /// Log lines emitted during the call
    pub logs: Vec<String>,
    /// Contract-level error, if the view failed
    pub err: Option<serde_json::Value>,
}

/// Local simulator for a promise-oriented contract execution environment
pub struct Simulator {
    config: SimulatorConfig,
    accounts: AccountStore,
    driver: Box<dyn VmDriver>,
    overrides: ContextOverrides,
}

impl Simulator {
    /// Create a simulator driving the configured standalone runner binary
    pub fn new(config: SimulatorConfig) -> Self {
        let driver = Box::new(StandaloneDriver::new(config.runner_binary.clone()));
        Self::with_driver(config, driver)
    }

    /// Create a simulator with a custom driver implementation
    pub fn with_driver(config: SimulatorConfig, driver: Box<dyn VmDriver>) -> Self {
        // The runner protocol relies on POSIX process semantics
        if cfg!(windows) {
            eprintln!("the simulator drives a POSIX subprocess runner and cannot run on Windows");
            std::process::exit(1);
        }
        Self {
            accounts: AccountStore::new(config.default_balance),
            config,
            driver,
            overrides: ContextOverrides::default(),
        }
    }

    /// Explicitly create an account, optionally backed by a contract binary
    pub fn new_account(
        &mut self,
        account_id: &str,
        contract_file: Option<PathBuf>,
    ) -> VmResult<&Account> {
        debug!(account = %account_id, contract = contract_file.is_some(), "creating account");
        self.accounts.create(account_id, contract_file)
    }

    /// Look up an account
    pub fn account(&self, account_id: &str) -> VmResult<&Account> {
        self.accounts.get(account_id)
    }

    /// Look up an account, creating a plain one on first reference
    pub fn get_or_create(&mut self, account_id: &str) -> &Account {
        self.accounts.get_or_create(account_id)
    }

    /// Restore every account to its post-creation state
    pub fn reset_all(&mut self) {
        self.accounts.reset_all();
    }

    /// Set simulator-wide context overrides applied to every execution
    pub fn set_context(&mut self, overrides: ContextOverrides) {
        self.overrides = overrides;
    }

    /// Execute one method call and drive its promise graph to completion
    pub fn call(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
    ) -> VmResult<SessionResult> {
        self.call_with(account_id, method_name, input, CallContext::default())
    }

    /// As `call`, with an explicit partial context
    pub fn call_with(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
        call: CallContext,
    ) -> VmResult<SessionResult> {
        let signer_account_id = call
            .signer_account_id
            .clone()
            .unwrap_or_else(|| account_id.to_string());
        let predecessor_account_id = call
            .predecessor_account_id
            .clone()
            .unwrap_or_else(|| signer_account_id.clone());
        let root = PendingCall {
            index: 0,
            account_id: account_id.to_string(),
            method_name: method_name.to_string(),
            input: input.to_string(),
            signer_account_id,
            predecessor_account_id,
            gas: call.prepaid_gas.unwrap_or(self.config.default_gas),
            deposit: call.attached_deposit,
            input_data: vec![],
        };

        let mut executor = StepExecutor {
            accounts: &mut self.accounts,
            driver: self.driver.as_ref(),
            config: &self.config,
            overrides: &self.overrides,
        };
        PromiseScheduler::new(&mut executor).run(root)
    }

    /// Execute exactly one step, without driving its receipts
    pub fn call_step(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
        call: &CallContext,
    ) -> VmResult<StepResult> {
        let mut executor = StepExecutor {
            accounts: &mut self.accounts,
            driver: self.driver.as_ref(),
            config: &self.config,
            overrides: &self.overrides,
        };
        executor.call_step(account_id, method_name, input, call)
    }

    /// Execute a side-effect-free view call
    pub fn view(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
    ) -> VmResult<ViewResult> {
        let mut executor = StepExecutor {
            accounts: &mut self.accounts,
            driver: self.driver.as_ref(),
            config: &self.config,
            overrides: &self.overrides,
        };
        let result = executor.view_step(account_id, method_name, input)?;

        let value = match &result.outcome.return_data {
            ReturnData::Value(raw) => Some(
                serde_json::from_str(raw)
                    .unwrap_or_else(|_| serde_json::Value::String(raw.clone())),
            ),
            _ => None,
        };
        Ok(ViewResult {
            value,
            logs: result.outcome.logs,
            err: result.outcome.err,
        })
    }
}
