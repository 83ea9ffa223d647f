//! Single-step execution
//!
//! A step is one invocation of the VM runner against one account, method,
//! input, and state. Successful non-view steps commit the resulting balance,
//! state, and storage usage back onto the callee; failed or view steps leave
//! the account untouched.

use crate::account::AccountStore;
use crate::config::SimulatorConfig;
use crate::context::{build_context, CallContext, ContextOverrides};
use crate::driver::{DriverRequest, VmDriver};
use crate::VmResult;
use sim_core::{decode_state, AccountId, Outcome, PromiseResult, Receipt, ReturnData, State};
use tracing::debug;

/// Result of one step, immutable after return
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The execution outcome
    pub outcome: Outcome,
    /// Follow-on calls emitted by the execution
    pub receipts: Vec<Receipt>,
    /// Decoded post-execution state, for observers
    pub state: State,
}

/// Executes individual steps against the account store through the driver
pub(crate) struct StepExecutor<'a> {
    pub accounts: &'a mut AccountStore,
    pub driver: &'a dyn VmDriver,
    pub config: &'a SimulatorConfig,
    pub overrides: &'a ContextOverrides,
}

impl StepExecutor<'_> {
    /// Execute one mutating method call with no dependencies
    pub fn call_step(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
        call: &CallContext,
    ) -> VmResult<StepResult> {
        self.execute(account_id, method_name, input, call, vec![], vec![], false)
    }

    /// Execute one view call; commits are suppressed regardless of outcome
    pub fn view_step(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
    ) -> VmResult<StepResult> {
        self.execute(
            account_id,
            method_name,
            input,
            &CallContext::default(),
            vec![],
            vec![],
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        account_id: &str,
        method_name: &str,
        input: &str,
        call: &CallContext,
        input_data: Vec<PromiseResult>,
        output_data_receivers: Vec<AccountId>,
        is_view: bool,
    ) -> VmResult<StepResult> {
        let context = build_context(
            self.accounts,
            self.config,
            self.overrides,
            account_id,
            input,
            call,
            input_data.clone(),
            output_data_receivers,
            is_view,
        )?;

        let account = self.accounts.get(account_id)?;
        let pre_balance = account.balance;
        let pre_storage_usage = account.storage_usage;
        let request = DriverRequest {
            context,
            method_name: method_name.to_string(),
            input: input.to_string(),
            contract_file: account.contract_file.clone(),
            state: account.encoded_state().clone(),
            promise_results: input_data,
        };

        debug!(account = %account_id, method = %method_name, is_view, "executing step");
        let response = self.driver.run(&request)?;

        // A runner that fails outright may omit the outcome; synthesize one
        // that snapshots the pre-call account so the failure stays observable
        let mut outcome = match response.outcome {
            Some(outcome) => outcome,
            None if response.err.is_some() => Outcome {
                logs: vec![],
                balance: pre_balance,
                storage_usage: pre_storage_usage,
                return_data: ReturnData::None,
                err: None,
            },
            None => {
                return Err(crate::VmError::MalformedOutcome(
                    "runner reported neither an outcome nor an error".to_string(),
                ))
            }
        };
        if outcome.err.is_none() {
            outcome.err = response.err;
        }

        if !is_view && !outcome.is_failure() {
            let account = self.accounts.get_mut(account_id)?;
            account.commit(outcome.balance, response.state.clone(), outcome.storage_usage);
            debug!(
                account = %account_id,
                balance = %outcome.balance,
                storage_usage = outcome.storage_usage,
                "committed step"
            );
        }

        Ok(StepResult {
            outcome,
            receipts: response.receipts,
            state: decode_state(&response.state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{respond_err, respond_value, ScriptedDriver};
    use sim_core::encode_state;

    fn executor_parts() -> (AccountStore, SimulatorConfig, ContextOverrides) {
        let config = SimulatorConfig::default();
        let mut accounts = AccountStore::new(config.default_balance);
        accounts.create("alice", None).unwrap();
        (accounts, config, ContextOverrides::default())
    }

    #[test]
    fn test_successful_call_commits() {
        let (mut accounts, config, overrides) = executor_parts();
        let mut state = State::new();
        state.insert("counter".to_string(), "1".to_string());
        let post_state = encode_state(&state);

        let driver = ScriptedDriver::new().on("alice", "inc", move |req| {
            respond_value("1", post_state.clone(), req.context.account_balance - 100)
        });

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor
            .call_step("alice", "inc", "{}", &CallContext::default())
            .unwrap();

        assert!(!result.outcome.is_failure());
        assert_eq!(result.state.get("counter").map(String::as_str), Some("1"));

        let account = accounts.get("alice").unwrap();
        assert_eq!(account.balance, config.default_balance - 100);
        assert_eq!(
            account.state().unwrap().get("counter").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_failed_call_does_not_commit() {
        let (mut accounts, config, overrides) = executor_parts();
        let mut state = State::new();
        state.insert("poison".to_string(), "1".to_string());
        let post_state = encode_state(&state);

        let driver = ScriptedDriver::new().on("alice", "explode", move |req| {
            let mut response = respond_err("boom", req.context.account_balance);
            response.state = post_state.clone();
            response
        });

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor
            .call_step("alice", "explode", "{}", &CallContext::default())
            .unwrap();

        assert!(result.outcome.is_failure());

        // The account is byte-identical to its pre-call state
        let account = accounts.get("alice").unwrap();
        assert_eq!(account.balance, config.default_balance);
        assert!(account.state().unwrap().is_empty());
        assert_eq!(account.storage_usage, 60);
    }

    #[test]
    fn test_view_call_does_not_commit() {
        let (mut accounts, config, overrides) = executor_parts();
        let mut state = State::new();
        state.insert("leak".to_string(), "1".to_string());
        let post_state = encode_state(&state);

        let driver = ScriptedDriver::new().on("alice", "get", move |req| {
            assert!(req.context.is_view);
            respond_value("7", post_state.clone(), req.context.account_balance)
        });

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor.view_step("alice", "get", "{}").unwrap();

        assert_eq!(result.outcome.return_data.as_value(), Some("7"));
        assert!(accounts.get("alice").unwrap().state().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_is_synthesized_from_top_level_error() {
        let (mut accounts, config, overrides) = executor_parts();
        let driver = ScriptedDriver::new().on("alice", "trap", |_req| crate::DriverResponse {
            outcome: None,
            receipts: vec![],
            state: Default::default(),
            err: Some(serde_json::json!("deserialization failed")),
        });

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor
            .call_step("alice", "trap", "{}", &CallContext::default())
            .unwrap();

        assert!(result.outcome.is_failure());
        // The synthesized outcome snapshots the untouched account
        assert_eq!(result.outcome.balance, config.default_balance);
        assert_eq!(accounts.get("alice").unwrap().balance, config.default_balance);
    }

    #[test]
    fn test_empty_response_is_malformed() {
        let (mut accounts, config, overrides) = executor_parts();
        let driver = ScriptedDriver::new().on("alice", "void", |_req| crate::DriverResponse {
            outcome: None,
            receipts: vec![],
            state: Default::default(),
            err: None,
        });

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor.call_step("alice", "void", "{}", &CallContext::default());
        assert!(matches!(result, Err(crate::VmError::MalformedOutcome(_))));
    }

    #[test]
    fn test_unknown_account_fails_before_driver() {
        let (mut accounts, config, overrides) = executor_parts();
        let driver = ScriptedDriver::new();

        let mut executor = StepExecutor {
            accounts: &mut accounts,
            driver: &driver,
            config: &config,
            overrides: &overrides,
        };
        let result = executor.call_step("nobody", "echo", "{}", &CallContext::default());

        assert!(matches!(result, Err(crate::VmError::UnknownAccount(_))));
        assert_eq!(driver.invocations(), 0);
        assert!(!accounts.contains("nobody"));
    }
}
