//! In-process scripted driver for tests

use crate::driver::{DriverRequest, DriverResponse, VmDriver};
use crate::VmResult;
use sim_core::{Action, Balance, EncodedState, Outcome, Receipt, ReturnData};
use std::cell::RefCell;
use std::collections::HashMap;

type Handler = Box<dyn Fn(&DriverRequest) -> DriverResponse>;

/// Driver that dispatches on (account, method) to closures instead of
/// spawning a runner process
#[derive(Default)]
pub(crate) struct ScriptedDriver {
    handlers: HashMap<(String, String), Handler>,
    invoked: RefCell<Vec<(String, String)>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        account: &str,
        method: &str,
        handler: impl Fn(&DriverRequest) -> DriverResponse + 'static,
    ) -> Self {
        self.handlers
            .insert((account.to_string(), method.to_string()), Box::new(handler));
        self
    }

    pub fn invocations(&self) -> usize {
        self.invoked.borrow().len()
    }

    /// (account, method) pairs in the order they were executed
    pub fn invoked(&self) -> Vec<(String, String)> {
        self.invoked.borrow().clone()
    }
}

impl VmDriver for ScriptedDriver {
    fn run(&self, request: &DriverRequest) -> VmResult<DriverResponse> {
        let key = (
            request.context.current_account_id.clone(),
            request.method_name.clone(),
        );
        self.invoked.borrow_mut().push(key.clone());
        let handler = self
            .handlers
            .get(&key)
            .unwrap_or_else(|| panic!("no script for {}.{}", key.0, key.1));
        Ok(handler(request))
    }
}

pub(crate) fn respond_with(
    return_data: ReturnData,
    receipts: Vec<Receipt>,
    state: EncodedState,
    balance: Balance,
) -> DriverResponse {
    DriverResponse {
        outcome: Some(Outcome {
            logs: vec![],
            balance,
            storage_usage: 60,
            return_data,
            err: None,
        }),
        receipts,
        state,
        err: None,
    }
}

pub(crate) fn respond_value(value: &str, state: EncodedState, balance: Balance) -> DriverResponse {
    respond_with(ReturnData::Value(value.to_string()), vec![], state, balance)
}

pub(crate) fn respond_err(message: &str, balance: Balance) -> DriverResponse {
    DriverResponse {
        outcome: Some(Outcome {
            logs: vec![],
            balance,
            storage_usage: 60,
            return_data: ReturnData::None,
            err: Some(serde_json::json!({ "FunctionCallError": message })),
        }),
        receipts: vec![],
        state: EncodedState::new(),
        err: None,
    }
}

pub(crate) fn receipt(receiver: &str, method: &str, args: &str, indices: Vec<u64>) -> Receipt {
    Receipt {
        receipt_indices: indices,
        receiver_id: receiver.to_string(),
        actions: vec![Action::FunctionCall {
            method_name: method.to_string(),
            args: args.to_string(),
            gas: 100,
            deposit: 0,
        }],
    }
}
