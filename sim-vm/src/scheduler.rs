//! Promise scheduler
//!
//! Drives the transitive closure of receipts from a root call to quiescence.
//! Each executed step may emit receipts (new calls, with indices local to its
//! own outcome) and data dependencies between them; the scheduler renumbers
//! receipt-local indices into globally unique ones, materializes results
//! under the data ids dependents wait on, and chases the final return index
//! across callback forwards.

use crate::executor::{StepExecutor, StepResult};
use crate::VmResult;
use crate::{CallContext, VmError};
use serde::Serialize;
use sim_core::{
    AccountId, Action, Balance, CallIndex, DataId, Gas, Outcome, PromiseResult, Receipt,
    ReturnData,
};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, trace, warn};

/// A call waiting in the scheduler's queue
#[derive(Debug, Clone, Serialize)]
pub struct PendingCall {
    /// Globally unique index of this call within the session
    pub index: CallIndex,
    pub account_id: AccountId,
    pub method_name: String,
    pub input: String,
    pub signer_account_id: AccountId,
    pub predecessor_account_id: AccountId,
    pub gas: Gas,
    #[serde(with = "sim_core::serialize::u128_dec_format")]
    pub deposit: Balance,
    /// Data ids this call consumes; all must resolve before it executes
    pub input_data: Vec<DataId>,
}

/// Where one call's result must be delivered
#[derive(Debug, Clone)]
struct DataReceiver {
    account_id: AccountId,
    data_id: DataId,
}

/// Result of driving one root call to quiescence
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Global index of the caller-visible final step
    pub return_index: CallIndex,
    /// Final return value parsed as JSON, when the final step returned one
    pub value: Option<serde_json::Value>,
    /// Contract-level error of the final step, if any
    pub err: Option<serde_json::Value>,
    /// Outcome of the final step
    pub outcome: Outcome,
    /// Every call scheduled during the session, by global index
    pub calls: HashMap<CallIndex, PendingCall>,
    /// Every step result, by global index
    pub results: HashMap<CallIndex, StepResult>,
}

impl SessionResult {
    pub fn is_failure(&self) -> bool {
        self.err.is_some()
    }

    /// All log lines of the session, in execution order of the steps
    pub fn logs(&self) -> Vec<String> {
        let mut indices: Vec<_> = self.results.keys().copied().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|index| self.results.get(&index))
            .flat_map(|result| result.outcome.logs.iter().cloned())
            .collect()
    }
}

/// Work-loop state for one root call
pub(crate) struct PromiseScheduler<'a, 'b> {
    executor: &'b mut StepExecutor<'a>,
    queue: VecDeque<PendingCall>,
    calls: HashMap<CallIndex, PendingCall>,
    results: HashMap<CallIndex, StepResult>,
    all_input_data: HashMap<DataId, PromiseResult>,
    all_output_data: HashMap<CallIndex, Vec<DataReceiver>>,
    num_receipts: u64,
    num_data: u64,
    return_index: CallIndex,
}

impl<'a, 'b> PromiseScheduler<'a, 'b> {
    pub fn new(executor: &'b mut StepExecutor<'a>) -> Self {
        Self {
            executor,
            queue: VecDeque::new(),
            calls: HashMap::new(),
            results: HashMap::new(),
            all_input_data: HashMap::new(),
            all_output_data: HashMap::new(),
            // The root call occupies index 0
            num_receipts: 1,
            num_data: 0,
            return_index: 0,
        }
    }

    /// Drive the root call and everything it spawns until the queue drains
    pub fn run(mut self, root: PendingCall) -> VmResult<SessionResult> {
        self.queue.push_back(root);

        while let Some(call) = self.queue.pop_front() {
            // Dependency gating: a call with unresolved inputs yields its
            // turn by cycling to the back of the queue
            if !call
                .input_data
                .iter()
                .all(|data_id| self.all_input_data.contains_key(data_id))
            {
                trace!(index = call.index, "dependencies unresolved, re-enqueueing");
                self.queue.push_back(call);
                continue;
            }
            let input_data: Vec<PromiseResult> = call
                .input_data
                .iter()
                .map(|data_id| self.all_input_data[data_id].clone())
                .collect();

            self.execute_call(call, input_data)?;
        }

        self.finish()
    }

    fn execute_call(
        &mut self,
        call: PendingCall,
        input_data: Vec<PromiseResult>,
    ) -> VmResult<()> {
        let output_data = self
            .all_output_data
            .get(&call.index)
            .cloned()
            .unwrap_or_default();
        let receivers: Vec<AccountId> = output_data
            .iter()
            .map(|receiver| receiver.account_id.clone())
            .collect();

        self.calls.insert(call.index, call.clone());

        let context = CallContext {
            signer_account_id: Some(call.signer_account_id.clone()),
            predecessor_account_id: Some(call.predecessor_account_id.clone()),
            attached_deposit: call.deposit,
            prepaid_gas: Some(call.gas),
        };
        debug!(
            index = call.index,
            account = %call.account_id,
            method = %call.method_name,
            "executing call"
        );
        let result = self.executor.execute(
            &call.account_id,
            &call.method_name,
            &call.input,
            &context,
            input_data,
            receivers,
            false,
        )?;

        if result.outcome.is_failure() {
            // Dependents still run; they observe the failure in their inputs
            warn!(index = call.index, account = %call.account_id, "call failed");
            for receiver in &output_data {
                self.all_input_data
                    .insert(receiver.data_id, PromiseResult::Failed);
            }
        } else {
            self.dispatch_return(&call, &result.outcome.return_data, &output_data);
            self.expand_receipts(&call, &result.receipts)?;
        }

        self.results.insert(call.index, result);
        Ok(())
    }

    /// Deliver a successful call's return to everything awaiting it
    fn dispatch_return(
        &mut self,
        call: &PendingCall,
        return_data: &ReturnData,
        output_data: &[DataReceiver],
    ) {
        match return_data {
            ReturnData::Value(value) => {
                let payload = value.as_bytes().to_vec();
                for receiver in output_data {
                    self.all_input_data
                        .insert(receiver.data_id, PromiseResult::Successful(payload.clone()));
                }
            }
            // A bare return carries no payload but still resolves the promise
            ReturnData::None => {
                for receiver in output_data {
                    self.all_input_data
                        .insert(receiver.data_id, PromiseResult::Successful(Vec::new()));
                }
            }
            ReturnData::ReceiptIndex(local_index) => {
                // The real answer follows the forwarded call: re-target our
                // awaiters at its global index
                let forwarded = local_index + self.num_receipts;
                self.all_output_data
                    .entry(forwarded)
                    .or_default()
                    .extend(output_data.iter().cloned());
                if self.return_index == call.index {
                    debug!(from = call.index, to = forwarded, "return index advanced");
                    self.return_index = forwarded;
                }
            }
        }
    }

    /// Renumber and enqueue the receipts of one successful outcome
    fn expand_receipts(&mut self, call: &PendingCall, receipts: &[Receipt]) -> VmResult<()> {
        for (local_index, receipt) in receipts.iter().enumerate() {
            let local_index = local_index as u64;
            let (method_name, args, gas, deposit) = match receipt.actions.as_slice() {
                [Action::FunctionCall {
                    method_name,
                    args,
                    gas,
                    deposit,
                }] => (method_name.clone(), args.clone(), *gas, *deposit),
                actions => {
                    return Err(VmError::MalformedReceipt {
                        index: local_index,
                        actions: actions.len(),
                    })
                }
            };

            // One fresh data id per dependency edge; the producer at the
            // adjusted global index must materialize its result under it
            let mut input_data = Vec::with_capacity(receipt.receipt_indices.len());
            for &dependency in &receipt.receipt_indices {
                let data_id = self.num_data;
                self.num_data += 1;
                self.all_output_data
                    .entry(dependency + self.num_receipts)
                    .or_default()
                    .push(DataReceiver {
                        account_id: receipt.receiver_id.clone(),
                        data_id,
                    });
                input_data.push(data_id);
            }

            let pending = PendingCall {
                index: local_index + self.num_receipts,
                account_id: receipt.receiver_id.clone(),
                method_name,
                input: args,
                signer_account_id: call.signer_account_id.clone(),
                predecessor_account_id: call.account_id.clone(),
                gas,
                deposit,
                input_data,
            };
            debug!(
                index = pending.index,
                account = %pending.account_id,
                method = %pending.method_name,
                dependencies = pending.input_data.len(),
                "enqueued receipt"
            );
            self.queue.push_back(pending);
        }

        self.num_receipts += receipts.len() as u64;
        Ok(())
    }

    fn finish(self) -> VmResult<SessionResult> {
        let final_result = self.results.get(&self.return_index).ok_or_else(|| {
            VmError::MalformedOutcome(format!(
                "final return index {} was never executed",
                self.return_index
            ))
        })?;

        let outcome = final_result.outcome.clone();
        let value = outcome.return_data.as_value().map(|raw| {
            serde_json::from_str(raw)
                .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
        });
        let err = outcome.err.clone();

        info!(
            calls = self.calls.len(),
            return_index = self.return_index,
            failed = err.is_some(),
            "session complete"
        );

        Ok(SessionResult {
            return_index: self.return_index,
            value,
            err,
            outcome,
            calls: self.calls,
            results: self.results,
        })
    }
}
