//! Receipts emitted by contract executions

use crate::types::{AccountId, Balance, Gas};
use serde::{Deserialize, Serialize};

/// A deferred contract call emitted as a side effect of an execution.
///
/// `receipt_indices` are local to the emitting outcome's receipt list: they
/// name the sibling receipts this one depends on. The scheduler renumbers
/// them into globally unique indices at ingest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_indices: Vec<u64>,
    pub receiver_id: AccountId,
    pub actions: Vec<Action>,
}

impl Receipt {
    /// Return the single `FunctionCall` action, if this receipt is well-formed
    pub fn function_call(&self) -> Option<&Action> {
        match self.actions.as_slice() {
            [action @ Action::FunctionCall { .. }] => Some(action),
            _ => None,
        }
    }
}

/// An action carried by a receipt.
///
/// The simulator only schedules `FunctionCall` actions; the other variants
/// exist on the wire and are rejected as malformed when scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Action {
    CreateAccount,
    DeployContract {
        code: Vec<u8>,
    },
    FunctionCall {
        method_name: String,
        args: String,
        gas: Gas,
        #[serde(with = "crate::serialize::u128_dec_format")]
        deposit: Balance,
    },
    Transfer {
        #[serde(with = "crate::serialize::u128_dec_format")]
        deposit: Balance,
    },
}
