//! Bridge to the standalone VM runner
//!
//! The runner is an opaque single-shot evaluator: it consumes a context,
//! input, contract binary, prior state, and resolved promise results, and
//! produces an outcome plus follow-on receipts. The production bridge spawns
//! it as a child process per execution; tests substitute an in-process
//! implementation through the same trait.

use crate::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use sim_core::{EncodedState, Outcome, PromiseResult, Receipt, VMContext};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// One VM runner invocation
#[derive(Debug, Clone, Serialize)]
pub struct DriverRequest {
    /// Full execution context
    pub context: VMContext,
    /// Method to invoke
    pub method_name: String,
    /// Method arguments as a string
    pub input: String,
    /// Contract binary; absent for calls into accounts with no contract
    pub contract_file: Option<PathBuf>,
    /// Current encoded account state
    pub state: EncodedState,
    /// Resolved dependency results, in dependency order
    pub promise_results: Vec<PromiseResult>,
}

/// The single JSON document the runner writes to stdout
#[derive(Debug, Clone, Deserialize)]
pub struct DriverResponse {
    /// Execution outcome; may be absent when the runner failed outright
    #[serde(default)]
    pub outcome: Option<Outcome>,
    /// Receipts describing follow-on contract calls
    #[serde(default)]
    pub receipts: Vec<Receipt>,
    /// Post-execution encoded state
    #[serde(default)]
    pub state: EncodedState,
    /// Contract-level error reported outside the outcome
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

/// Per-method evaluator the step executor drives.
///
/// Implementations are blocking and run each request to completion before
/// returning.
pub trait VmDriver {
    fn run(&self, request: &DriverRequest) -> VmResult<DriverResponse>;
}

/// Production driver: spawns the runner binary as a child process per step.
///
/// The child's lifetime is scoped to the step; stdout and stderr are fully
/// consumed before the step returns.
#[derive(Debug, Clone)]
pub struct StandaloneDriver {
    binary: PathBuf,
}

impl StandaloneDriver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl VmDriver for StandaloneDriver {
    fn run(&self, request: &DriverRequest) -> VmResult<DriverResponse> {
        let mut command = Command::new(&self.binary);
        command
            .arg("--context")
            .arg(serde_json::to_string(&request.context)?)
            .arg("--input")
            .arg(&request.input)
            .arg("--method-name")
            .arg(&request.method_name)
            .arg("--state")
            .arg(serde_json::to_string(&request.state)?);
        if let Some(contract_file) = &request.contract_file {
            command.arg("--wasm-file").arg(contract_file);
        }
        for result in &request.promise_results {
            command
                .arg("--promise-results")
                .arg(serde_json::to_string(result)?);
        }

        debug!(
            binary = %self.binary.display(),
            account = %request.context.current_account_id,
            method = %request.method_name,
            "spawning VM runner"
        );

        let output = command.output().map_err(VmError::VmLaunchFailed)?;
        if !output.status.success() {
            return Err(VmError::VmCrashed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| VmError::MalformedOutcome(e.to_string()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use sim_core::ReturnData;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("runner.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn request() -> DriverRequest {
        DriverRequest {
            context: VMContext {
                current_account_id: "alice".to_string(),
                signer_account_id: "alice".to_string(),
                signer_account_pk: "key".to_string(),
                predecessor_account_id: "alice".to_string(),
                input: "{}".to_string(),
                input_data: vec![],
                output_data_receivers: vec![],
                block_height: 1,
                block_timestamp: 0,
                epoch_height: 0,
                account_balance: 1000,
                account_locked_balance: 0,
                storage_usage: 60,
                attached_deposit: 0,
                prepaid_gas: 100,
                random_seed: String::new(),
                is_view: false,
            },
            method_name: "echo".to_string(),
            input: "{}".to_string(),
            contract_file: None,
            state: EncodedState::new(),
            promise_results: vec![PromiseResult::Failed],
        }
    }

    #[test]
    fn test_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            r#"echo '{"outcome":{"logs":[],"balance":"1000","storage_usage":60,"return_data":"None"},"receipts":[],"state":{},"err":null}'"#,
        );

        let driver = StandaloneDriver::new(script);
        let response = driver.run(&request()).unwrap();
        let outcome = response.outcome.unwrap();
        assert_eq!(outcome.balance, 1000);
        assert_eq!(outcome.return_data, ReturnData::None);
        assert!(response.err.is_none());
        assert!(response.receipts.is_empty());
    }

    #[test]
    fn test_crash_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo 'link error' >&2; exit 3");

        let driver = StandaloneDriver::new(script);
        match driver.run(&request()) {
            Err(VmError::VmCrashed { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("link error"));
            }
            other => panic!("expected VmCrashed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_launch_failure() {
        let driver = StandaloneDriver::new("/no/such/runner-binary");
        assert!(matches!(
            driver.run(&request()),
            Err(VmError::VmLaunchFailed(_))
        ));
    }

    #[test]
    fn test_malformed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo 'not json at all'");

        let driver = StandaloneDriver::new(script);
        assert!(matches!(
            driver.run(&request()),
            Err(VmError::MalformedOutcome(_))
        ));
    }
}
