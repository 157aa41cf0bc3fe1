//! Executing a build plan against a runtime.

use super::plan::{BuildPlan, Operation};
use std::fmt;
use thiserror::Error;

/// Failure status reported by a runtime call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeStatus(pub u32);

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Sequence a plan step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Materializing the graph.
    Init,
    /// Tearing it down.
    Finalize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "init",
            Phase::Finalize => "finalize",
        })
    }
}

/// A runtime call failed; nothing after it was executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} step {step} ({operation}) failed with status {status}")]
pub struct RuntimeError {
    /// Sequence being executed.
    pub phase: Phase,
    /// Zero-based position of the failing operation.
    pub step: usize,
    /// The failing operation.
    pub operation: Operation,
    /// Status reported by the runtime.
    pub status: RuntimeStatus,
}

/// Something that can perform plan operations.
pub trait Runtime {
    /// Perform one operation.
    fn execute(&mut self, operation: &Operation) -> Result<(), RuntimeStatus>;
}

impl<R: Runtime + ?Sized> Runtime for &mut R {
    fn execute(&mut self, operation: &Operation) -> Result<(), RuntimeStatus> {
        (**self).execute(operation)
    }
}

/// Run the init sequence, stopping at the first failure.
pub fn run_init<R: Runtime>(plan: &BuildPlan, runtime: R) -> Result<(), RuntimeError> {
    run(Phase::Init, &plan.init, runtime)
}

/// Run the finalize sequence, stopping at the first failure.
pub fn run_finalize<R: Runtime>(plan: &BuildPlan, runtime: R) -> Result<(), RuntimeError> {
    run(Phase::Finalize, &plan.finalize, runtime)
}

fn run<R: Runtime>(phase: Phase, operations: &[Operation], mut runtime: R) -> Result<(), RuntimeError> {
    for (step, operation) in operations.iter().enumerate() {
        tracing::trace!(%phase, step, %operation, "executing");
        if let Err(status) = runtime.execute(operation) {
            tracing::warn!(%phase, step, %operation, %status, "runtime call failed");
            return Err(RuntimeError {
                phase,
                step,
                operation: operation.clone(),
                status,
            });
        }
    }
    tracing::debug!(%phase, steps = operations.len(), "sequence complete");
    Ok(())
}

/// Runtime that records operations instead of performing them.
///
/// Useful for dry runs. It can be told to fail at a given call.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    executed: Vec<Operation>,
    fail_at: Option<(usize, RuntimeStatus)>,
}

impl RecordingRuntime {
    /// Create a runtime that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with zero-based index `call` (counted across all sequences).
    pub fn failing_at(call: usize, status: RuntimeStatus) -> Self {
        Self {
            executed: Vec::new(),
            fail_at: Some((call, status)),
        }
    }

    /// Operations executed successfully so far.
    pub fn executed(&self) -> &[Operation] {
        &self.executed
    }
}

impl Runtime for RecordingRuntime {
    fn execute(&mut self, operation: &Operation) -> Result<(), RuntimeStatus> {
        if let Some((call, status)) = self.fail_at
            && call == self.executed.len()
        {
            return Err(status);
        }
        self.executed.push(operation.clone());
        Ok(())
    }
}
