//! The operator base: lazy execution over up to two input operators, with a
//! cached, write-once output table.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{Error, StorageResult};
use crate::table::Table;

/// Anything that can be chained as an operator's input: produces a `Table`
/// once `execute()` has been called on it.
///
/// Execution order is caller-driven: an operator's inputs must already have
/// been executed before it is executed, or behavior is undefined (no
/// automatic pull-based scheduling is implemented here).
pub trait Operator: Send + Sync {
    fn execute(&self) -> StorageResult<()>;

    /// The cached output table. Fails with [`Error::NotYetExecuted`] if
    /// `execute()` has not yet run.
    fn output(&self) -> StorageResult<Arc<Table>>;
}

/// Shared plumbing for concrete operators: up to two input handles and a
/// cached output, populated exactly once.
///
/// A concrete operator embeds an `OperatorBase` and implements [`Operator`]
/// by calling its own body once and handing the result to [`OperatorBase::set_output`].
pub struct OperatorBase {
    left_input: Option<Arc<dyn Operator>>,
    right_input: Option<Arc<dyn Operator>>,
    output: OnceCell<Arc<Table>>,
}

impl OperatorBase {
    pub fn new(left_input: Option<Arc<dyn Operator>>, right_input: Option<Arc<dyn Operator>>) -> Self {
        Self {
            left_input,
            right_input,
            output: OnceCell::new(),
        }
    }

    pub fn with_left(left_input: Arc<dyn Operator>) -> Self {
        Self::new(Some(left_input), None)
    }

    pub fn left_input_table(&self) -> StorageResult<Arc<Table>> {
        self.left_input
            .as_ref()
            .expect("operator constructed without a left input")
            .output()
    }

    pub fn right_input_table(&self) -> StorageResult<Arc<Table>> {
        self.right_input
            .as_ref()
            .expect("operator constructed without a right input")
            .output()
    }

    pub fn output(&self) -> StorageResult<Arc<Table>> {
        self.output.get().cloned().ok_or(Error::NotYetExecuted)
    }

    /// Records the result of the operator-specific execution body. A second
    /// call is a no-op: `execute()` is specified to run the body exactly once.
    pub fn set_output(&self, table: Arc<Table>) {
        let _ = self.output.set(table);
    }

    pub fn has_executed(&self) -> bool {
        self.output.get().is_some()
    }
}
