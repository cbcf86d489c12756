//! # Task abstraction: the uniform, chainable unit of work.
//!
//! A [`Task`] wraps any object exposing the single-call execution contract
//! ([`Run`]) behind a stable name and an optional link to the next task.
//! Heterogeneous plugin shapes (pull-based observers, push-based translators,
//! pattern-matched reporters) all erase to this one contract, so pipelines are
//! built by composition regardless of the concrete plugin.
//!
//! ## Chaining
//! ```text
//! a.then(b).then(c):   [a] ─► [b] ─► [c]
//! ```
//! `then` is left-associative and appends at the tail; execution walks the
//! chain in declaration order, each step seeing the prior step's output. A
//! failing step stops the walk and propagates its error — no step is skipped,
//! no step after a failure runs.
//!
//! Tasks are immutable; `then` rebuilds the chain spine and shares the steps,
//! so a task can safely appear in several pipelines and groups at once.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::tasks::record::Record;

/// Shared handle to a task, cheap to clone and safe to store in groups.
pub type TaskRef = Arc<Task>;

/// # The single-call execution contract.
///
/// Implemented by every capability adapter and by the bus's emit stage.
/// A step receives the previous step's output and produces the next input.
#[async_trait]
pub trait Run: Send + Sync + 'static {
    /// Executes one step, transforming the record.
    async fn run(&self, record: Record) -> Result<Record, ExecError>;
}

/// A named, chainable unit of asynchronous work.
pub struct Task {
    name: Cow<'static, str>,
    step: Arc<dyn Run>,
    next: Option<TaskRef>,
}

impl Task {
    /// Wraps a step behind a name, with no chain.
    pub fn new(name: impl Into<Cow<'static, str>>, step: Arc<dyn Run>) -> TaskRef {
        Arc::new(Self {
            name: name.into(),
            step,
            next: None,
        })
    }

    /// Returns the task's diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a new task that runs the receiver's chain, then feeds the
    /// result into `next`.
    ///
    /// The receiver is untouched; only the chain spine is rebuilt.
    pub fn then(&self, next: TaskRef) -> TaskRef {
        let linked = match &self.next {
            None => Some(next),
            Some(tail) => Some(tail.then(next)),
        };
        Arc::new(Self {
            name: self.name.clone(),
            step: Arc::clone(&self.step),
            next: linked,
        })
    }

    /// Executes the whole chain with the given input.
    ///
    /// A bare task simply invokes its underlying step and returns the result
    /// (or propagates the failure).
    pub async fn execute(&self, record: Record) -> Result<Record, ExecError> {
        let mut out = self.step.run(record).await?;
        let mut cursor = &self.next;
        while let Some(task) = cursor {
            out = task.step.run(out).await?;
            cursor = &task.next;
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut len = 1;
        let mut cursor = &self.next;
        while let Some(t) = cursor {
            len += 1;
            cursor = &t.next;
        }
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("chain_len", &len)
            .finish()
    }
}
