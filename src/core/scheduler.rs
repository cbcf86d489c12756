//! # GroupScheduler: concurrent re-execution of a named group.
//!
//! A group is a set of previously declared tasks (typically observer chains
//! bucketed by tag). [`GroupScheduler::run_group`] runs the whole set
//! concurrently as one unit: every member spawned, all joined, the first
//! failure surfaced to the caller.
//!
//! ## Rules
//! - Each listed task executes **exactly once** per invocation.
//! - No ordering guarantee between members of the same group.
//! - `run_group` returns only after every member has completed, even when one
//!   of them failed — no member is abandoned mid-run.
//! - The task list is the builder's snapshot at call time; a concurrent
//!   `set_group` does not retroactively change an in-flight run.
//! - Periodic re-invocation is the caller's business; the core schedules
//!   nothing on its own.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::core::builder::PipelineBuilder;
use crate::error::ExecError;
use crate::tasks::Record;

/// Runs named groups of tasks concurrently as one logical unit.
pub struct GroupScheduler {
    builder: Arc<PipelineBuilder>,
}

impl GroupScheduler {
    pub fn new(builder: Arc<PipelineBuilder>) -> Self {
        Self { builder }
    }

    /// Executes every task in the named group concurrently, each with an
    /// empty input record, and returns once all of them have completed.
    ///
    /// The first member failure (or panic) is returned after the join; an
    /// empty or unknown group completes immediately.
    pub async fn run_group(&self, name: &str) -> Result<(), ExecError> {
        let tasks = self.builder.group(name);
        if tasks.is_empty() {
            debug!(group = name, "group empty; nothing to run");
            return Ok(());
        }

        debug!(group = name, members = tasks.len(), "running group");
        let mut set = JoinSet::new();
        let mut names: HashMap<tokio::task::Id, String> = HashMap::new();
        for task in tasks {
            let task_name = task.name().to_string();
            let handle = set.spawn(async move { task.execute(Record::empty()).await });
            names.insert(handle.id(), task_name);
        }

        let mut first_err: Option<ExecError> = None;
        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_id, Ok(_record))) => {}
                Ok((id, Err(err))) => {
                    warn!(
                        group = name,
                        task = names.get(&id).map(String::as_str).unwrap_or("?"),
                        label = err.as_label(),
                        "group member failed"
                    );
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
                Err(join_err) => {
                    let task = names
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "?".to_string());
                    warn!(group = name, task, "group member panicked");
                    if first_err.is_none() {
                        first_err = Some(ExecError::Panicked { task });
                    }
                }
            }
        }

        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
