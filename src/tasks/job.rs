//! # Job: the mutable, re-invocable execution slot behind a subscription.
//!
//! A [`Job`] is what a task chain resolves to once it is attached to a live
//! bus subscription. The bus invokes [`Job::now`] once per matching event;
//! the job serializes those invocations and remembers the most recent input.
//!
//! ## Concurrency contract
//! - Invocations of `now` on one job are **serialized** by the job's own
//!   async mutex. Two events concurrently matching the same subscription are
//!   processed one at a time, in the order their `emit` calls reached the
//!   bus; partial invocations never interleave.
//! - This per-job lock is the sole exclusion mechanism. There is no queue and
//!   no buffering: a slow chain holds the lock and backpressures its
//!   producer's `emit` call.
//! - Distinct jobs share nothing; unrelated subscriptions never contend.

use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

use crate::error::ExecError;
use crate::tasks::record::{Meta, Record};
use crate::tasks::task::TaskRef;

/// Stateful execution slot bound to a bus subscription.
pub struct Job {
    /// The chain to run per invocation; `None` means identity (pass input through).
    chain: RwLock<Option<TaskRef>>,
    /// Serializes invocations of [`Job::now`].
    gate: tokio::sync::Mutex<()>,
    /// Most recently delivered input, retrievable between invocations.
    last: Mutex<Option<Record>>,
}

impl Job {
    /// Creates an identity job: until a chain is attached, `now` returns its
    /// input unchanged (after recording it).
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chain: RwLock::new(None),
            gate: tokio::sync::Mutex::new(()),
            last: Mutex::new(None),
        })
    }

    /// Appends a task to this job's chain and returns the job for fluent use.
    ///
    /// `bus.receive(pattern)?.then(report_task)` is the canonical wiring: the
    /// subscription handle is a job, and `then` is how a reporter binds to it.
    pub fn then(&self, task: TaskRef) -> &Self {
        let mut chain = self.chain.write().expect("job chain lock poisoned");
        *chain = match chain.take() {
            None => Some(task),
            Some(existing) => Some(existing.then(task)),
        };
        self
    }

    /// Executes the chain immediately with the given input and returns its
    /// result. May be called repeatedly, once per delivered event.
    ///
    /// Holds the job's gate for the full chain execution; see the module docs
    /// for the serialization contract.
    pub async fn now(&self, data: Value, meta: Meta) -> Result<Record, ExecError> {
        let _serialized = self.gate.lock().await;

        let record = Record::new(data, meta);
        *self.last.lock().expect("job last lock poisoned") = Some(record.clone());

        let chain = {
            let guard = self.chain.read().expect("job chain lock poisoned");
            guard.clone()
        };
        match chain {
            None => Ok(record),
            Some(task) => task.execute(record).await,
        }
    }

    /// Returns the most recent `(data, options)` delivered to this job, if
    /// any. Used when a group wants to inspect the latest incoming values
    /// independent of bus delivery timing.
    pub fn last(&self) -> Option<Record> {
        self.last.lock().expect("job last lock poisoned").clone()
    }
}
