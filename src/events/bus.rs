//! # TagBus: the tag-pattern publish/subscribe core.
//!
//! Routes emitted events to interested subscribers by pattern match, with no
//! producer knowing who (if anyone) is listening.
//!
//! ## Architecture
//! ```text
//! emit(tag, time, data)
//!     │  snapshot subscription table, keep matches
//!     ├────► [pattern₁] ─► Job₁.now(data, {tag, time})   (awaited)
//!     ├────► [pattern₂] ─► Job₂.now(data, {tag, time})   (awaited)
//!     └────► no match  ─► silent no-op (debug log only)
//! ```
//!
//! ## Rules
//! - **Synchronous delivery**: `emit` returns only after every matching job
//!   has completed its `now` invocation. There is no fan-out queue in the
//!   bus; an async boundary, if desired, belongs to the task layer.
//! - **Same event for all**: each match receives a clone of the same record;
//!   matching is order-independent.
//! - **Fail fast**: the first subscriber failure propagates to the `emit`
//!   caller; later matches in that delivery are not attempted.
//! - **Pattern errors at `receive`**: a malformed pattern never registers.
//! - **No retention**: events are dropped after delivery; a subscriber
//!   registered later only sees future emits.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{ExecError, PatternError};
use crate::events::event::Event;
use crate::events::pattern::TagPattern;
use crate::tasks::{Job, Record, Run, Task, TaskRef};

struct Subscription {
    pattern: TagPattern,
    job: Arc<Job>,
}

/// Publish/subscribe core keyed by tag pattern.
///
/// Exclusively owns the subscription table. Safe to share behind an `Arc`
/// and call from any number of concurrent producers.
pub struct TagBus {
    subs: RwLock<Vec<Subscription>>,
}

impl TagBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subs: RwLock::new(Vec::new()),
        })
    }

    /// Delivers the event to every subscription whose pattern matches `tag`.
    ///
    /// Zero matches is a normal, silent no-op. Each matching job is awaited
    /// in registration order; per-job serialization is the job's own concern
    /// (see [`Job`]). The first failure propagates to the caller.
    pub async fn emit(
        &self,
        tag: &str,
        time: DateTime<Utc>,
        data: Value,
    ) -> Result<(), ExecError> {
        let event = Event::new(tag, time, data);

        // Snapshot under the read lock so a concurrent `receive` never blocks
        // an in-flight delivery, then drop it before awaiting anything.
        let matched: Vec<Arc<Job>> = {
            let subs = self.subs.read().expect("bus subscription lock poisoned");
            subs.iter()
                .filter(|s| s.pattern.matches(tag))
                .map(|s| Arc::clone(&s.job))
                .collect()
        };

        if matched.is_empty() {
            debug!(tag, "no subscription matched; dropping event");
            return Ok(());
        }

        debug!(tag, subscribers = matched.len(), "delivering event");
        for job in matched {
            let record = event.record();
            job.now(record.data, record.meta).await?;
        }
        Ok(())
    }

    /// Registers `pattern` and returns the subscription handle: a fresh
    /// identity [`Job`] that every future matching `emit` will invoke.
    ///
    /// Extend the handle with [`Job::then`] to bind work to the subscription.
    /// Compilation failures surface here, never at emit time.
    pub fn receive(&self, pattern: &str) -> Result<Arc<Job>, PatternError> {
        Ok(self.receive_pattern(TagPattern::compile(pattern)?))
    }

    /// Registers an already-compiled pattern. Callers holding a [`TagPattern`]
    /// subscribe through this seam instead of recompiling the text.
    pub fn receive_pattern(&self, pattern: TagPattern) -> Arc<Job> {
        let job = Job::new();
        let mut subs = self.subs.write().expect("bus subscription lock poisoned");
        subs.push(Subscription {
            pattern,
            job: Arc::clone(&job),
        });
        job
    }

    /// Returns a task named `emit to <tag>` that republishes its input record
    /// under `tag` and passes the record through unchanged.
    ///
    /// This is the stage the builder chains after an observer: the observer
    /// produces data, the emit stage hands it to the bus. The emission time is
    /// the record's own time when present, else now.
    pub fn emit_task(self: Arc<Self>, tag: impl Into<Arc<str>>) -> TaskRef {
        let tag = tag.into();
        let name = format!("emit to {tag}");
        Task::new(name, Arc::new(EmitStep { bus: self, tag }))
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subs.read().expect("bus subscription lock poisoned").len()
    }
}

struct EmitStep {
    bus: Arc<TagBus>,
    tag: Arc<str>,
}

#[async_trait]
impl Run for EmitStep {
    async fn run(&self, record: Record) -> Result<Record, ExecError> {
        let time = record.meta.time_or_now();
        self.bus.emit(&self.tag, time, record.data.clone()).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Meta, TaskFactory};
    use crate::plugins::{FnObserver, FnReporter};
    use serde_json::json;
    use std::sync::Mutex;

    fn collector() -> (Arc<Mutex<Vec<Record>>>, TaskRef) {
        let seen: Arc<Mutex<Vec<Record>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let task = Task::new(
            "collect",
            Arc::new(CollectStep { sink }),
        );
        (seen, task)
    }

    struct CollectStep {
        sink: Arc<Mutex<Vec<Record>>>,
    }

    #[async_trait]
    impl Run for CollectStep {
        async fn run(&self, record: Record) -> Result<Record, ExecError> {
            self.sink.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    #[tokio::test]
    async fn test_emit_delivers_iff_pattern_matches() {
        let bus = TagBus::new();
        let (seen, task) = collector();
        bus.receive(r"svc\..*").unwrap().then(task);

        let t = Utc::now();
        bus.emit("svc.latency", t, json!(42)).await.unwrap();
        bus.emit("other.latency", t, json!(13)).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "only the matching tag is delivered");
        assert_eq!(seen[0].data, json!(42));
        assert_eq!(seen[0].meta.tag_str(), "svc.latency");
        assert_eq!(seen[0].meta.time, Some(t));
    }

    #[tokio::test]
    async fn test_zero_matches_is_a_silent_no_op() {
        let bus = TagBus::new();
        bus.emit("nobody.listens", Utc::now(), json!(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_all_matches_receive_the_same_event() {
        let bus = TagBus::new();
        let (seen_a, task_a) = collector();
        let (seen_b, task_b) = collector();
        bus.receive("svc").unwrap().then(task_a);
        bus.receive(r"\.latency$").unwrap().then(task_b);

        bus.emit("svc.latency", Utc::now(), json!("x")).await.unwrap();

        assert_eq!(seen_a.lock().unwrap()[0].data, json!("x"));
        assert_eq!(seen_b.lock().unwrap()[0].data, json!("x"));
    }

    #[tokio::test]
    async fn test_receive_pattern_subscribes_precompiled() {
        let bus = TagBus::new();
        let (seen, task) = collector();
        bus.receive_pattern(TagPattern::compile("^svc").unwrap())
            .then(task);

        bus.emit("svc.latency", Utc::now(), json!(1)).await.unwrap();
        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_pattern_fails_at_receive() {
        let bus = TagBus::new();
        assert!(bus.receive("(oops").is_err());
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_failure_propagates_to_emit() {
        let bus = TagBus::new();
        let factory = TaskFactory::new();
        let failing = factory.reporter_task(Arc::new(FnReporter::new(None, |_t, _at, _d| {
            Err(ExecError::failure("sink unavailable"))
        })));
        bus.receive("svc").unwrap().then(failing);

        let err = bus.emit("svc.latency", Utc::now(), json!(1)).await.unwrap_err();
        assert!(err.to_string().contains("sink unavailable"));
    }

    #[tokio::test]
    async fn test_emit_task_republishes_and_passes_through() {
        let bus = TagBus::new();
        let (seen, task) = collector();
        bus.receive("^derived$").unwrap().then(task);

        let factory = TaskFactory::new();
        let observe = factory.observer_task(Arc::new(FnObserver::new(|_d, _m| Ok(json!(9)))));
        let chain = observe.then(Arc::clone(&bus).emit_task("derived"));
        assert_eq!(chain.name(), "observe");

        let out = chain.execute(Record::empty()).await.unwrap();
        assert_eq!(out.data, json!(9), "emit stage passes the record through");
        assert_eq!(seen.lock().unwrap()[0].meta.tag_str(), "derived");
    }

    #[tokio::test]
    async fn test_emit_task_keeps_existing_time() {
        let bus = TagBus::new();
        let (seen, task) = collector();
        bus.receive("relay").unwrap().then(task);

        let t = Utc::now();
        let emit = Arc::clone(&bus).emit_task("relay");
        emit.execute(Record::new(json!(1), Meta::at("orig", t)))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap()[0].meta.time, Some(t));
    }
}
