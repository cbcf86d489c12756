//! # tagpipe
//!
//! **tagpipe** is the routing and composition core of an observability
//! pipeline: independently written data producers ("observers"), transformers
//! ("translators"), and sinks ("reporters") are wired together by tag, with
//! no component knowing about the others' existence.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!     │   Observer   │     │  Translator  │     │   Reporter   │
//!     │ (pulls data) │     │ (transforms) │     │ (sinks data) │
//!     └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!            ▼ TaskFactory        ▼                    ▼
//!     ┌─────────────────────────────────────────────────────────┐
//!     │  Task (uniform, chainable: a.then(b).then(c))           │
//!     └──────┬──────────────────────────────────────────┬───────┘
//!            │ observe(tag, ..)                         │ report(pattern, ..)
//!            ▼                                          ▼
//!     [observe]─►[emit to tag]              receive(pattern).then([report])
//!            │                                          ▲
//!            ▼                                          │ Job::now per match
//!     ┌─────────────────────────────────────────────────┴───────┐
//!     │  TagBus: emit(tag, time, data) ─► pattern-matched Jobs  │
//!     └─────────────────────────────────────────────────────────┘
//!
//!     PipelineBuilder: observe / translate / report / group (name → tasks)
//!     GroupScheduler:  run_group(name) — all members concurrently, joined
//! ```
//!
//! ## Delivery discipline
//! - `emit` is synchronous with respect to its caller: every matching [`Job`]
//!   completes before `emit` returns. No queueing, no buffering — a slow job
//!   backpressures its producer.
//! - Invocations of one job are serialized by that job's own mutex; distinct
//!   subscriptions share nothing.
//! - Failures propagate: a mis-declared pipeline fails at wiring time with a
//!   descriptive [`ConfigError`]; a misbehaving plugin fails at the moment
//!   its data is processed, surfacing from `emit` or `run_group`.
//!
//! The core schedules nothing periodically and persists nothing; an external
//! driver re-invokes groups, and events not matched by any subscription are
//! silently dropped.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use tagpipe::{ObserveVia, PipelineBuilder, PluginRegistry, ReportVia, TagBus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let builder = PipelineBuilder::new(TagBus::new(), Arc::new(PluginRegistry::new()));
//!
//!     builder.observe(
//!         Some("svc.latency"),
//!         ObserveVia::func(|_data, _meta| Ok(json!(42))),
//!     )?;
//!     builder.report(
//!         Some(r"svc\..*"),
//!         ReportVia::func(|tag, time, data| {
//!             println!("{tag} @ {time}: {data}");
//!             Ok(data)
//!         }),
//!     )?;
//!
//!     // An external driver would call this on a timer:
//!     let scheduler = tagpipe::GroupScheduler::new(Arc::new(builder));
//!     scheduler.run_group("svc.latency").await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod plugins;
mod tasks;

// ---- Public re-exports ----

pub use core::{GroupScheduler, ObserveVia, PipelineBuilder, ReportVia, TranslateVia, Wiring};
pub use error::{ConfigError, ExecError, PatternError, PluginKind};
pub use events::{Event, TagBus, TagPattern};
pub use plugins::{
    FnObserver, FnReporter, FnTranslator, Observer, ObserverCtor, PluginRegistry, Reporter,
    ReporterCtor, Translator, TranslatorCtor,
};
pub use tasks::{Job, Meta, Record, Run, Task, TaskFactory, TaskRef};
