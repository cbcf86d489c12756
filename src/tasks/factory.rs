//! # TaskFactory: turns plugin capabilities into tasks.
//!
//! The factory is the original `convert_to_task` seam, split per capability
//! because each role maps its arguments differently onto the uniform
//! [`Run`](crate::tasks::Run) contract:
//!
//! ```text
//! Observer   observe(data, &meta)        ─► data'   (meta passes through)
//! Translator translate(tag, time, data)  ─► data'   (meta passes through)
//! Reporter   report(tag, time, data)     ─► data'   (meta passes through)
//! ```
//!
//! Translators and reporters read `(tag, time)` from the record meta. Data
//! that has not passed an emit stage yet carries no meta; those adapters see
//! the empty tag and the current time.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::plugins::{Observer, Reporter, Translator};
use crate::tasks::record::Record;
use crate::tasks::task::{Run, Task, TaskRef};

/// Adapts plugin capabilities into named, chainable [`Task`]s.
///
/// Stateless; exists as a type so wiring code reads the same way the original
/// does (`factory.observer_task(..)` instead of loose functions).
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskFactory;

impl TaskFactory {
    pub fn new() -> Self {
        Self
    }

    /// Wraps an observer into a task named `observe`.
    pub fn observer_task(&self, observer: Arc<dyn Observer>) -> TaskRef {
        Task::new("observe", Arc::new(ObserveStep { observer }))
    }

    /// Wraps a translator into a task named `translate`.
    pub fn translator_task(&self, translator: Arc<dyn Translator>) -> TaskRef {
        Task::new("translate", Arc::new(TranslateStep { translator }))
    }

    /// Wraps a reporter into a task named `report`.
    pub fn reporter_task(&self, reporter: Arc<dyn Reporter>) -> TaskRef {
        Task::new("report", Arc::new(ReportStep { reporter }))
    }
}

struct ObserveStep {
    observer: Arc<dyn Observer>,
}

#[async_trait]
impl Run for ObserveStep {
    async fn run(&self, record: Record) -> Result<Record, ExecError> {
        let data = self.observer.observe(record.data.clone(), &record.meta).await?;
        Ok(record.with_data(data))
    }
}

struct TranslateStep {
    translator: Arc<dyn Translator>,
}

#[async_trait]
impl Run for TranslateStep {
    async fn run(&self, record: Record) -> Result<Record, ExecError> {
        let tag = record.meta.tag.clone();
        let time = record.meta.time_or_now();
        let data = self
            .translator
            .translate(tag.as_deref().unwrap_or(""), time, record.data.clone())
            .await?;
        Ok(record.with_data(data))
    }
}

struct ReportStep {
    reporter: Arc<dyn Reporter>,
}

#[async_trait]
impl Run for ReportStep {
    async fn run(&self, record: Record) -> Result<Record, ExecError> {
        let tag = record.meta.tag.clone();
        let time = record.meta.time_or_now();
        let data = self
            .reporter
            .report(tag.as_deref().unwrap_or(""), time, record.data.clone())
            .await?;
        Ok(record.with_data(data))
    }
}
