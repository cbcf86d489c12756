//! # Reporter capability: pattern-matched sinks.
//!
//! A reporter writes delivered data somewhere (stdout, an RRD file, a metrics
//! backend). Its [`matches`](Reporter::matches) is available for direct
//! querying, but the bus never calls it — routing uses the pattern declared
//! at `report` time, so a reporter cannot widen its own subscription.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ExecError;
use crate::events::TagPattern;

/// Contract for sinks.
#[async_trait]
pub trait Reporter: Send + Sync + 'static {
    /// Whether this reporter considers `tag` its own.
    fn matches(&self, tag: &str) -> bool;

    /// Writes the data; returns the (possibly transformed) payload so report
    /// stages stay chainable.
    async fn report(
        &self,
        tag: &str,
        time: DateTime<Utc>,
        data: Value,
    ) -> Result<Value, ExecError>;
}

/// Closure-backed reporter, for inline declarations and tests.
///
/// With no pattern, [`matches`](Reporter::matches) is always false — same as
/// the original's proc reporter without a tag pattern.
pub struct FnReporter<F> {
    pattern: Option<TagPattern>,
    f: F,
}

impl<F> FnReporter<F>
where
    F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    pub fn new(pattern: Option<TagPattern>, f: F) -> Self {
        Self { pattern, f }
    }
}

#[async_trait]
impl<F> Reporter for FnReporter<F>
where
    F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    fn matches(&self, tag: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.matches(tag))
    }

    async fn report(
        &self,
        tag: &str,
        time: DateTime<Utc>,
        data: Value,
    ) -> Result<Value, ExecError> {
        (self.f)(tag, time, data)
    }
}
