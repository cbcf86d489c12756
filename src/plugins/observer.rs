//! # Observer capability: pull-based data producers.
//!
//! An observer reads a source (a file, an HTTP endpoint, a gauge) and returns
//! data for the pipeline. The signature is fixed at `(data, &meta)` — an
//! observer that needs neither simply ignores the arguments. This replaces
//! the original's runtime arity dispatch with one compile-time contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExecError;
use crate::tasks::Meta;

/// Contract for pull-based data producers.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Produces data. `data`/`meta` are the prior step's output when the
    /// observer runs mid-chain; both are empty at the head of a pipeline.
    async fn observe(&self, data: Value, meta: &Meta) -> Result<Value, ExecError>;
}

/// Closure-backed observer, for inline declarations and tests.
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(Value, &Meta) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Observer for FnObserver<F>
where
    F: Fn(Value, &Meta) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    async fn observe(&self, data: Value, meta: &Meta) -> Result<Value, ExecError> {
        (self.f)(data, meta)
    }
}
