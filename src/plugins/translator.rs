//! # Translator capability: mid-pipeline data transforms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ExecError;

/// Contract for transforming `(tag, time, data)` into derived data.
///
/// Translators subscribe to nothing themselves; a pipeline chains a
/// translator task between an observer and an emit stage, or after a
/// subscription.
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    async fn translate(
        &self,
        tag: &str,
        time: DateTime<Utc>,
        data: Value,
    ) -> Result<Value, ExecError>;
}

/// Closure-backed translator, for inline declarations and tests.
pub struct FnTranslator<F> {
    f: F,
}

impl<F> FnTranslator<F>
where
    F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Translator for FnTranslator<F>
where
    F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
{
    async fn translate(
        &self,
        tag: &str,
        time: DateTime<Utc>,
        data: Value,
    ) -> Result<Value, ExecError> {
        (self.f)(tag, time, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_translator_derives_data() {
        let tr = FnTranslator::new(|tag, _time, data| {
            let n = data.as_i64().unwrap_or(0);
            Ok(json!(format!("{tag}={n}")))
        });
        let out = tr.translate("svc.rps", Utc::now(), json!(7)).await.unwrap();
        assert_eq!(out, json!("svc.rps=7"));
    }
}
