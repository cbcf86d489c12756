//! One delivered occurrence on the bus: a tag, a timestamp, and a payload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::tasks::{Meta, Record};

/// An emitted event. Created by [`TagBus::emit`](crate::TagBus::emit),
/// consumed by every matching job, discarded after delivery — the bus
/// retains nothing.
#[derive(Clone, Debug)]
pub struct Event {
    /// Hierarchical classification string, e.g. `"service.response"`.
    pub tag: Arc<str>,
    /// When the producer emitted the data.
    pub time: DateTime<Utc>,
    /// Opaque payload; immutable once emitted.
    pub data: Value,
}

impl Event {
    pub fn new(tag: impl Into<Arc<str>>, time: DateTime<Utc>, data: Value) -> Self {
        Self {
            tag: tag.into(),
            time,
            data,
        }
    }

    /// The `(data, {tag, time})` pair a job receives for this event.
    /// Cloned per subscriber, so reporters never see each other's edits.
    pub fn record(&self) -> Record {
        Record::new(
            self.data.clone(),
            Meta {
                tag: Some(Arc::clone(&self.tag)),
                time: Some(self.time),
            },
        )
    }
}
