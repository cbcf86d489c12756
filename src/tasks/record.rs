//! # The value that flows through a task chain.
//!
//! Every step of a pipeline receives a [`Record`] and produces a [`Record`]:
//! an opaque JSON payload plus the [`Meta`] the bus attaches on delivery.
//!
//! ## Rules
//! - `meta.tag` / `meta.time` are `None` until the record has passed an emit
//!   stage or arrived via a bus subscription; an observer at the head of a
//!   chain runs with an empty record.
//! - The payload is treated as immutable once emitted: the bus clones the
//!   record per matching subscriber, so one reporter cannot see another's
//!   edits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Delivery metadata: the `{tag, time}` options of an emitted event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    /// Tag the data was emitted under, if it has been emitted.
    pub tag: Option<Arc<str>>,
    /// Time the data was emitted at, if it has been emitted.
    pub time: Option<DateTime<Utc>>,
}

impl Meta {
    /// Meta for a delivered event: both fields present.
    pub fn at(tag: impl Into<Arc<str>>, time: DateTime<Utc>) -> Self {
        Self {
            tag: Some(tag.into()),
            time: Some(time),
        }
    }

    /// Tag as a borrowed str, empty when the record has not been emitted yet.
    pub fn tag_str(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }

    /// Emission time, defaulting to now for records still inside an observer chain.
    pub fn time_or_now(&self) -> DateTime<Utc> {
        self.time.unwrap_or_else(Utc::now)
    }
}

/// One unit of data moving through a chain: `(data, options)` in one piece.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// Opaque payload produced by the previous step.
    pub data: Value,
    /// Delivery metadata.
    pub meta: Meta,
}

impl Record {
    pub fn new(data: Value, meta: Meta) -> Self {
        Self { data, meta }
    }

    /// An empty record: `null` payload, no tag, no time. This is what group
    /// members and bare observers start from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replaces the payload, keeping the meta.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}
