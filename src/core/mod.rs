//! Orchestration layer: the wiring surface and the group runner.

mod builder;
mod scheduler;

pub use builder::{ObserveVia, PipelineBuilder, ReportVia, TranslateVia, Wiring};
pub use scheduler::GroupScheduler;
