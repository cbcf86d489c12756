//! Task, job, and record types: the composable execution layer.

mod factory;
mod job;
mod record;
mod task;

pub use factory::TaskFactory;
pub use job::Job;
pub use record::{Meta, Record};
pub use task::{Run, Task, TaskRef};
