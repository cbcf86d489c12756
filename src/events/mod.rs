//! Event bus, tags, and subscription patterns.

mod bus;
mod event;
mod pattern;

pub use bus::TagBus;
pub use event::Event;
pub use pattern::TagPattern;
