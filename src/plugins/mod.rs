//! Plugin capability contracts and the name-based registry.
//!
//! Concrete plugins live outside this crate; the core only defines the three
//! capability traits it consumes ([`Observer`], [`Translator`], [`Reporter`]),
//! closure-backed implementations of each for inline declarations, and the
//! [`PluginRegistry`] the builder resolves names through.

mod observer;
mod registry;
mod reporter;
mod translator;

pub use observer::{FnObserver, Observer};
pub use registry::{ObserverCtor, PluginRegistry, ReporterCtor, TranslatorCtor};
pub use reporter::{FnReporter, Reporter};
pub use translator::{FnTranslator, Translator};
