//! # PipelineBuilder: the declarative wiring surface.
//!
//! The builder is the only component that instantiates plugins. At
//! configuration time it wraps plugin instances (or inline closures) into
//! tasks and wires them onto the bus:
//!
//! ```text
//! observe(tag, via)   ─► [observe] ─► [emit to tag]      + appended to group(tag)
//! translate(via)      ─► [translate]                      (unbound, for manual chaining)
//! report(pattern, via)─► receive(pattern).then([report])
//! ```
//!
//! ## Rules
//! - Unknown plugin names fail here, naming the missing plugin and the set of
//!   registered names — never at first emit.
//! - A builder instance is caller-owned; constructing a new one yields a
//!   fresh group registry and declaration lists, so there is no reset
//!   convention between configurations.
//! - Group semantics: `observe(tag, ..)` **appends** to the tag's group;
//!   [`set_group`](PipelineBuilder::set_group) **replaces** the whole list
//!   atomically. Reads return a snapshot, so replacing a group never changes
//!   an in-flight group run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ExecError};
use crate::events::{TagBus, TagPattern};
use crate::plugins::{
    FnObserver, FnReporter, FnTranslator, Observer, PluginRegistry, Reporter, Translator,
};
use crate::tasks::{Meta, TaskFactory, TaskRef};

type ObserveFn = Box<dyn Fn(Value, &Meta) -> Result<Value, ExecError> + Send + Sync>;
type TranslateFn =
    Box<dyn Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync>;
type ReportFn = Box<dyn Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync>;

/// How an `observe` declaration supplies its observer.
///
/// The original accepted `via:`/`using:` plugin names or a block and failed on
/// any other combination; here the combinations are the variants.
pub enum ObserveVia {
    /// Resolve a named plugin through the registry with the given options.
    Plugin { name: String, options: Value },
    /// Use an already-constructed observer.
    Observer(Arc<dyn Observer>),
    /// Inline closure.
    Func(ObserveFn),
}

impl ObserveVia {
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn plugin_with(name: impl Into<String>, options: Value) -> Self {
        Self::Plugin {
            name: name.into(),
            options,
        }
    }

    pub fn observer(observer: Arc<dyn Observer>) -> Self {
        Self::Observer(observer)
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(Value, &Meta) -> Result<Value, ExecError> + Send + Sync + 'static,
    {
        Self::Func(Box::new(f))
    }
}

/// How a `translate` declaration supplies its translator.
pub enum TranslateVia {
    Plugin { name: String, options: Value },
    Translator(Arc<dyn Translator>),
    Func(TranslateFn),
}

impl TranslateVia {
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn plugin_with(name: impl Into<String>, options: Value) -> Self {
        Self::Plugin {
            name: name.into(),
            options,
        }
    }

    pub fn translator(translator: Arc<dyn Translator>) -> Self {
        Self::Translator(translator)
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
    {
        Self::Func(Box::new(f))
    }
}

/// How a `report` declaration supplies its reporter.
pub enum ReportVia {
    Plugin { name: String, options: Value },
    Reporter(Arc<dyn Reporter>),
    Func(ReportFn),
}

impl ReportVia {
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn plugin_with(name: impl Into<String>, options: Value) -> Self {
        Self::Plugin {
            name: name.into(),
            options,
        }
    }

    pub fn reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self::Reporter(reporter)
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, DateTime<Utc>, Value) -> Result<Value, ExecError> + Send + Sync + 'static,
    {
        Self::Func(Box::new(f))
    }
}

/// Snapshot of everything a builder has declared so far.
#[derive(Clone, Debug, Default)]
pub struct Wiring {
    /// Observer tasks in declaration order (chained to their emit stage when
    /// a tag was given).
    pub observers: Vec<TaskRef>,
    /// Reporter tasks in declaration order.
    pub reporters: Vec<TaskRef>,
}

/// Declarative surface for wiring observers, translators, and reporters onto
/// a [`TagBus`], plus the named-group registry.
pub struct PipelineBuilder {
    bus: Arc<TagBus>,
    plugins: Arc<PluginRegistry>,
    factory: TaskFactory,
    groups: Mutex<HashMap<String, Vec<TaskRef>>>,
    observers: Mutex<Vec<TaskRef>>,
    reporters: Mutex<Vec<TaskRef>>,
}

impl PipelineBuilder {
    pub fn new(bus: Arc<TagBus>, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            bus,
            plugins,
            factory: TaskFactory::new(),
            groups: Mutex::new(HashMap::new()),
            observers: Mutex::new(Vec::new()),
            reporters: Mutex::new(Vec::new()),
        }
    }

    /// The bus this builder wires onto.
    pub fn bus(&self) -> &Arc<TagBus> {
        &self.bus
    }

    /// Declares an observer.
    ///
    /// With a tag: the observer task is chained to `emit(tag)`, the chain is
    /// appended to the tag's group, and the chain is returned. Without a tag:
    /// the bare task is returned for manual composition and joins no group.
    ///
    /// For plugin observers the declared tag is injected into the options map
    /// under `"tag"`, so a plugin can label its own output.
    pub fn observe(&self, tag: Option<&str>, via: ObserveVia) -> Result<TaskRef, ConfigError> {
        let observer: Arc<dyn Observer> = match via {
            ObserveVia::Plugin { name, mut options } => {
                if let Some(tag) = tag {
                    inject(&mut options, "tag", Value::String(tag.to_string()));
                }
                self.plugins.observer(&name, &options)?
            }
            ObserveVia::Observer(observer) => observer,
            ObserveVia::Func(f) => Arc::new(FnObserver::new(f)),
        };

        let task = self.factory.observer_task(observer);
        let result = match tag {
            Some(tag) => {
                let chained = task.then(Arc::clone(&self.bus).emit_task(tag));
                self.append_to_group(tag, Arc::clone(&chained));
                debug!(tag, "observer wired to emit stage");
                chained
            }
            None => task,
        };
        self.observers
            .lock()
            .expect("builder observers lock poisoned")
            .push(Arc::clone(&result));
        Ok(result)
    }

    /// Declares a translator: built, named, and returned unbound. The caller
    /// chains it into an observer or reporter pipeline.
    pub fn translate(&self, via: TranslateVia) -> Result<TaskRef, ConfigError> {
        let translator: Arc<dyn Translator> = match via {
            TranslateVia::Plugin { name, options } => self.plugins.translator(&name, &options)?,
            TranslateVia::Translator(translator) => translator,
            TranslateVia::Func(f) => Arc::new(FnTranslator::new(f)),
        };
        Ok(self.factory.translator_task(translator))
    }

    /// Declares a reporter.
    ///
    /// With a pattern: the reporter task is bound to `receive(pattern)`;
    /// malformed patterns fail here. Without a pattern the task is returned
    /// unsubscribed. For plugin reporters the pattern string is injected into
    /// the options map under `"tag_pattern"`; inline closures are wrapped
    /// with the compiled pattern so their `matches` answers match the
    /// subscription.
    pub fn report(&self, pattern: Option<&str>, via: ReportVia) -> Result<TaskRef, ConfigError> {
        // Compiled once here; the subscription below reuses it.
        let compiled = pattern.map(TagPattern::compile).transpose()?;

        let reporter: Arc<dyn Reporter> = match via {
            ReportVia::Plugin { name, mut options } => {
                if let Some(pattern) = pattern {
                    inject(
                        &mut options,
                        "tag_pattern",
                        Value::String(pattern.to_string()),
                    );
                }
                self.plugins.reporter(&name, &options)?
            }
            ReportVia::Reporter(reporter) => reporter,
            ReportVia::Func(f) => Arc::new(FnReporter::new(compiled.clone(), f)),
        };

        let task = self.factory.reporter_task(reporter);
        if let Some(compiled) = compiled {
            self.bus.receive_pattern(compiled).then(Arc::clone(&task));
            debug!(pattern = pattern.unwrap_or(""), "reporter subscribed");
        }
        self.reporters
            .lock()
            .expect("builder reporters lock poisoned")
            .push(Arc::clone(&task));
        Ok(task)
    }

    /// Returns a snapshot of the named group's task list; empty when the
    /// group was never declared.
    pub fn group(&self, name: &str) -> Vec<TaskRef> {
        let groups = self.groups.lock().expect("builder group lock poisoned");
        groups.get(name).cloned().unwrap_or_default()
    }

    /// Replaces the named group's task list wholesale.
    pub fn set_group(&self, name: impl Into<String>, tasks: Vec<TaskRef>) {
        let mut groups = self.groups.lock().expect("builder group lock poisoned");
        groups.insert(name.into(), tasks);
    }

    /// Observer tasks in declaration order.
    pub fn observers(&self) -> Vec<TaskRef> {
        self.observers
            .lock()
            .expect("builder observers lock poisoned")
            .clone()
    }

    /// Reporter tasks in declaration order.
    pub fn reporters(&self) -> Vec<TaskRef> {
        self.reporters
            .lock()
            .expect("builder reporters lock poisoned")
            .clone()
    }

    /// Snapshot of all declared observers and reporters.
    pub fn wiring(&self) -> Wiring {
        Wiring {
            observers: self.observers(),
            reporters: self.reporters(),
        }
    }

    fn append_to_group(&self, name: &str, task: TaskRef) {
        let mut groups = self.groups.lock().expect("builder group lock poisoned");
        groups.entry(name.to_string()).or_default().push(task);
    }
}

/// Inserts a key into an options value, promoting `null` to an object first.
/// Non-object options are left alone; a plugin that takes, say, a bare string
/// keeps it.
fn inject(options: &mut Value, key: &str, value: Value) {
    if options.is_null() {
        *options = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(map) = options {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Record;
    use serde_json::json;

    fn builder() -> PipelineBuilder {
        PipelineBuilder::new(TagBus::new(), Arc::new(PluginRegistry::new()))
    }

    fn builder_with(registry: PluginRegistry) -> PipelineBuilder {
        PipelineBuilder::new(TagBus::new(), Arc::new(registry))
    }

    #[tokio::test]
    async fn test_observe_and_report_wire_end_to_end() {
        // The concrete scenario: observe("svc.latency", closure1),
        // report(/svc\..*/, closure2), emit 42 at t — closure2 sees
        // (42, {tag: "svc.latency", time: t}) exactly once.
        let b = builder();
        let seen = Arc::new(Mutex::new(Vec::new()));

        b.observe(Some("svc.latency"), ObserveVia::func(|data, _meta| Ok(data)))
            .unwrap();
        let sink = Arc::clone(&seen);
        b.report(
            Some(r"svc\..*"),
            ReportVia::func(move |tag, time, data| {
                sink.lock().unwrap().push((tag.to_string(), time, data.clone()));
                Ok(data)
            }),
        )
        .unwrap();

        let t = Utc::now();
        b.bus().emit("svc.latency", t, json!(42)).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "reporter invoked exactly once");
        assert_eq!(seen[0], ("svc.latency".to_string(), t, json!(42)));
    }

    #[tokio::test]
    async fn test_observe_with_tag_emits_through_the_bus() {
        let b = builder();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        b.report(
            Some("^cpu.load$"),
            ReportVia::func(move |_tag, _time, data| {
                sink.lock().unwrap().push(data.clone());
                Ok(data)
            }),
        )
        .unwrap();

        let chain = b
            .observe(Some("cpu.load"), ObserveVia::func(|_d, _m| Ok(json!(0.7))))
            .unwrap();
        chain.execute(Record::empty()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![json!(0.7)]);
    }

    #[test]
    fn test_observe_with_tag_joins_its_group() {
        let b = builder();
        assert!(b.group("svc.latency").is_empty(), "unset group reads empty");

        b.observe(Some("svc.latency"), ObserveVia::func(|d, _| Ok(d)))
            .unwrap();
        b.observe(Some("svc.latency"), ObserveVia::func(|d, _| Ok(d)))
            .unwrap();
        assert_eq!(b.group("svc.latency").len(), 2, "observe appends per declaration");

        b.set_group("svc.latency", Vec::new());
        assert!(b.group("svc.latency").is_empty(), "set_group replaces wholesale");
    }

    #[test]
    fn test_set_group_then_group_returns_the_list() {
        let b = builder();
        let t1 = b.observe(None, ObserveVia::func(|d, _| Ok(d))).unwrap();
        let t2 = b.observe(None, ObserveVia::func(|d, _| Ok(d))).unwrap();
        b.set_group("manual", vec![Arc::clone(&t1), Arc::clone(&t2)]);

        let got = b.group("manual");
        assert_eq!(got.len(), 2);
        assert!(Arc::ptr_eq(&got[0], &t1));
        assert!(Arc::ptr_eq(&got[1], &t2));
    }

    #[test]
    fn test_observe_without_tag_is_unwired() {
        let b = builder();
        let task = b.observe(None, ObserveVia::func(|d, _| Ok(d))).unwrap();
        assert_eq!(task.name(), "observe");
        assert_eq!(b.bus().subscription_count(), 0);
        assert!(b.group("").is_empty());
        assert_eq!(b.observers().len(), 1);
    }

    #[test]
    fn test_unknown_plugin_fails_at_declaration() {
        let b = builder();
        let err = b
            .observe(Some("x"), ObserveVia::plugin("nope"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"nope\""), "error names the plugin: {msg}");
        assert_eq!(b.observers().len(), 0, "nothing was declared");
        assert_eq!(b.bus().subscription_count(), 0);
    }

    #[test]
    fn test_report_with_bad_pattern_fails_at_declaration() {
        let b = builder();
        let err = b
            .report(Some("(oops"), ReportVia::func(|_t, _at, d| Ok(d)))
            .unwrap_err();
        assert_eq!(err.as_label(), "config_bad_pattern");
        assert_eq!(b.bus().subscription_count(), 0);
    }

    #[test]
    fn test_plugin_observer_receives_declared_tag() {
        use crate::plugins::FnObserver as Obs;
        let mut reg = PluginRegistry::new();
        reg.register_observer("echo_tag", |options| {
            let tag = options
                .get("tag")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            Ok(Arc::new(Obs::new(move |_d, _m| Ok(json!(tag.clone())))) as Arc<dyn Observer>)
        });

        let b = builder_with(reg);
        b.observe(Some("db.conns"), ObserveVia::plugin("echo_tag"))
            .unwrap();
        // The ctor saw the tag; declaration succeeded with null options promoted.
        assert_eq!(b.group("db.conns").len(), 1);
    }

    #[test]
    fn test_plugin_reporter_receives_pattern_in_options() {
        let captured = Arc::new(Mutex::new(String::new()));
        let probe = Arc::clone(&captured);

        let mut reg = PluginRegistry::new();
        reg.register_reporter("probe", move |options| {
            let pattern = options
                .get("tag_pattern")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            *probe.lock().unwrap() = pattern;
            Ok(Arc::new(FnReporter::new(None, |_t, _at, d| Ok(d))) as Arc<dyn Reporter>)
        });

        let b = builder_with(reg);
        b.report(Some(r"svc\."), ReportVia::plugin("probe")).unwrap();
        assert_eq!(*captured.lock().unwrap(), r"svc\.");
    }

    #[tokio::test]
    async fn test_translate_chains_between_observe_and_emit() {
        let b = builder();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        b.report(
            Some("^derived$"),
            ReportVia::func(move |_tag, _time, data| {
                sink.lock().unwrap().push(data.clone());
                Ok(data)
            }),
        )
        .unwrap();

        let observe = b.observe(None, ObserveVia::func(|_d, _m| Ok(json!(10)))).unwrap();
        let double = b
            .translate(TranslateVia::func(|_tag, _time, data| {
                Ok(json!(data.as_i64().unwrap_or(0) * 2))
            }))
            .unwrap();
        assert_eq!(double.name(), "translate");

        let chain = observe.then(double).then(Arc::clone(b.bus()).emit_task("derived"));
        chain.execute(Record::empty()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![json!(20)]);
    }

    #[test]
    fn test_wiring_snapshot_collects_declarations() {
        let b = builder();
        b.observe(Some("a"), ObserveVia::func(|d, _| Ok(d))).unwrap();
        b.report(None, ReportVia::func(|_t, _at, d| Ok(d))).unwrap();

        let wiring = b.wiring();
        assert_eq!(wiring.observers.len(), 1);
        assert_eq!(wiring.reporters.len(), 1);
    }
}
