//! # Plugin registry: name → constructor tables.
//!
//! The builder resolves plugin names through this registry and never
//! constructs plugins from hard-coded types. Each capability kind has its own
//! table; a constructor receives the declaration's options `Value` and either
//! yields a configured plugin instance or rejects the options.
//!
//! Resolution failures are declaration-time errors carrying both the missing
//! name and the sorted set of registered names, so a typo in a wiring file is
//! diagnosable from the error message alone.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ConfigError, PluginKind};
use crate::plugins::{Observer, Reporter, Translator};

/// Constructor for a named observer plugin.
pub type ObserverCtor =
    Arc<dyn Fn(&Value) -> Result<Arc<dyn Observer>, ConfigError> + Send + Sync>;
/// Constructor for a named translator plugin.
pub type TranslatorCtor =
    Arc<dyn Fn(&Value) -> Result<Arc<dyn Translator>, ConfigError> + Send + Sync>;
/// Constructor for a named reporter plugin.
pub type ReporterCtor =
    Arc<dyn Fn(&Value) -> Result<Arc<dyn Reporter>, ConfigError> + Send + Sync>;

/// Name-indexed plugin constructors for all three capability kinds.
#[derive(Default)]
pub struct PluginRegistry {
    observers: HashMap<String, ObserverCtor>,
    translators: HashMap<String, TranslatorCtor>,
    reporters: HashMap<String, ReporterCtor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer constructor under `name`, replacing any previous
    /// registration of that name.
    pub fn register_observer<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn Observer>, ConfigError> + Send + Sync + 'static,
    {
        self.observers.insert(name.into(), Arc::new(ctor));
    }

    pub fn register_translator<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn Translator>, ConfigError> + Send + Sync + 'static,
    {
        self.translators.insert(name.into(), Arc::new(ctor));
    }

    pub fn register_reporter<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn Reporter>, ConfigError> + Send + Sync + 'static,
    {
        self.reporters.insert(name.into(), Arc::new(ctor));
    }

    /// Constructs the named observer with the given options.
    pub fn observer(&self, name: &str, options: &Value) -> Result<Arc<dyn Observer>, ConfigError> {
        let ctor = self.observers.get(name).ok_or_else(|| {
            Self::unknown(PluginKind::Observer, name, self.observers.keys())
        })?;
        ctor(options)
    }

    /// Constructs the named translator with the given options.
    pub fn translator(
        &self,
        name: &str,
        options: &Value,
    ) -> Result<Arc<dyn Translator>, ConfigError> {
        let ctor = self.translators.get(name).ok_or_else(|| {
            Self::unknown(PluginKind::Translator, name, self.translators.keys())
        })?;
        ctor(options)
    }

    /// Constructs the named reporter with the given options.
    pub fn reporter(&self, name: &str, options: &Value) -> Result<Arc<dyn Reporter>, ConfigError> {
        let ctor = self.reporters.get(name).ok_or_else(|| {
            Self::unknown(PluginKind::Reporter, name, self.reporters.keys())
        })?;
        ctor(options)
    }

    fn unknown<'a>(
        kind: PluginKind,
        name: &str,
        known: impl Iterator<Item = &'a String>,
    ) -> ConfigError {
        let mut known: Vec<String> = known.cloned().collect();
        known.sort_unstable();
        ConfigError::UnknownPlugin {
            kind,
            name: name.to_string(),
            known,
        }
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("observers", &self.observers.keys().collect::<Vec<_>>())
            .field("translators", &self.translators.keys().collect::<Vec<_>>())
            .field("reporters", &self.reporters.keys().collect::<Vec<_>>())
            .finish()
    }
}
