//! Error types used by the tagpipe core.
//!
//! Three error enums, matching the three moments a pipeline can go wrong:
//!
//! - [`ConfigError`] — declaration-time failures (unknown plugin name, bad pattern
//!   supplied to a `report` declaration). Always raised immediately, never deferred
//!   to first use.
//! - [`PatternError`] — a subscription pattern that does not compile, surfaced at
//!   [`TagBus::receive`](crate::TagBus::receive) time.
//! - [`ExecError`] — a plugin capability failed (or panicked, for group members)
//!   while data was being processed. Propagates synchronously to whoever triggered
//!   delivery; the core never retries and never swallows.

use thiserror::Error;

/// Which capability table a plugin name was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Observer,
    Translator,
    Reporter,
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PluginKind::Observer => "observer",
            PluginKind::Translator => "translator",
            PluginKind::Reporter => "reporter",
        };
        f.write_str(s)
    }
}

/// # Declaration-time errors.
///
/// Raised by [`PipelineBuilder`](crate::PipelineBuilder) and
/// [`PluginRegistry`](crate::PluginRegistry) while a pipeline is being wired.
/// A mis-declared pipeline fails here, before any `emit` occurs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named plugin is not registered. The message carries the full set of
    /// known names so a typo is diagnosable from the error alone.
    #[error("the {kind} plugin named \"{name}\" is not found in {known:?}")]
    UnknownPlugin {
        /// Capability table that was searched.
        kind: PluginKind,
        /// The name that failed to resolve.
        name: String,
        /// Names that *are* registered for this kind, sorted.
        known: Vec<String>,
    },

    /// A plugin constructor rejected its options.
    #[error("the {kind} plugin \"{name}\" rejected its options: {error}")]
    BadOptions {
        kind: PluginKind,
        name: String,
        error: String,
    },

    /// The tag pattern given to a `report` declaration does not compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::UnknownPlugin { .. } => "config_unknown_plugin",
            ConfigError::BadOptions { .. } => "config_bad_options",
            ConfigError::Pattern(_) => "config_bad_pattern",
        }
    }
}

/// # Malformed subscription pattern.
///
/// Surfaced at [`TagBus::receive`](crate::TagBus::receive) time, not deferred
/// to emit time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PatternError {
    /// The pattern text is not a valid regular expression.
    #[error("invalid tag pattern \"{pattern}\": {source}")]
    Invalid {
        /// The pattern text as supplied.
        pattern: String,
        /// The underlying regex compile error.
        source: regex::Error,
    },
}

/// # Errors produced while a pipeline is executing.
///
/// These represent failures of individual task steps: a plugin raised during
/// [`Job::now`](crate::Job::now), or a group member panicked under
/// [`GroupScheduler::run_group`](crate::GroupScheduler::run_group).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExecError {
    /// A plugin capability returned an error.
    #[error("execution failed: {error}")]
    Failure {
        /// The underlying error message.
        error: String,
    },

    /// A group member panicked; observed as a join error by the scheduler.
    #[error("task '{task}' panicked during group run")]
    Panicked {
        /// Name of the panicked task.
        task: String,
    },
}

impl ExecError {
    /// Shorthand for [`ExecError::Failure`] from anything displayable.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        ExecError::Failure {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecError::Failure { .. } => "exec_failure",
            ExecError::Panicked { .. } => "exec_panicked",
        }
    }
}
