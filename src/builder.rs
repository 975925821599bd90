//! A builder interface for configuring prefixed loggers.

use std::error::Error;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::logger::{Config, Level, Name, Prefixer};
use crate::sink::Sink;
use crate::target::{Accessor, LoggerFactory, DEFAULT_ACCESSOR};

/// The method names a logger gets when none are configured, from least to most severe.
pub const DEFAULT_FUNCTIONS: [&str; 6] = ["log", "info", "warn", "error", "trace", "debug"];

/// The name used when none is given.
pub const DEFAULT_NAME: &str = "logger";

/// Configures a [`LoggerFactory`]. Every setting is optional.
pub struct LoggerBuilder {
    name: Name,
    /// The sinks calls are forwarded to. `None` means the process-wide console from
    /// [`crate::console()`].
    backends: Option<Vec<Arc<dyn Sink>>>,
    functions: Vec<String>,
    accessor: Accessor,
    prefixer: Prefixer,
    /// Defaults to the last function when not set.
    level: Option<Level>,
    isolate_sinks: bool,
}

/// An error raised when the builder's configuration is inconsistent. This can be converted back to
/// the builder using `Into<LoggerBuilder>`.
#[derive(Debug)]
pub enum BuildError {
    /// The same method name was configured more than once.
    DuplicateFunction {
        builder: LoggerBuilder,
        function: String,
    },
    /// The level names a method that is not in the function list.
    UnknownLevel {
        builder: LoggerBuilder,
        level: String,
    },
}

impl From<BuildError> for LoggerBuilder {
    fn from(value: BuildError) -> Self {
        match value {
            BuildError::DuplicateFunction { builder, .. }
            | BuildError::UnknownLevel { builder, .. } => builder,
        }
    }
}

impl Error for BuildError {}

impl Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::DuplicateFunction {
                builder: _,
                function,
            } => write!(f, "The function '{function}' is listed more than once"),
            BuildError::UnknownLevel { builder, level } => write!(
                f,
                "The level '{level}' is not one of the configured functions ({})",
                builder.functions.join(", ")
            ),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("name", &self.name)
            .field(
                "backends",
                &self
                    .backends
                    .as_ref()
                    .map(|sinks| sinks.iter().map(|sink| sink.name()).collect::<Vec<_>>()),
            )
            .field("functions", &self.functions)
            .field("accessor", &self.accessor)
            .field("level", &self.level)
            .field("isolate_sinks", &self.isolate_sinks)
            .finish()
    }
}

impl LoggerBuilder {
    /// Start configuring loggers that prefix their output with `name`. Pass a [`Name::dynamic()`]
    /// to compute the name on every call.
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            backends: None,
            functions: DEFAULT_FUNCTIONS.map(String::from).to_vec(),
            accessor: Accessor::Named(DEFAULT_ACCESSOR.to_owned()),
            prefixer: Arc::new(crate::prefix::bracketed),
            level: None,
            isolate_sinks: false,
        }
    }

    /// Resolve the configuration. The resulting factory can attach any number of loggers, which
    /// all share this configuration.
    pub fn build(self) -> Result<LoggerFactory, BuildError> {
        if let Some(function) = first_duplicate(&self.functions) {
            return Err(BuildError::DuplicateFunction {
                builder: self,
                function,
            });
        }

        let level = match &self.level {
            Some(Level::Name(level)) if !self.functions.contains(level) => {
                let level = level.clone();
                return Err(BuildError::UnknownLevel {
                    builder: self,
                    level,
                });
            }
            Some(level) => level.clone(),
            // The last function is the most permissive level
            None => self
                .functions
                .last()
                .map_or(Level::Rank(0), |last| Level::Name(last.clone())),
        };

        let sinks = self
            .backends
            .unwrap_or_else(|| vec![crate::console() as Arc<dyn Sink>]);

        Ok(LoggerFactory::new(
            Config {
                name: self.name,
                sinks,
                functions: self.functions,
                prefixer: self.prefixer,
                level,
                isolate_sinks: self.isolate_sinks,
            },
            self.accessor,
        ))
    }

    /// Forward calls to a single sink instead of the console.
    pub fn with_backend(mut self, sink: Arc<dyn Sink>) -> Self {
        self.backends = Some(vec![sink]);
        self
    }

    /// Same as [`with_backend()`][Self::with_backend()].
    pub fn with_logger(self, sink: Arc<dyn Sink>) -> Self {
        self.with_backend(sink)
    }

    /// Forward calls to every sink in `sinks`, in order.
    pub fn with_backends<I>(mut self, sinks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Sink>>,
    {
        self.backends = Some(sinks.into_iter().collect());
        self
    }

    /// Add a sink after the ones configured so far. If no sinks were configured yet this replaces
    /// the console.
    pub fn add_backend(mut self, sink: Arc<dyn Sink>) -> Self {
        self.backends.get_or_insert_with(Vec::new).push(sink);
        self
    }

    /// The logger's method names, ordered from least to most severe. Every sink is expected to
    /// implement all of them.
    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }

    /// Where the logger is installed on its target. `"this"` installs the methods on the target
    /// directly.
    pub fn with_accessor(mut self, accessor: impl Into<Accessor>) -> Self {
        self.accessor = accessor.into();
        self
    }

    /// Replace the default `[name]` prefix. See [`crate::prefix`] for ready-made prefixers.
    pub fn with_prefixer<F>(mut self, prefixer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.prefixer = Arc::new(prefixer);
        self
    }

    /// Only let through calls to methods ranked at or below this level.
    pub fn with_level(mut self, level: impl Into<Level>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// When enabled, a failing sink no longer prevents the sinks after it from receiving the call.
    /// The first failure is still returned.
    pub fn with_sink_isolation(mut self, isolate: bool) -> Self {
        self.isolate_sinks = isolate;
        self
    }
}

fn first_duplicate(functions: &[String]) -> Option<String> {
    functions
        .iter()
        .enumerate()
        .find(|(i, function)| functions[..*i].contains(*function))
        .map(|(_, function)| function.clone())
}
