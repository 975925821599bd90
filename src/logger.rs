//! The logger handle itself. Every attached logger shares the same resolved configuration and
//! only differs in the target it was created for.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::io;
use std::sync::Arc;

use crate::sink::Sink;
use crate::target::TargetInfo;

/// Turns a resolved name into the prefix that is prepended to every log call.
pub type Prefixer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Derives a name from the call site. Evaluated again for every call that passes the level gate.
pub type NameFn = Arc<dyn Fn(&NameContext<'_>) -> String + Send + Sync>;

/// The name a logger prefixes its output with.
#[derive(Clone)]
pub enum Name {
    /// A fixed name.
    Static(String),
    /// A name computed from a [`NameContext`] on every call.
    Dynamic(NameFn),
}

impl Name {
    /// A name computed from the target and the call's arguments each time something is logged.
    pub fn dynamic<F>(name_fn: F) -> Self
    where
        F: Fn(&NameContext<'_>) -> String + Send + Sync + 'static,
    {
        Name::Dynamic(Arc::new(name_fn))
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Static(name) => f.debug_tuple("Static").field(name).finish(),
            Name::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::Static(value.to_owned())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::Static(value)
    }
}

/// What a [`Name::Dynamic`] function gets to look at.
pub struct NameContext<'a> {
    /// The object or type the logger was attached to.
    pub target: &'a TargetInfo,
    /// The method being called, e.g. `"warn"`.
    pub method: &'a str,
    /// The call's arguments, without the prefix.
    pub args: &'a [&'a dyn Display],
}

/// The most severe method that is still let through. Methods are ranked by their position in the
/// configured function list, starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    /// An explicit rank. Negative ranks suppress everything, ranks past the end of the list allow
    /// everything.
    Rank(i64),
    /// The rank of the named method.
    Name(String),
}

impl From<&str> for Level {
    fn from(value: &str) -> Self {
        Level::Name(value.to_owned())
    }
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        Level::Name(value)
    }
}

impl From<i64> for Level {
    fn from(value: i64) -> Self {
        Level::Rank(value)
    }
}

/// The resolved configuration. Created once by [`crate::LoggerBuilder::build()`] and shared
/// between every logger created from it.
pub(crate) struct Config {
    pub name: Name,
    pub sinks: Vec<Arc<dyn Sink>>,
    pub functions: Vec<String>,
    pub prefixer: Prefixer,
    pub level: Level,
    /// Keep delivering to the remaining sinks after one of them fails.
    pub isolate_sinks: bool,
}

impl Config {
    fn rank_of(&self, method: &str) -> Option<usize> {
        self.functions.iter().position(|function| function == method)
    }

    /// The highest rank that passes the level gate.
    fn allowed_rank(&self) -> i64 {
        match &self.level {
            Level::Rank(rank) => *rank,
            Level::Name(name) => self.rank_of(name).map_or(-1, |rank| rank as i64),
        }
    }
}

/// Errors raised while forwarding a call to the sinks.
#[derive(Debug)]
pub enum DispatchError {
    /// The logger has no method with this name.
    UnknownMethod { method: String },
    /// One of the sinks does not implement the method being called.
    MissingBackendMethod { sink: String, method: String },
    /// A sink failed while handling the call.
    Sink {
        sink: String,
        method: String,
        error: io::Error,
    },
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Sink { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownMethod { method } => {
                write!(f, "The logger has no '{method}' method")
            }
            DispatchError::MissingBackendMethod { sink, method } => {
                write!(f, "Sink '{sink}' does not support '{method}'")
            }
            DispatchError::Sink {
                sink,
                method,
                error,
            } => write!(f, "Sink '{sink}' failed on '{method}' ({error})"),
        }
    }
}

/// A logger exposing one method per configured function name. Cloning is cheap, clones share the
/// same configuration.
#[derive(Clone)]
pub struct Logger {
    config: Arc<Config>,
    target: TargetInfo,
}

/// A single method of a [`Logger`], bound to its rank.
#[derive(Debug, Clone)]
pub struct Method {
    logger: Logger,
    rank: usize,
}

impl Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.config.name)
            .field("functions", &self.config.functions)
            .field("level", &self.config.level)
            .field("sinks", &self.config.sinks.len())
            .field("target", &self.target)
            .finish()
    }
}

impl Logger {
    pub(crate) fn new(config: Arc<Config>, target: TargetInfo) -> Self {
        Self { config, target }
    }

    /// The names of this logger's methods, in rank order.
    pub fn methods(&self) -> impl Iterator<Item = &str> + '_ {
        self.config.functions.iter().map(String::as_str)
    }

    /// Whether `method` is one of the configured function names.
    pub fn has_method(&self, method: &str) -> bool {
        self.config.rank_of(method).is_some()
    }

    /// Look up one of the logger's methods so it can be called later.
    pub fn method(&self, method: &str) -> Option<Method> {
        self.config.rank_of(method).map(|rank| Method {
            logger: self.clone(),
            rank,
        })
    }

    /// The object or type this logger was created for.
    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    /// Whether calls to `method` currently pass the level gate. Always false for unknown methods.
    pub fn enabled(&self, method: &str) -> bool {
        self.config
            .rank_of(method)
            .map_or(false, |rank| self.rank_enabled(rank))
    }

    /// Call the method named `method` with `args`. The sinks receive the prefix followed by
    /// `args`. Returns `Ok(true)` if the call was delivered and `Ok(false)` if it was filtered out
    /// by the level.
    pub fn call(&self, method: &str, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        match self.config.rank_of(method) {
            Some(rank) => self.dispatch(rank, args),
            None => Err(DispatchError::UnknownMethod {
                method: method.to_owned(),
            }),
        }
    }

    /// Call the `log` method.
    pub fn log(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("log", args)
    }

    /// Call the `info` method.
    pub fn info(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("info", args)
    }

    /// Call the `warn` method.
    pub fn warn(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("warn", args)
    }

    /// Call the `error` method.
    pub fn error(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("error", args)
    }

    /// Call the `trace` method.
    pub fn trace(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("trace", args)
    }

    /// Call the `debug` method.
    pub fn debug(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.call("debug", args)
    }

    fn rank_enabled(&self, rank: usize) -> bool {
        // The level is resolved on every call rather than once up front
        (rank as i64) <= self.config.allowed_rank()
    }

    fn dispatch(&self, rank: usize, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        let method = self.config.functions[rank].as_str();
        if !self.rank_enabled(rank) {
            log::trace!("Suppressed '{method}' call on {}", self.target.type_name);
            return Ok(false);
        }

        let name = match &self.config.name {
            Name::Static(name) => Cow::Borrowed(name.as_str()),
            Name::Dynamic(name_fn) => Cow::Owned(name_fn(&NameContext {
                target: &self.target,
                method,
                args,
            })),
        };
        let prefix = (self.config.prefixer)(&name);

        let mut log_args: Vec<&dyn Display> = Vec::with_capacity(args.len() + 1);
        log_args.push(&prefix);
        log_args.extend_from_slice(args);

        // Sinks are called in order. Without isolation the first failure stops the delivery,
        // otherwise the first failure is reported after every sink has been called.
        let mut first_error = None;
        for sink in &self.config.sinks {
            let result = if sink.supports(method) {
                sink.call(method, &log_args)
                    .map_err(|error| DispatchError::Sink {
                        sink: sink.name().to_owned(),
                        method: method.to_owned(),
                        error,
                    })
            } else {
                Err(DispatchError::MissingBackendMethod {
                    sink: sink.name().to_owned(),
                    method: method.to_owned(),
                })
            };

            if let Err(err) = result {
                if !self.config.isolate_sinks {
                    return Err(err);
                }
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }
}

impl Method {
    /// The method's name, e.g. `"warn"`.
    pub fn name(&self) -> &str {
        &self.logger.config.functions[self.rank]
    }

    /// The method's position in the function list.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The logger this method belongs to.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Same as [`Logger::call()`] for this method.
    pub fn call(&self, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        self.logger.dispatch(self.rank, args)
    }
}
