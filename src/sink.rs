//! The backends log calls are forwarded to.

use std::fmt::{Display, Write as _};
use std::io;
use std::sync::{Mutex, PoisonError};

mod console;

pub use console::{ConsoleSink, OpenError, OutputTarget};

/// A logging backend. A sink exposes a set of named methods, and a logger forwards each of its
/// calls to the sink's method with the same name. The first argument is always the logger's
/// prefix.
pub trait Sink: Send + Sync {
    /// A short name used in error messages.
    fn name(&self) -> &str;

    /// Whether the sink implements `method`. Checked before every call.
    fn supports(&self, method: &str) -> bool;

    /// Handle a call to `method`. Only called when [`supports()`][Self::supports()] returned true.
    fn call(&self, method: &str, args: &[&dyn Display]) -> io::Result<()>;
}

/// Render the arguments the way a console would, separated by single spaces.
pub(crate) fn join_args(args: &[&dyn Display]) -> String {
    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        // Writing to a `String` cannot fail
        let _ = write!(line, "{arg}");
    }

    line
}

/// Forwards calls to the [`log`] crate's facade. `log` and `info` become info records, the other
/// default method names map onto the level with the same name.
#[derive(Debug, Clone)]
pub struct LogFacadeSink {
    target: String,
}

impl Default for LogFacadeSink {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

impl LogFacadeSink {
    /// Emit records with `target` as the record target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    fn level_for(method: &str) -> Option<log::Level> {
        match method {
            "log" | "info" => Some(log::Level::Info),
            "warn" => Some(log::Level::Warn),
            "error" => Some(log::Level::Error),
            "debug" => Some(log::Level::Debug),
            "trace" => Some(log::Level::Trace),
            _ => None,
        }
    }
}

impl Sink for LogFacadeSink {
    fn name(&self) -> &str {
        "log"
    }

    fn supports(&self, method: &str) -> bool {
        Self::level_for(method).is_some()
    }

    fn call(&self, method: &str, args: &[&dyn Display]) -> io::Result<()> {
        match Self::level_for(method) {
            Some(level) => {
                log::log!(target: self.target.as_str(), level, "{}", join_args(args));
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("no log level for '{method}'"),
            )),
        }
    }
}

/// A call captured by a [`MemorySink`], with the arguments already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<String>,
}

/// Keeps every call in memory. Useful for tests and for capturing log output.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    /// The supported methods, or `None` to accept any method.
    methods: Option<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MemorySink {
    /// A sink that accepts any method name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A sink that only implements `methods`.
    pub fn with_methods<I, S>(name: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            methods: Some(methods.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A copy of the calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the calls received so far.
    pub fn take(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, method: &str) -> bool {
        match &self.methods {
            Some(methods) => methods.iter().any(|m| m == method),
            None => true,
        }
    }

    fn call(&self, method: &str, args: &[&dyn Display]) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method: method.to_owned(),
                args: args.iter().map(|arg| arg.to_string()).collect(),
            });

        Ok(())
    }
}
