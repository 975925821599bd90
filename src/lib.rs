//! Attach name-prefixed, level-filtered loggers to objects and types.
//!
//! A [`LoggerBuilder`] resolves a configuration into a [`LoggerFactory`], which creates loggers
//! and installs them on [`Target`]s, on the prototype of a type, or hands them out directly. Every
//! logger method forwards its arguments to the configured [`Sink`]s with the prefix in front.
//!
//! ```
//! use std::sync::Arc;
//! use prefix_log::{LoggerBuilder, MemorySink, Members, TargetExt};
//!
//! let sink = Arc::new(MemorySink::new("memory"));
//! let mut app = Members::new();
//! LoggerBuilder::new("App")
//!     .with_backend(sink.clone())
//!     .build()
//!     .unwrap()
//!     .attach(&mut app);
//!
//! app.logger().unwrap().warn(&[&"watch out!"]).unwrap();
//! assert_eq!(sink.calls()[0].args, ["[App]", "watch out!"]);
//! ```

use once_cell::sync::OnceCell;
use std::sync::Arc;

mod builder;
mod logger;
pub mod prefix;
mod sink;
mod target;

pub use builder::{BuildError, LoggerBuilder, DEFAULT_FUNCTIONS, DEFAULT_NAME};
pub use logger::{DispatchError, Level, Logger, Method, Name, NameContext, NameFn, Prefixer};
pub use sink::{
    ConsoleSink, LogFacadeSink, MemorySink, OpenError, OutputTarget, RecordedCall, Sink,
};
pub use target::{
    Accessor, LoggerFactory, Member, Members, Prototype, Target, TargetExt, TargetInfo,
    TargetKind, DEFAULT_ACCESSOR, FLATTEN_ACCESSOR,
};

/// The process-wide console. Initialized on first use from the `PREFIX_LOG` environment variable
/// and then shared by every logger that does not configure its own backend.
static CONSOLE_INSTANCE: OnceCell<Arc<ConsoleSink>> = OnceCell::new();

/// The console loggers write to by default.
pub fn console() -> Arc<ConsoleSink> {
    CONSOLE_INSTANCE
        .get_or_init(|| Arc::new(ConsoleSink::from_environment()))
        .clone()
}

/// Shorthand for [`LoggerBuilder::new()`].
pub fn create(name: impl Into<Name>) -> LoggerBuilder {
    LoggerBuilder::new(name)
}
