//! Attaching loggers to objects and types.
//!
//! An object target owns a [`Members`] bag and gets the logger installed into that bag. A type
//! target gets the logger installed into a process-wide prototype for that type instead, which
//! every instance falls back to when it does not have a member of its own.

use once_cell::sync::Lazy;
use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use crate::logger::{Config, DispatchError, Logger, Method};

/// The accessor loggers are installed under unless configured otherwise.
pub const DEFAULT_ACCESSOR: &str = "logger";

/// Passing this as the accessor flattens the logger's methods onto the target.
pub const FLATTEN_ACCESSOR: &str = "this";

/// The members installed on each type's prototype, keyed by the type.
static PROTOTYPES: Lazy<RwLock<HashMap<TypeId, Members>>> = Lazy::new(Default::default);

/// How a logger is exposed on its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Install the logger as a single member with this name.
    Named(String),
    /// Install every method of the logger as its own member, replacing existing members with the
    /// same names.
    Flatten,
}

impl From<&str> for Accessor {
    fn from(value: &str) -> Self {
        if value == FLATTEN_ACCESSOR {
            Accessor::Flatten
        } else {
            Accessor::Named(value.to_owned())
        }
    }
}

impl From<String> for Accessor {
    fn from(value: String) -> Self {
        if value == FLATTEN_ACCESSOR {
            Accessor::Flatten
        } else {
            Accessor::Named(value)
        }
    }
}

impl Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Named(name) => write!(f, "'{name}'"),
            Accessor::Flatten => write!(f, "the target itself"),
        }
    }
}

/// The kind of target a logger was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A single object.
    Object,
    /// A type, shared by all of its instances.
    Type,
    /// No target, the logger is used on its own.
    Standalone,
}

/// Describes what a logger was attached to. Handed to dynamic names on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub kind: TargetKind,
    pub type_name: &'static str,
}

impl TargetInfo {
    pub(crate) fn object<T: ?Sized>() -> Self {
        Self {
            kind: TargetKind::Object,
            type_name: type_name::<T>(),
        }
    }

    pub(crate) fn of_type<T: ?Sized>() -> Self {
        Self {
            kind: TargetKind::Type,
            type_name: type_name::<T>(),
        }
    }

    pub(crate) fn standalone() -> Self {
        Self {
            kind: TargetKind::Standalone,
            type_name: type_name::<Logger>(),
        }
    }
}

/// Something installed on a target.
#[derive(Debug, Clone)]
pub enum Member {
    /// A whole logger, installed under a named accessor.
    Logger(Logger),
    /// A single flattened logger method.
    Method(Method),
}

/// The members of a target. Can be used directly as a plain object target.
#[derive(Debug, Clone, Default)]
pub struct Members {
    members: BTreeMap<String, Member>,
}

impl Members {
    /// An empty set of members, usable as a plain object target.
    pub fn new() -> Self {
        Self::default()
    }

    /// The object's own member called `name`. Does not look at the type's prototype.
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// The names of all members, in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.keys().map(String::as_str)
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing has been installed.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Remove a member, e.g. to detach a logger again.
    pub fn remove(&mut self, name: &str) -> Option<Member> {
        self.members.remove(name)
    }

    /// Install `logger` the way `accessor` says. Installing again replaces what was installed
    /// before.
    pub fn install(&mut self, accessor: &Accessor, logger: Logger) {
        match accessor {
            Accessor::Named(name) => {
                self.members.insert(name.clone(), Member::Logger(logger));
            }
            Accessor::Flatten => {
                let methods: Vec<Method> = logger
                    .methods()
                    .filter_map(|name| logger.method(name))
                    .collect();
                for method in methods {
                    self.members
                        .insert(method.name().to_owned(), Member::Method(method));
                }
            }
        }
    }
}

/// An object loggers can be attached to.
pub trait Target: 'static {
    /// The object's own members.
    fn members(&self) -> &Members;

    /// Mutable access to the object's own members, used when attaching.
    fn members_mut(&mut self) -> &mut Members;
}

impl Target for Members {
    fn members(&self) -> &Members {
        self
    }

    fn members_mut(&mut self) -> &mut Members {
        self
    }
}

/// Lookups on a [`Target`] that fall back to the target type's prototype.
pub trait TargetExt: Target {
    /// The member called `name`, either the object's own or the one on its type's prototype.
    fn member(&self, name: &str) -> Option<Member> {
        self.members()
            .get(name)
            .cloned()
            .or_else(|| prototype_member(TypeId::of::<Self>(), name))
    }

    /// The logger installed under `accessor`.
    fn logger_at(&self, accessor: &str) -> Option<Logger> {
        match self.member(accessor)? {
            Member::Logger(logger) => Some(logger),
            Member::Method(_) => None,
        }
    }

    /// The logger installed under the default `logger` accessor.
    fn logger(&self) -> Option<Logger> {
        self.logger_at(DEFAULT_ACCESSOR)
    }

    /// Call a flattened logger method.
    fn call(&self, method: &str, args: &[&dyn Display]) -> Result<bool, DispatchError> {
        match self.member(method) {
            Some(Member::Method(method)) => method.call(args),
            _ => Err(DispatchError::UnknownMethod {
                method: method.to_owned(),
            }),
        }
    }
}

impl<T: Target + ?Sized> TargetExt for T {}

fn prototype_member(type_id: TypeId, name: &str) -> Option<Member> {
    PROTOTYPES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .and_then(|members| members.get(name).cloned())
}

/// A handle to the prototype of `T`. Everything installed here is visible from every instance of
/// `T` through [`TargetExt`], unless the instance has its own member with the same name.
pub struct Prototype<T: 'static> {
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Clone for Prototype<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Prototype<T> {}

impl<T: 'static> Debug for Prototype<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Prototype").field(&type_name::<T>()).finish()
    }
}

impl<T: 'static> Prototype<T> {
    /// The prototype of `T`. Nothing is installed until a factory attaches to it.
    pub fn of() -> Self {
        Self {
            _type: PhantomData,
        }
    }

    /// The member called `name` on the prototype.
    pub fn member(&self, name: &str) -> Option<Member> {
        prototype_member(TypeId::of::<T>(), name)
    }

    /// The logger installed on the prototype under `accessor`.
    pub fn logger_at(&self, accessor: &str) -> Option<Logger> {
        match self.member(accessor)? {
            Member::Logger(logger) => Some(logger),
            Member::Method(_) => None,
        }
    }

    /// The logger installed on the prototype under the default `logger` accessor.
    pub fn logger(&self) -> Option<Logger> {
        self.logger_at(DEFAULT_ACCESSOR)
    }

    /// A snapshot of everything installed on the prototype.
    pub fn members(&self) -> Members {
        PROTOTYPES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()
            .unwrap_or_default()
    }

    /// Remove everything installed on the prototype.
    pub fn clear(&self) {
        PROTOTYPES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeId::of::<T>());
    }

    fn install(&self, accessor: &Accessor, logger: Logger) {
        PROTOTYPES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<T>())
            .or_default()
            .install(accessor, logger);
    }
}

/// Creates loggers from a resolved configuration and attaches them to targets. Construct one
/// using the [`crate::LoggerBuilder`].
#[derive(Clone)]
pub struct LoggerFactory {
    config: Arc<Config>,
    accessor: Accessor,
}

impl Debug for LoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerFactory")
            .field("name", &self.config.name)
            .field("functions", &self.config.functions)
            .field("accessor", &self.accessor)
            .finish()
    }
}

impl LoggerFactory {
    pub(crate) fn new(config: Config, accessor: Accessor) -> Self {
        Self {
            config: Arc::new(config),
            accessor,
        }
    }

    /// Where this factory installs its loggers.
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// Attach a new logger to `target` and return the target.
    pub fn attach<'t, T: Target>(&self, target: &'t mut T) -> &'t mut T {
        let logger = Logger::new(self.config.clone(), TargetInfo::object::<T>());
        target.members_mut().install(&self.accessor, logger);
        log::debug!(
            "Attached logger to {} under {}",
            type_name::<T>(),
            self.accessor
        );

        target
    }

    /// Attach a new logger to the prototype of `T`, making it available on every instance of `T`.
    pub fn attach_type<T: 'static>(&self) -> Prototype<T> {
        let prototype = Prototype::<T>::of();
        let logger = Logger::new(self.config.clone(), TargetInfo::of_type::<T>());
        prototype.install(&self.accessor, logger);
        log::debug!(
            "Attached logger to the {} prototype under {}",
            type_name::<T>(),
            self.accessor
        );

        prototype
    }

    /// A logger that is not attached to anything. The returned logger is used directly, so the
    /// configured accessor does not apply.
    pub fn standalone(&self) -> Logger {
        Logger::new(self.config.clone(), TargetInfo::standalone())
    }
}
