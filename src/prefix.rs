//! Ready-made prefixers. A prefixer turns the logger's name into the first argument of every call.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// The default prefixer. Wraps the name in square brackets, so `App` becomes `[App]`.
pub fn bracketed(name: &str) -> String {
    format!("[{name}]")
}

/// A prefixer that puts the current wall clock time in front of the bracketed name, e.g.
/// `12:04:31.250 [App]`. Uses the local time zone when it can be determined and UTC otherwise.
pub fn timestamped() -> impl Fn(&str) -> String + Send + Sync + 'static {
    |name: &str| {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        match now.format(TIME_FORMAT) {
            Ok(time) => format!("{time} {}", bracketed(name)),
            Err(_) => bracketed(name),
        }
    }
}
