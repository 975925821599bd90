//! The default backend. Writes every call as a single line to STDERR, STDOUT, or a file.

use std::error::Error;
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use termcolor::{BufferedStandardStream, Color, ColorChoice, ColorSpec, WriteColor};

use super::{join_args, Sink};
use crate::builder::DEFAULT_FUNCTIONS;

/// The environment variable for choosing where the console writes to.
const PREFIX_LOG_ENV: &str = "PREFIX_LOG";

/// Where a [`ConsoleSink`] writes its output. If no explicit target is chosen the target is read
/// from the `PREFIX_LOG` environment variable, falling back to STDERR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to STDOUT.
    Stdout,
    /// Write to STDERR.
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

/// An error raised when the console's output file could not be opened.
#[derive(Debug)]
pub struct OpenError {
    pub path: PathBuf,
    pub error: io::Error,
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl Display for OpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not open '{}' ({})", self.path.display(), self.error)
    }
}

/// Similar to [`OutputTarget`], but contains the actual streams.
enum OutputTargetImpl {
    Stdout(BufferedStandardStream),
    Stderr(BufferedStandardStream),
    File(BufWriter<File>),
}

impl Debug for OutputTargetImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stream_description = |stream: &BufferedStandardStream| {
            if stream.supports_color() {
                "<stream with color support>"
            } else {
                "<stream>"
            }
        };

        match self {
            OutputTargetImpl::Stdout(stdout) => f
                .debug_tuple("Stdout")
                .field(&stream_description(stdout))
                .finish(),
            OutputTargetImpl::Stderr(stderr) => f
                .debug_tuple("Stderr")
                .field(&stream_description(stderr))
                .finish(),
            OutputTargetImpl::File(file) => f.debug_tuple("File").field(file).finish(),
        }
    }
}

impl OutputTargetImpl {
    fn new_stdout() -> Self {
        OutputTargetImpl::Stdout(BufferedStandardStream::stdout(color_support(
            atty::Stream::Stdout,
        )))
    }

    fn new_stderr() -> Self {
        OutputTargetImpl::Stderr(BufferedStandardStream::stderr(color_support(
            atty::Stream::Stderr,
        )))
    }

    fn new_file_path<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let file = File::options().create(true).append(true).open(path)?;

        Ok(Self::File(BufWriter::with_capacity(1024, file)))
    }

    fn open(target: OutputTarget) -> Result<Self, OpenError> {
        match target {
            OutputTarget::Stdout => Ok(Self::new_stdout()),
            OutputTarget::Stderr => Ok(Self::new_stderr()),
            OutputTarget::File(path) => {
                Self::new_file_path(&path).map_err(|error| OpenError { path, error })
            }
        }
    }

    /// Parse the value of the `PREFIX_LOG` environment variable. `stdout` and `stderr` select
    /// those streams, any other non-empty value is a file to append to. If that file cannot be
    /// opened a notice is written to STDERR and STDERR is used instead.
    fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("stdout") {
            return Self::new_stdout();
        }
        if value.is_empty() || value.eq_ignore_ascii_case("stderr") {
            return Self::new_stderr();
        }

        match Self::new_file_path(value) {
            Ok(target) => target,
            Err(err) => {
                eprintln!(
                    "Could not open '{value}' from {PREFIX_LOG_ENV} for logging, falling back to \
                     STDERR: {err}"
                );
                Self::new_stderr()
            }
        }
    }

    /// Write one line. Terminal streams are colored by method when they support it.
    fn write_line(&mut self, method: &str, args: &[&dyn Display]) -> io::Result<()> {
        match self {
            OutputTargetImpl::Stdout(stream) | OutputTargetImpl::Stderr(stream) => {
                write_colored_line(stream, method, args)?;
                stream.flush()
            }
            OutputTargetImpl::File(file) => {
                writeln!(file, "{}", join_args(args))?;
                file.flush()
            }
        }
    }
}

/// Write one line in the method's color. The color is reset even when writing the line fails, so
/// a failed call does not bleed into the next one.
fn write_colored_line<W: WriteColor + ?Sized>(
    stream: &mut W,
    method: &str,
    args: &[&dyn Display],
) -> io::Result<()> {
    let color = color_spec(method);
    if let Some(spec) = &color {
        stream.set_color(spec)?;
    }
    let result = write!(stream, "{}", join_args(args));
    if color.is_some() {
        stream.reset()?;
    }
    result?;

    writeln!(stream)
}

/// The color for a method's output, if it has one. Only the default method names are colored.
fn color_spec(method: &str) -> Option<ColorSpec> {
    let mut spec = ColorSpec::new();
    match method {
        "error" => spec.set_fg(Some(Color::Red)).set_bold(true),
        "warn" => spec.set_fg(Some(Color::Yellow)),
        "info" => spec.set_fg(Some(Color::Green)),
        "debug" | "trace" => spec.set_dimmed(true),
        _ => return None,
    };

    Some(spec)
}

/// Whether to use colors for `stream`. Considers the `CLICOLOR`, `CLICOLOR_FORCE`, and `NO_COLOR`
/// environment variables, and whether or not the stream is attached to a real TTY.
fn color_support(stream: atty::Stream) -> ColorChoice {
    choose_colors(
        std::env::var("CLICOLOR_FORCE").ok().as_deref(),
        std::env::var("NO_COLOR").ok().as_deref(),
        std::env::var("CLICOLOR").ok().as_deref(),
        atty::is(stream),
    )
}

/// The decision behind [`color_support()`]. `CLICOLOR_FORCE` wins over `NO_COLOR`, which wins over
/// `CLICOLOR`. A value of `0` disables the first two.
fn choose_colors(
    clicolor_force: Option<&str>,
    no_color: Option<&str>,
    clicolor: Option<&str>,
    is_tty: bool,
) -> ColorChoice {
    if clicolor_force.map_or(false, |value| value.trim() != "0") {
        return ColorChoice::Always;
    }
    if no_color.map_or(false, |value| value.trim() != "0") {
        return ColorChoice::Never;
    }
    if clicolor.map_or(false, |value| value.trim() == "0") {
        return ColorChoice::Never;
    }

    // If `CLICOLOR` is unset or set to a truthy value, and colors aren't forced, then terminal
    // support determines whether or not colors are used
    if is_tty {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// A console-like sink implementing `log`, `info`, `warn`, `error`, `trace`, and `debug`. Each call
/// is written as one line with its arguments separated by spaces, and is flushed immediately.
#[derive(Debug)]
pub struct ConsoleSink {
    output: Mutex<OutputTargetImpl>,
}

impl ConsoleSink {
    /// A console writing to an explicitly chosen target.
    pub fn new(target: OutputTarget) -> Result<Self, OpenError> {
        Ok(Self {
            output: Mutex::new(OutputTargetImpl::open(target)?),
        })
    }

    /// A console writing to the target named by the `PREFIX_LOG` environment variable. This is
    /// what the default backend uses.
    pub fn from_environment() -> Self {
        let env_value = std::env::var(PREFIX_LOG_ENV);
        Self {
            output: Mutex::new(OutputTargetImpl::from_env_value(
                env_value.as_deref().unwrap_or(""),
            )),
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn supports(&self, method: &str) -> bool {
        DEFAULT_FUNCTIONS.contains(&method)
    }

    fn call(&self, method: &str, args: &[&dyn Display]) -> io::Result<()> {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_line(method, args)
    }
}
