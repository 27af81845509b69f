//! # Logger
//!
//! Structured logging for Depot. One builder configures console output, an optional rolling
//! log directory (plain or JSON lines), and the level filter.
//!
//! [`LoggerBuilder::build`] only assembles the subscriber, so callers (tests mostly) can scope it
//! with [`tracing::subscriber::with_default`]. [`LoggerBuilder::init`] installs it globally.
//!
//! ## Example
//!
//! ```rust
//! # use depot_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("depot-server")
//!     .level(LevelFilter::DEBUG)
//!     .directive(Some("depot=debug,tower_http=info"))
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// A fully assembled subscriber that has not been installed.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

#[derive(Debug)]
struct Settings {
    console: bool,
    level: LevelFilter,
    directive: Option<String>,
    directory: Option<PathBuf>,
    json: bool,
    max_files: usize,
    rotation: Rotation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            level: LevelFilter::INFO,
            directive: None,
            directory: None,
            json: false,
            max_files: DEFAULT_MAX_FILES,
            rotation: Rotation::DAILY,
        }
    }
}

/// Builder state before a name is chosen.
#[derive(Debug)]
pub struct Unnamed;

/// Builder state once the log file prefix is known.
#[derive(Debug)]
pub struct Named(String);

/// Configures the process-wide subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N = Unnamed> {
    settings: Settings,
    name: N,
}

impl LoggerBuilder<Unnamed> {
    /// Names the logger; the name prefixes rolling log files (`depot-server.2026-10-18.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()) }
    }
}

impl LoggerBuilder<Named> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Module-directed filter such as `depot=debug,hyper=info`.
    ///
    /// Without one, `RUST_LOG` is consulted on top of [`LoggerBuilder::level`].
    #[must_use]
    pub fn directive(mut self, directive: Option<impl Into<String>>) -> Self {
        self.settings.directive = directive.map(Into::into).filter(|d| !d.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Also write rolling log files into `directory`.
    #[must_use]
    pub fn directory(mut self, directory: Option<impl Into<PathBuf>>) -> Self {
        self.settings.directory = directory.map(Into::into);
        self
    }

    /// Write file output as JSON lines. Console output stays compact.
    #[must_use]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }

    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Assembles the subscriber without installing it.
    ///
    /// # Errors
    /// - [`LoggerError::InvalidConfiguration`] for an empty name, a bad directive, zero
    ///   `max_files`, or when no output is enabled.
    /// - [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory is unusable.
    pub fn build(self) -> Result<(BoxedSubscriber, Logger), LoggerError> {
        let Self { settings, name: Named(name) } = self;

        if name.trim().is_empty() {
            return Err(LoggerError::invalid("Logger name cannot be empty"));
        }
        if settings.max_files == 0 {
            return Err(LoggerError::invalid("max_files must be greater than zero"));
        }

        let filter = env_filter(&settings)?;
        let mut layers = Vec::new();

        if settings.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match settings.directory {
            Some(directory) => {
                fs::create_dir_all(&directory)
                    .context(format!("Failed to create {}", directory.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(&directory)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::invalid("Enable console or file output"));
        }

        let subscriber: BoxedSubscriber =
            Box::new(tracing_subscriber::registry().with(filter).with(layers));
        Ok((subscriber, Logger { guard }))
    }

    /// Assembles the subscriber and installs it for the whole process.
    ///
    /// The returned [`Logger`] owns the file writer; keep it alive until shutdown.
    ///
    /// # Errors
    /// Everything [`LoggerBuilder::build`] returns, plus [`LoggerError::Subscriber`] when a
    /// global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let (subscriber, logger) = self.build()?;
        subscriber.try_init()?;
        Ok(logger)
    }
}

/// Handle to the non-blocking file writer.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: Unnamed }
    }

    /// Whether log files are being written.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

/// Parses a level name (`trace` .. `error`, or `off`), case-insensitively.
///
/// # Errors
/// [`LoggerError::InvalidConfiguration`] for anything else.
pub fn parse_level(raw: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(raw.trim())
        .map_err(|_| LoggerError::invalid(format!("Unknown log level {raw:?}")))
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.directive {
        Some(directive) => builder
            .parse(directive)
            .map_err(|e| LoggerError::invalid(format!("Invalid filter {directive:?}: {e}"))),
        None => Ok(builder.from_env_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(matches!(parse_level("loud"), Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn blank_directive_is_ignored() {
        let builder = Logger::builder().name("depot").directive(Some("  "));
        assert!(builder.settings.directive.is_none());
    }

    #[test]
    fn bad_settings_are_rejected_before_touching_disk() {
        let no_output = Logger::builder().name("depot").console(false).build();
        assert!(matches!(no_output, Err(LoggerError::InvalidConfiguration { .. })));

        let no_files = Logger::builder().name("depot").max_files(0).build();
        assert!(matches!(no_files, Err(LoggerError::InvalidConfiguration { .. })));

        let bad_filter = Logger::builder().name("depot").directive(Some("depot=loud")).build();
        assert!(matches!(bad_filter, Err(LoggerError::InvalidConfiguration { .. })));

        let unnamed = Logger::builder().name(" ").build();
        assert!(matches!(unnamed, Err(LoggerError::InvalidConfiguration { .. })));
    }
}
