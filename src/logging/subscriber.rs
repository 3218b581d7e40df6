//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs::File;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;

use super::logger::{DRY_RUN_TARGET, STAGE_TARGET};
use super::utils::{MAX_LOG_BYTES, log_file_path, open_capped, strip_ansi, utc_now};

/// How console lines are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStyle {
    /// A user-run verb: stage headers and indented detail lines.
    Interactive,
    /// A git hook: every line is prefixed with the program name so it stands
    /// out among git's own output.
    Hook,
}

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl MessageExtractor {
    fn of(event: &tracing::Event<'_>) -> String {
        let mut extractor = Self::default();
        event.record(&mut extractor);
        extractor.message
    }
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Appends every event to `<cache>/local-overrides/<command>.log`,
/// timestamped and with ANSI codes stripped.
///
/// Installed with a `DEBUG` filter regardless of console verbosity, so the
/// file always has the full story of a hook run.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Open the log for `command` and write a run header.
    ///
    /// `None` if the cache directory or the file is unavailable; logging then
    /// continues on the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let mut file = open_capped(&path, MAX_LOG_BYTES).ok()?;
        let version = option_env!("LOCAL_OVERRIDES_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let cwd = std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        writeln!(
            file,
            "--- local-overrides {version} {command} {} in {cwd}",
            utc_now("%Y-%m-%d %H:%M:%S")
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }

    fn render(level: Level, target: &str, msg: &str) -> String {
        let tag = match (level, target) {
            (Level::INFO, STAGE_TARGET) => "==>",
            (Level::INFO, DRY_RUN_TARGET) => "[dry run]",
            (Level::ERROR, _) => "[error]",
            (Level::WARN, _) => "[warn]",
            (Level::INFO, _) => "",
            _ => "[debug]",
        };
        let ts = utc_now("%H:%M:%S");
        if tag.is_empty() {
            format!("[{ts}] {msg}")
        } else {
            format!("[{ts}] {tag} {msg}")
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let msg = strip_ansi(&MessageExtractor::of(event));
        let line = Self::render(*metadata.level(), metadata.target(), &msg);
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] for terminal output.
struct ConsoleFormatter {
    style: ConsoleStyle,
}

impl ConsoleFormatter {
    fn render(&self, level: Level, target: &str, msg: &str) -> String {
        match (self.style, level) {
            (ConsoleStyle::Hook, Level::ERROR) => {
                format!("local-overrides: \x1b[31merror:\x1b[0m {msg}")
            }
            (ConsoleStyle::Hook, Level::WARN) => {
                format!("local-overrides: \x1b[33mwarning:\x1b[0m {msg}")
            }
            (ConsoleStyle::Hook, _) if target == DRY_RUN_TARGET => {
                format!("local-overrides: [DRY RUN] {msg}")
            }
            (ConsoleStyle::Hook, _) => format!("local-overrides: {msg}"),
            (ConsoleStyle::Interactive, Level::ERROR) => format!("\x1b[31mERROR\x1b[0m {msg}"),
            (ConsoleStyle::Interactive, Level::WARN) => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            (ConsoleStyle::Interactive, Level::INFO) if target == STAGE_TARGET => {
                format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            (ConsoleStyle::Interactive, Level::INFO) if target == DRY_RUN_TARGET => {
                format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            (ConsoleStyle::Interactive, Level::INFO) => format!("  {msg}"),
            (ConsoleStyle::Interactive, _) => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let msg = MessageExtractor::of(event);
        writeln!(
            writer,
            "{}",
            self.render(*metadata.level(), metadata.target(), &msg)
        )
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; `debug`
/// reaches the console only when `verbose`.  The file layer records
/// everything from `debug` up.  A second call in the same process is
/// ignored.
pub fn init_subscriber(verbose: bool, command: &str, style: ConsoleStyle) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter { style })
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();
}
