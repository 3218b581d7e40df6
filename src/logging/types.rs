//! The [`Log`] trait and the in-memory recorder used by unit tests.

/// Abstraction over logging backends.
///
/// The engine and the command handlers log through this trait so they can
/// be exercised in tests without a global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}

/// A single recorded log entry.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// A dry-run entry.
    DryRun(String),
}

#[cfg(test)]
impl LogEntry {
    /// The message text regardless of level.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Stage(m)
            | Self::Info(m)
            | Self::Debug(m)
            | Self::Warn(m)
            | Self::Error(m)
            | Self::DryRun(m) => m,
        }
    }
}

/// [`Log`] implementation that keeps every entry in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: std::sync::Mutex<Vec<LogEntry>>,
}

/// Implement the [`Log`] methods by pushing the matching [`LogEntry`].
#[cfg(test)]
macro_rules! record_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

#[cfg(test)]
impl RecordingLog {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages recorded as warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Warn(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Messages recorded as dry-run actions.
    #[must_use]
    pub fn dry_runs(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::DryRun(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Whether any entry's message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message().contains(needle))
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    record_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        dry_run => DryRun,
    );
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn recording_log_keeps_order_and_levels() {
        let log = RecordingLog::new();
        log.stage("Applying overrides");
        log.warn("careful");
        log.dry_run("would apply: AGENTS.md");
        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], LogEntry::Stage("Applying overrides".to_string()));
        assert_eq!(log.warnings(), ["careful"]);
        assert_eq!(log.dry_runs(), ["would apply: AGENTS.md"]);
        assert!(log.contains("AGENTS.md"));
    }
}
