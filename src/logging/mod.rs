//! Console and file logging for CLI verbs and git hooks.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{ConsoleStyle, init_subscriber};
pub use types::Log;

#[cfg(test)]
pub use types::{LogEntry, RecordingLog};

/// Serializes `XDG_CACHE_HOME` changes across parallel test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// A [`Logger`] whose events reach a real [`FileLayer`](subscriber::FileLayer)
/// under a private cache directory, through a thread-local subscriber.
///
/// Keep the returned temp dir and guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used, unsafe_code)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let cache = tempfile::tempdir().expect("create cache dir");
    let (file_layer, log) = {
        let _env = TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: every XDG_CACHE_HOME change in tests holds TEST_ENV_MUTEX.
        unsafe { std::env::set_var("XDG_CACHE_HOME", cache.path()) };
        let layer = subscriber::FileLayer::new("test");
        let log = Logger::new("test");
        // SAFETY: as above.
        unsafe { std::env::remove_var("XDG_CACHE_HOME") };
        (layer.expect("open test log"), log)
    };
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG)),
    );
    let guard = tracing::dispatcher::set_default(&dispatch);
    (log, cache, guard)
}
