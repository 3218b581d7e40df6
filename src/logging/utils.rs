//! Log file location, rotation, ANSI stripping, and timestamps.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Directory name used under the cache root.
const APP_DIR: &str = "local-overrides";

/// A log file larger than this is started afresh on the next run.
///
/// Hooks write a header on every commit and checkout, so without a cap the
/// files only ever grow.
pub(super) const MAX_LOG_BYTES: u64 = 256 * 1024;

/// Strip CSI escape sequences (`ESC [ ... final`), and drop the byte after
/// a bare `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            let _ = chars.by_ref().find(|inner| ('@'..='~').contains(inner));
        }
    }
    out
}

/// Cache root: `$XDG_CACHE_HOME`, else `~/.cache`.
fn cache_root() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".cache")
}

/// Log file path for `command`, creating `<cache>/local-overrides/` if
/// needed.  `None` when the directory cannot be created.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root().join(APP_DIR);
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Open `path` for appending, truncating it first once it has grown past
/// `max_bytes`.
pub(super) fn open_capped(path: &Path, max_bytes: u64) -> io::Result<File> {
    let oversized = fs::metadata(path).is_ok_and(|m| m.len() > max_bytes);
    let mut options = OpenOptions::new();
    options.create(true);
    if oversized {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path)
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

#[cfg(test)]
#[allow(unsafe_code)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn strip_ansi_removes_console_styling() {
        assert_eq!(
            strip_ansi("\x1b[33mWARN\x1b[0m  AGENTS.md drifted"),
            "WARN  AGENTS.md drifted"
        );
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mApplying overrides\x1b[0m"),
            "==> Applying overrides"
        );
        assert_eq!(strip_ansi("\x1b[2Jcleared"), "cleared");
        assert_eq!(strip_ansi("\x1b7saved"), "saved");
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn log_file_path_uses_xdg_cache_home() {
        let _lock = crate::logging::TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let tmp = tempfile::tempdir().unwrap();
        // SAFETY: XDG_CACHE_HOME is only changed while holding TEST_ENV_MUTEX.
        unsafe {
            std::env::set_var("XDG_CACHE_HOME", tmp.path());
        }
        let path = log_file_path("pre-commit");
        // SAFETY: as above.
        unsafe {
            std::env::remove_var("XDG_CACHE_HOME");
        }
        let path = path.expect("cache dir should be creatable");
        assert_eq!(path, tmp.path().join("local-overrides").join("pre-commit.log"));
        assert!(tmp.path().join("local-overrides").is_dir());
    }

    #[test]
    fn open_capped_appends_below_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("post-commit.log");
        fs::write(&path, "first run\n").unwrap();
        writeln!(open_capped(&path, 1024).unwrap(), "second run").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first run\nsecond run\n");
    }

    #[test]
    fn open_capped_truncates_oversized_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("post-commit.log");
        fs::write(&path, "x".repeat(64)).unwrap();
        writeln!(open_capped(&path, 16).unwrap(), "fresh").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn utc_now_follows_format() {
        let time = utc_now("%H:%M:%S");
        assert_eq!(time.len(), 8);
        assert_eq!(&time[2..3], ":");
        let date = utc_now("%Y-%m-%d %H:%M:%S");
        assert_eq!(date.len(), 19);
        assert_eq!(&date[10..11], " ");
    }
}
