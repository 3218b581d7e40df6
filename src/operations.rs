//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the resolver and the
//! transition engine can be unit-tested without touching the real
//! filesystem.  Production code uses [`SystemFileSystemOps`]; tests use
//! `MockFileSystemOps`.

use std::io;
use std::path::Path;

/// Abstraction over the filesystem reads and writes done by the engine.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of the file at `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a parent directory cannot be created or the file
    /// cannot be written.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }
}

/// In-memory [`FileSystemOps`] for unit tests.
///
/// Pre-populate files with [`with_file`](Self::with_file), run the code
/// under test, then inspect the result with [`contents`](Self::contents).
///
/// # Example
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_file("/repo/AGENTS.local.md", "mine")
///     .with_file("/repo/AGENTS.md", "theirs");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::sync::Mutex<std::collections::HashMap<std::path::PathBuf, Vec<u8>>>,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockFileSystemOps {
    /// Create an empty mock with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file at `path` holding `contents`.
    #[must_use]
    pub fn with_file(self, path: impl Into<std::path::PathBuf>, contents: &str) -> Self {
        self.files
            .lock()
            .expect("mock files poisoned")
            .insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    /// Current contents of `path` as UTF-8, or `None` if absent.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .expect("mock files poisoned")
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
    }

    /// Number of [`FileSystemOps::write`] calls made so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .expect("mock files poisoned")
            .contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .expect("mock files poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.files
            .lock()
            .expect("mock files poisoned")
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
