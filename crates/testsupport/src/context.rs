//! Isolated on-disk test contexts.

use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

static INIT_LOGGING: Once = Once::new();

/// Initialise the test logger once per process.
///
/// Controlled by `RUST_LOG` as usual; safe to call from every test.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default())
            .is_test(true)
            .try_init();
    });
}

/// A temporary directory for page files, removed on drop.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let dir = TestDir::new();
/// let path = dir.file("table.bin");
/// assert!(path.starts_with(dir.path()));
/// ```
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        init_logging();
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file named `name` inside this directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
