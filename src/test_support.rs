//! Shared fixtures for tests.

use crate::context::CONFIG_DIR;
use tempfile::TempDir;

/// A vault root with its `.config/` subdirectory in place.
pub fn create_test_vault() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join(CONFIG_DIR)).unwrap();
    temp
}
