//! Store location with a platform-specific default.

use hobart_data::{DataError, ValuationStore};
use std::path::{Path, PathBuf};

/// Default store directory.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/hobart/`
/// - macOS: `~/Library/Application Support/hobart/`
/// - Windows: `%APPDATA%\hobart\`
pub(crate) fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hobart")
}

/// Default store database path.
pub(crate) fn default_store_path() -> PathBuf {
    default_store_dir().join("hobart.db")
}

/// Open the store, creating the parent directory if needed.
pub(crate) fn open_store(path: Option<&Path>) -> Result<ValuationStore, DataError> {
    let path = path.map_or_else(default_store_path, Path::to_path_buf);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    ValuationStore::new(&path)
}
