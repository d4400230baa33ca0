pub mod kv_store;
pub mod persistence;

pub use kv_store::{KeyValueStore, MemoryStore, SqliteStore};
pub use persistence::{FlushPolicy, Persisted, Persistence, PersistentStore};

use std::fs;
use std::path::Path;

/// Ensure the directory holding `path` exists
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
