//! Store boundary: load and save whole documents.
//!
//! The document maps an encoded coordinate (`world,x,y,z`) to an object of
//! field values:
//!
//! ```text
//! {
//!   "world,10,64,-3": { "owner": "steve", "uses": 4 },
//!   "world_nether,0,70,0": { "tags": ["a", "b"] }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::{StoreError, StoreResult};

/// A full snapshot of persisted block data.
pub type StoreDocument = Map<String, Value>;

/// Where block data lives between restarts.
pub trait BlockStore: Send {
    /// Read the whole document. A store that was never written loads empty.
    fn load_all(&self) -> StoreResult<StoreDocument>;

    /// Replace the whole document.
    fn save_all(&self, document: &StoreDocument) -> StoreResult<()>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BlockStore for JsonFileStore {
    fn load_all(&self) -> StoreResult<StoreDocument> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                return Ok(StoreDocument::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if text.trim().is_empty() {
            return Ok(StoreDocument::new());
        }

        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save_all(&self, document: &StoreDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let text = serde_json::to_string_pretty(document).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        // Write beside the target and rename so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, text).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;

        tracing::trace!("Wrote {} records to {}", document.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<StoreDocument>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
        }
    }

    /// Copy of the current document.
    #[must_use]
    pub fn snapshot(&self) -> StoreDocument {
        self.document.lock().clone()
    }
}

impl BlockStore for MemoryStore {
    fn load_all(&self) -> StoreResult<StoreDocument> {
        Ok(self.snapshot())
    }

    fn save_all(&self, document: &StoreDocument) -> StoreResult<()> {
        *self.document.lock() = document.clone();
        Ok(())
    }
}
