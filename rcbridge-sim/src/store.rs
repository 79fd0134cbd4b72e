//! Directory-backed blob store: one flat file per blob, replaced atomically
//! through a temp file and rename.

use std::fs;
use std::io;
use std::path::PathBuf;

use rcbridge_core::{BlobStore, StoreError};

pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(backend)?;
        Ok(DirStore { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

fn backend(err: io::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

impl BlobStore for DirStore {
    fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(self.path(name)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => backend(err),
        })
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StoreError> {
        let tmp = self.path(&format!("{name}.tmp"));
        fs::write(&tmp, bytes).map_err(backend)?;
        fs::rename(&tmp, self.path(name)).map_err(backend)?;
        Ok(bytes.len())
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        fs::remove_file(self.path(name)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => backend(err),
        })
    }
}
