// Key-value blob storage behind the history cache
//
// One serialized blob per key. Swapping the store must not change the
// history contract, so the trait stays generic: strings in, strings
// out.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistent string-blob store keyed by name
pub trait BlobStore: Send + Sync {
    /// Load a blob. Missing or unreadable blobs come back as None;
    /// read failures never propagate.
    fn load(&self, key: &str) -> Option<String>;

    fn save(&mut self, key: &str, blob: &str) -> io::Result<()>;

    fn delete(&mut self, key: &str) -> io::Result<()>;
}

/// File-backed store: `<dir>/<key>.json`, written via temp file and
/// atomic rename.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user data directory, e.g. `~/.local/share/linkgrab`
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkgrab")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl BlobStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "blob unreadable, treating as absent");
                None
            }
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let temp = temp_path(&path);
        fs::write(&temp, blob)?;
        fs::rename(&temp, &path)
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".part");
    PathBuf::from(os)
}

/// In-memory store for tests and embedders without a disk
#[derive(Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.blobs.get(key).cloned()
    }

    fn save(&mut self, key: &str, blob: &str) -> io::Result<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}
