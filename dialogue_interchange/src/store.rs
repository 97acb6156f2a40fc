//! Container storage backends.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::InterchangeResult;
use crate::io::write_text;
use crate::serializer::ContainerData;

/// Trait for container storage backends, keyed by path.
pub trait ContainerStore {
    /// Save a container, replacing any container already stored at the path.
    fn save(&mut self, path: &Path, data: &ContainerData) -> InterchangeResult<()>;

    /// Load a container. `Ok(None)` when nothing is stored at the path.
    fn load(&self, path: &Path) -> InterchangeResult<Option<ContainerData>>;
}

/// Stores containers as pretty-printed JSON files.
///
/// Relative paths resolve against `root`.
#[derive(Debug, Clone)]
pub struct FileContainerStore {
    root: PathBuf,
}

impl FileContainerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A store rooted at the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ContainerStore for FileContainerStore {
    fn save(&mut self, path: &Path, data: &ContainerData) -> InterchangeResult<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_text(&full, &serde_json::to_string_pretty(data)?)?;
        debug!(path = %full.display(), "saved container");
        Ok(())
    }

    fn load(&self, path: &Path) -> InterchangeResult<Option<ContainerData>> {
        let full = self.resolve(path);
        let text = match fs::read_to_string(&full) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }
}

/// Keeps containers in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainerStore {
    containers: HashMap<PathBuf, ContainerData>,
}

impl MemoryContainerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl ContainerStore for MemoryContainerStore {
    fn save(&mut self, path: &Path, data: &ContainerData) -> InterchangeResult<()> {
        self.containers.insert(path.to_path_buf(), data.clone());
        Ok(())
    }

    fn load(&self, path: &Path) -> InterchangeResult<Option<ContainerData>> {
        Ok(self.containers.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::NodeRecord;

    fn sample() -> ContainerData {
        ContainerData {
            nodes: vec![NodeRecord {
                id: "solo".to_string(),
                text: "Hello".to_string(),
                ..Default::default()
            }],
            links: Vec::new(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileContainerStore::new(dir.path());

        store.save(Path::new("graphs/intro.json"), &sample()).unwrap();
        let loaded = store.load(Path::new("graphs/intro.json")).unwrap();

        assert_eq!(loaded, Some(sample()));
        assert!(dir.path().join("graphs/intro.json").exists());
    }

    #[test]
    fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileContainerStore::new(dir.path());

        assert_eq!(store.load(Path::new("absent.json")).unwrap(), None);
    }

    #[test]
    fn test_file_store_save_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileContainerStore::new(dir.path());
        let path = Path::new("graph.json");

        store.save(path, &sample()).unwrap();
        store.save(path, &ContainerData::default()).unwrap();

        assert_eq!(store.load(path).unwrap(), Some(ContainerData::default()));
    }

    #[test]
    fn test_file_store_corrupt_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = FileContainerStore::new(dir.path());

        assert!(store.load(Path::new("bad.json")).is_err());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryContainerStore::new();
        assert!(store.is_empty());

        store.save(Path::new("a"), &sample()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load(Path::new("a")).unwrap(), Some(sample()));
        assert_eq!(store.load(Path::new("b")).unwrap(), None);
    }
}
