#![doc = r#"
Where score files come from

The decoders only need random access to bytes. [`Storage`] is the seam between them and
whatever holds the files: [`FsStorage`] for a mounted filesystem, [`MemoryStorage`] for
scores that are already in memory (and for tests).
"#]

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Opens score files and lists directories
pub trait Storage {
    /// An open file
    type Source: io::Read + io::Seek;

    /// Open a file for reading
    fn open(&self, path: &Path) -> io::Result<Self::Source>;

    /// True if `path` names a directory
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Every entry directly inside `dir`, in no particular order
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The host filesystem through `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    type Source = fs::File;

    fn open(&self, path: &Path) -> io::Result<fs::File> {
        fs::File::open(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect()
    }
}

#[doc = r##"
Files held in memory, keyed by path.

Directories exist implicitly as the parents of stored files.

```rust
# use scorestream::storage::{MemoryStorage, Storage};
use std::path::Path;

let mut storage = MemoryStorage::new();
storage.insert("SCORE/a.txt", b"#MUSIC_START\n".to_vec());

assert!(storage.is_dir(Path::new("SCORE")).unwrap());
assert_eq!(storage.read_dir(Path::new("SCORE")).unwrap(), [Path::new("SCORE/a.txt")]);
```
"##]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStorage {
    /// An empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Remove a file, returning its bytes
    pub fn remove(&mut self, path: &Path) -> Option<Vec<u8>> {
        self.files.remove(path)
    }
}

impl Storage for MemoryStorage {
    type Source = io::Cursor<Vec<u8>>;

    fn open(&self, path: &Path) -> io::Result<Self::Source> {
        self.files
            .get(path)
            .map(|bytes| io::Cursor::new(bytes.clone()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        if self.files.contains_key(path) {
            return Ok(false);
        }
        if self.files.keys().any(|file| file.starts_with(path)) {
            return Ok(true);
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            path.display().to_string(),
        ))
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(dir)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            ));
        }
        let mut entries: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|file| {
                let rest = file.strip_prefix(dir).ok()?;
                let first = rest.components().next()?;
                Some(dir.join(first))
            })
            .collect();
        entries.dedup();
        Ok(entries)
    }
}

#[test]
fn nested_directories() {
    let mut storage = MemoryStorage::new();
    storage.insert("root/a.mid", vec![]);
    storage.insert("root/sub/b.txt", vec![]);
    storage.insert("root/sub/c.txt", vec![]);
    let entries = storage.read_dir(Path::new("root")).unwrap();
    assert_eq!(
        entries,
        vec![PathBuf::from("root/a.mid"), PathBuf::from("root/sub")]
    );
    assert!(storage.is_dir(Path::new("root/sub")).unwrap());
    assert!(!storage.is_dir(Path::new("root/a.mid")).unwrap());
    assert!(storage.is_dir(Path::new("elsewhere")).is_err());
    assert!(storage.read_dir(Path::new("root/a.mid")).is_err());
}
