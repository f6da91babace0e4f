// src/fs/mock.rs

use super::FileSystem;
use crate::errors::{Result, XcpilotError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem that also records every operation performed on it.
///
/// Clones share state, so a test can keep one clone for inspection while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    operations: Arc<Mutex<Vec<String>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.entries();
        insert_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries();
        insert_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::Dir);
    }

    /// Every operation recorded so far, as `"<op> <path>"` strings.
    pub fn operations(&self) -> Vec<String> {
        lock(&self.operations).clone()
    }

    pub fn clear_operations(&self) {
        lock(&self.operations).clear();
    }

    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.entries().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries().keys().cloned().collect()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        lock(&self.entries)
    }

    fn record(&self, op: &str, path: &Path) {
        lock(&self.operations).push(format!("{op} {}", path.display()));
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn insert_parents(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

fn not_found(path: &Path) -> XcpilotError {
    XcpilotError::system(format!("{path:?}"), "no such file or directory")
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.record("exists", path);
        self.entries().contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.record("read_to_string", path);
        match self.entries().get(path) {
            Some(MockEntry::File(content)) => Ok(String::from_utf8_lossy(content).into_owned()),
            Some(MockEntry::Dir) => Err(XcpilotError::system(format!("{path:?}"), "is a directory")),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.record("write", path);
        self.add_file(path, contents);
        Ok(())
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.record("append", path);
        let mut entries = self.entries();
        if matches!(entries.get(path), Some(MockEntry::Dir)) {
            return Err(XcpilotError::system(format!("{path:?}"), "is a directory"));
        }
        insert_parents(&mut entries, path);
        if let MockEntry::File(existing) = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| MockEntry::File(Vec::new()))
        {
            existing.extend_from_slice(contents);
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record("create_dir_all", path);
        self.add_dir(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.record("remove_file", path);
        match self.entries().remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.record("remove_dir_all", path);
        let mut entries = self.entries();
        if !entries.contains_key(path) {
            return Err(not_found(path));
        }
        entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
