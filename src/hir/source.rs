//! Rule files known to the analysis, and immutable snapshots of them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::ids::Revision;
use crate::base::{FileId, LineIndex};
use crate::syntax::RuleFile;

/// One file's tree as of one revision.
///
/// Cheap to clone; resolution only ever reads through one of these, so
/// edits made while a request runs are never observed half-way.
#[derive(Clone, Debug)]
pub struct FileSnapshot {
    file_id: FileId,
    revision: Revision,
    tree: Arc<RuleFile>,
    line_index: Option<Arc<LineIndex>>,
}

impl FileSnapshot {
    /// A standalone snapshot, outside any [`FileSet`].
    pub fn new(file_id: FileId, tree: RuleFile) -> Self {
        Self {
            file_id,
            revision: Revision::default(),
            tree: Arc::new(tree),
            line_index: None,
        }
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.line_index = Some(Arc::new(LineIndex::new(text)));
        self
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn tree(&self) -> &RuleFile {
        &self.tree
    }

    /// Present only when the file was registered with its text.
    pub fn line_index(&self) -> Option<&LineIndex> {
        self.line_index.as_deref()
    }
}

/// Manages the mapping between file paths and FileIds, and the latest
/// snapshot of each file.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    /// Path → FileId mapping
    path_to_id: IndexMap<PathBuf, FileId>,
    /// FileId → Path mapping (reverse lookup)
    id_to_path: IndexMap<FileId, PathBuf>,
    snapshots: IndexMap<FileId, FileSnapshot>,
    /// Next FileId to assign
    next_id: u32,
    /// Shared by all files so a removed-then-re-added file never reuses a
    /// revision.
    last_revision: Revision,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a FileId for a path.
    pub fn file_id(&self, path: &Path) -> FileId {
        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(path) {
                return id;
            }
        }

        // Slow path: write lock
        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.path_to_id.get(path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.path_to_id.insert(path.to_owned(), id);
        inner.id_to_path.insert(id, path.to_owned());
        id
    }

    /// FileId of an already-known path, without assigning one.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.inner.read().path_to_id.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().id_to_path.get(&file).cloned()
    }

    /// Replace a file's tree. Returns the new revision.
    ///
    /// `text`, when given, backs line/column conversions for the file.
    pub fn set_tree(&self, file: FileId, tree: RuleFile, text: Option<&str>) -> Revision {
        let mut inner = self.inner.write();
        inner.last_revision = inner.last_revision.next();
        let mut snapshot = FileSnapshot::new(file, tree).with_revision(inner.last_revision);
        if let Some(text) = text {
            snapshot = snapshot.with_text(text);
        }
        inner.snapshots.insert(file, snapshot);
        inner.last_revision
    }

    pub fn snapshot(&self, file: FileId) -> Option<FileSnapshot> {
        self.inner.read().snapshots.get(&file).cloned()
    }

    pub fn revision(&self, file: FileId) -> Option<Revision> {
        self.inner.read().snapshots.get(&file).map(|s| s.revision)
    }

    /// Remove a file from the set.
    pub fn remove(&self, file: FileId) {
        let mut inner = self.inner.write();
        if let Some(path) = inner.id_to_path.swap_remove(&file) {
            inner.path_to_id.swap_remove(&path);
        }
        inner.snapshots.swap_remove(&file);
    }

    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Files that currently have a tree.
    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().snapshots.keys().copied().collect()
    }

    /// The latest snapshot of every file, in registration order.
    pub fn snapshots(&self) -> Vec<FileSnapshot> {
        self.inner.read().snapshots.values().cloned().collect()
    }
}
