//! Memo table for implicit-variable types.
//!
//! Probing the candidate types of `kcontext`/`drools` hits the type lookup
//! several times per request. The answer only changes when the file or the
//! type lookup changes, so it is cached per file and keyed by the file
//! revision plus the identity and revision of the lookup probed.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::ids::Revision;
use super::types::{TypeDescriptor, TypeLookup};
use crate::base::FileId;

/// An implicit variable whose type resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImplicit {
    pub name: SmolStr,
    pub descriptor: Arc<TypeDescriptor>,
    pub exposes_members: bool,
}

/// Which lookup, at which revision, an entry was probed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LookupStamp {
    address: usize,
    revision: Revision,
}

impl LookupStamp {
    /// `None` for unversioned lookups.
    fn of(types: &dyn TypeLookup) -> Option<Self> {
        let revision = types.revision();
        if revision == Revision::default() {
            return None;
        }
        Some(Self {
            address: std::ptr::from_ref(types).cast::<()>() as usize,
            revision,
        })
    }
}

#[derive(Clone)]
struct Entry {
    file_revision: Revision,
    lookup: LookupStamp,
    values: Arc<[ResolvedImplicit]>,
}

impl Entry {
    fn is_fresh(&self, file_revision: Revision, lookup: LookupStamp) -> bool {
        self.file_revision == file_revision && self.lookup == lookup
    }

    fn supersedes(&self, file_revision: Revision, lookup: LookupStamp) -> bool {
        (self.file_revision, self.lookup.revision) > (file_revision, lookup.revision)
    }
}

/// Thread-safe, revision-checked cache of [`ResolvedImplicit`] lists.
#[derive(Default)]
pub struct ImplicitVarCache {
    entries: RwLock<FxHashMap<FileId, Entry>>,
}

impl fmt::Debug for ImplicitVarCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplicitVarCache")
            .field("files", &self.len())
            .finish()
    }
}

impl ImplicitVarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached list for `file` probed against `types`, running
    /// `probe` when missing or stale.
    ///
    /// An entry only answers for the lookup it was probed against. Lookups
    /// reporting the default revision are unversioned and always probed.
    ///
    /// `probe` runs without any lock held, so concurrent callers may probe
    /// the same file twice; both produce the same answer and the later
    /// insert is harmless.
    pub fn get_or_probe(
        &self,
        file: FileId,
        file_revision: Revision,
        types: &dyn TypeLookup,
        probe: impl FnOnce() -> Vec<ResolvedImplicit>,
    ) -> Arc<[ResolvedImplicit]> {
        let Some(lookup) = LookupStamp::of(types) else {
            tracing::trace!("[CACHE] unversioned type lookup, probing {:?} uncached", file);
            return probe().into();
        };

        // Fast path: read lock
        {
            let entries = self.entries.read();
            let fresh = entries
                .get(&file)
                .filter(|e| e.is_fresh(file_revision, lookup));
            if let Some(entry) = fresh {
                return entry.values.clone();
            }
        }

        tracing::debug!(
            "[CACHE] probing implicit variables for {:?} at {:?}/{:?}",
            file,
            file_revision,
            lookup.revision
        );
        let values: Arc<[ResolvedImplicit]> = probe().into();

        let mut entries = self.entries.write();
        // Double-check: a newer entry may have landed while probing
        if entries
            .get(&file)
            .is_some_and(|e| e.supersedes(file_revision, lookup))
        {
            return values;
        }
        entries.insert(
            file,
            Entry {
                file_revision,
                lookup,
                values: values.clone(),
            },
        );
        values
    }

    /// Drop the entry for one file.
    pub fn invalidate(&self, file: FileId) {
        if self.entries.write().remove(&file).is_some() {
            tracing::trace!("[CACHE] invalidated {:?}", file);
        }
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
