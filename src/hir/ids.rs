//! Identifiers for rules and snapshot revisions.

use std::fmt;

use crate::base::FileId;

/// Identifies a rule across the workspace.
///
/// Rules form a reference graph through `extends`; inheritance walks use
/// this as the key of their `visited` set.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RuleId {
    /// The file declaring the rule
    pub file: FileId,
    /// Position of the rule in the file's rule list
    pub local: LocalRuleId,
}

impl RuleId {
    #[inline]
    pub const fn new(file: FileId, local: LocalRuleId) -> Self {
        Self { file, local }
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({:?}:{})", self.file, self.local.0)
    }
}

/// Index of a rule within its file.
///
/// Stable across re-parses as long as rule order does not change.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LocalRuleId(pub u32);

impl LocalRuleId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocalRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalRuleId({})", self.0)
    }
}

impl From<usize> for LocalRuleId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Monotonic modification counter.
///
/// A file's revision moves forward on every edit; memoized values record
/// the revision they were computed at and are discarded once it moves.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Revision(pub u64);

impl Revision {
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
