//! Errors surfaced by resolution.
//!
//! Unresolved names, dangling imports and inheritance cycles are not
//! errors: the affected provider simply contributes nothing. What remains
//! are the cases where a caller gets no authoritative answer at all.

use thiserror::Error;

use crate::base::FileId;

/// Errors that can end a resolution request early.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The caller cancelled the request. Retry later; the result is not
    /// "confirmed empty".
    #[error("resolution cancelled")]
    Cancelled,

    /// The file is not (or no longer) part of the analysis snapshot.
    #[error("unknown file: {0}")]
    UnknownFile(FileId),
}

impl ScopeError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScopeError::Cancelled)
    }
}

pub type ScopeResult<T> = Result<T, ScopeError>;
