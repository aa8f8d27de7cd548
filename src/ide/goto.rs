//! Go-to-definition implementation.

use std::ops::ControlFlow;
use std::sync::Arc;

use crate::base::{FileId, TextRange, TextSize};
use crate::hir::{
    FileSnapshot, Origin, ResolveRequest, ScopeResolver, ScopeResult, Symbol, SymbolKind,
    TypeLookup,
};

/// Result of a go-to-definition request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoResult {
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self { targets: Vec::new() }
    }

    pub fn single(target: GotoTarget) -> Self {
        Self { targets: vec![target] }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub file: FileId,
    pub range: TextRange,
    pub kind: SymbolKind,
    pub name: Arc<str>,
    pub origin: Origin,
}

impl GotoTarget {
    /// `None` for symbols declared outside rule files (host types,
    /// packages).
    pub fn from_symbol(symbol: &Symbol) -> Option<Self> {
        let (file, range) = symbol.location.tree_range()?;
        Some(Self {
            file,
            range,
            kind: symbol.kind,
            name: Arc::from(symbol.name.as_str()),
            origin: symbol.origin,
        })
    }
}

/// Find where `name`, referenced at `position`, is declared.
///
/// Takes the highest-precedence symbol that has a location in a rule file;
/// names that only resolve to host types yield an empty result.
pub fn goto_definition(
    resolver: &ScopeResolver,
    snapshot: &FileSnapshot,
    types: &dyn TypeLookup,
    position: TextSize,
    name: &str,
) -> ScopeResult<GotoResult> {
    let request = ResolveRequest::at(position).named(name);
    let mut target = None;
    resolver.resolve(snapshot, types, &request, &mut |symbol: Symbol| {
        match GotoTarget::from_symbol(&symbol) {
            Some(found) => {
                target = Some(found);
                ControlFlow::Break(())
            }
            None => ControlFlow::Continue(()),
        }
    })?;
    Ok(target.map_or_else(GotoResult::empty, GotoResult::single))
}
