//! Completion suggestions implementation.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::TextSize;
use crate::hir::{
    FileSnapshot, Origin, ResolveRequest, ScopeResolver, ScopeResult, Symbol, SymbolKind,
    TypeLookup,
};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Package,
    Type,
    Function,
    Variable,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Package => 9,  // Module
            CompletionKind::Type => 7,     // Class
            CompletionKind::Function => 3, // Function
            CompletionKind::Variable => 6, // Variable
        }
    }
}

impl From<SymbolKind> for CompletionKind {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Package => CompletionKind::Package,
            SymbolKind::Type => CompletionKind::Type,
            SymbolKind::Function => CompletionKind::Function,
            SymbolKind::Variable => CompletionKind::Variable,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Which provider made the name visible.
    pub origin: Origin,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind, origin: Origin) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            origin,
            sort_priority: 100,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    /// Create from a resolved symbol.
    pub fn from_symbol(symbol: &Symbol) -> Self {
        let item = Self::new(symbol.name.as_str(), symbol.kind.into(), symbol.origin);
        match &symbol.declared_type {
            Some(ty) if !ty.is_unknown() => item.with_detail(format!(": {ty}")),
            _ => item.with_detail(symbol.origin.display()),
        }
    }
}

/// Get completion suggestions at a position.
///
/// Items come in resolution order, so a name shadowed by a
/// higher-precedence provider is offered once, from that provider.
pub fn completions(
    resolver: &ScopeResolver,
    snapshot: &FileSnapshot,
    types: &dyn TypeLookup,
    position: TextSize,
) -> ScopeResult<Vec<CompletionItem>> {
    let symbols = resolver.collect(snapshot, types, &ResolveRequest::at(position))?;
    let order = resolver.provider_order();

    // Deduplicate by (name, kind)
    let mut seen: FxHashSet<(SmolStr, SymbolKind)> = FxHashSet::default();
    let items = symbols
        .iter()
        .filter(|symbol| seen.insert((symbol.name.clone(), symbol.kind)))
        .map(|symbol| {
            let rank = order.iter().position(|o| *o == symbol.origin).unwrap_or(order.len());
            CompletionItem::from_symbol(symbol).with_priority(rank as u32 * 10)
        })
        .collect();
    Ok(items)
}
