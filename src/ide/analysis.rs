//! AnalysisHost and Analysis: Unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state and provides `Analysis` snapshots
//! for querying. A snapshot captures every file at one revision, so all
//! queries against it agree with each other even while the host keeps
//! changing.
//!
//! ## Usage
//!
//! ```
//! use drlscope::TextSize;
//! use drlscope::ide::AnalysisHost;
//! use drlscope::syntax::{Expr, RuleFileBuilder};
//!
//! let mut host = AnalysisHost::new();
//! let tree = RuleFileBuilder::new()
//!     .global("java.util.List", "items")
//!     .rule("R1", |r| {
//!         r.then(|a| {
//!             a.expr(Expr::name("items"));
//!         });
//!     })
//!     .build();
//! let file = host.set_file("rules.drl", tree);
//!
//! let analysis = host.analysis();
//! let at = analysis.snapshot(file).unwrap().tree().rules[0].action.range.start();
//! let symbols = analysis.visible_symbols(file, at).unwrap();
//! assert_eq!(symbols[0].name, "items");
//! ```

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::base::{FileId, LineCol, TextRange, TextSize};
use crate::hir::{
    BindFilter, BindingWalker, Diagnostic, FileSet, FileSnapshot, Origin, ResolveConfig,
    ResolveRequest, ScopeError, ScopeResolver, ScopeResult, Symbol, SymbolVisitor, TypeLookup,
    TypeRegistry, check_file,
};
use crate::syntax::RuleFile;

use super::{
    CompletionItem, GotoResult, InlayHint, SemanticToken, completions, goto_definition, inlay_hints,
    semantic_tokens,
};

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_file()` and `remove_file()`, then get a
/// consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    files: FileSet,
    types: Arc<dyn TypeLookup>,
    resolver: Arc<ScopeResolver>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// A host with the default configuration and no host types.
    pub fn new() -> Self {
        Self::with_config(ResolveConfig::default())
    }

    pub fn with_config(config: ResolveConfig) -> Self {
        Self {
            files: FileSet::new(),
            types: Arc::new(TypeRegistry::new()),
            resolver: Arc::new(ScopeResolver::new(config)),
        }
    }

    /// Use a custom resolver, e.g. one with extra providers.
    pub fn with_resolver(resolver: ScopeResolver) -> Self {
        Self {
            files: FileSet::new(),
            types: Arc::new(TypeRegistry::new()),
            resolver: Arc::new(resolver),
        }
    }

    /// Add or replace a file's tree.
    pub fn set_file(&mut self, path: impl AsRef<Path>, tree: RuleFile) -> FileId {
        self.update(path.as_ref(), tree, None)
    }

    /// Like [`set_file`](Self::set_file), also keeping the text for
    /// line/column conversions.
    pub fn set_file_text(&mut self, path: impl AsRef<Path>, tree: RuleFile, text: &str) -> FileId {
        self.update(path.as_ref(), tree, Some(text))
    }

    fn update(&mut self, path: &Path, tree: RuleFile, text: Option<&str>) -> FileId {
        let file = self.files.file_id(path);
        let revision = self.files.set_tree(file, tree, text);
        self.resolver.implicit_cache().invalidate(file);
        tracing::debug!("[HOST] {} is now {:?} at {:?}", path.display(), file, revision);
        file
    }

    /// Remove a file. Returns its id if it was known.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> Option<FileId> {
        let file = self.files.lookup(path.as_ref())?;
        self.files.remove(file);
        self.resolver.implicit_cache().invalidate(file);
        Some(file)
    }

    /// Replace the host type system.
    pub fn set_type_lookup(&mut self, types: impl TypeLookup + 'static) {
        self.types = Arc::new(types);
        self.resolver.implicit_cache().clear();
    }

    pub fn file_id(&self, path: impl AsRef<Path>) -> Option<FileId> {
        self.files.lookup(path.as_ref())
    }

    pub fn file_count(&self) -> usize {
        self.files.files().len()
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis {
        let snapshots = self
            .files
            .snapshots()
            .into_iter()
            .map(|snapshot| (snapshot.file_id(), snapshot))
            .collect();
        Analysis {
            snapshots: Arc::new(snapshots),
            types: self.types.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

/// Immutable view of every file at one point in time.
///
/// Cheap to clone, `Send + Sync`; hand it to as many threads as needed.
#[derive(Clone)]
pub struct Analysis {
    snapshots: Arc<FxHashMap<FileId, FileSnapshot>>,
    types: Arc<dyn TypeLookup>,
    resolver: Arc<ScopeResolver>,
}

impl Analysis {
    pub fn snapshot(&self, file: FileId) -> ScopeResult<&FileSnapshot> {
        self.snapshots.get(&file).ok_or(ScopeError::UnknownFile(file))
    }

    pub fn types(&self) -> &dyn TypeLookup {
        self.types.as_ref()
    }

    /// Drive `visitor` over the symbols visible for `request`.
    pub fn resolve(
        &self,
        file: FileId,
        request: &ResolveRequest,
        visitor: &mut dyn SymbolVisitor,
    ) -> ScopeResult<ControlFlow<()>> {
        self.resolver
            .resolve(self.snapshot(file)?, self.types(), request, visitor)
    }

    /// Every symbol visible at `position`, in resolution order.
    pub fn visible_symbols(&self, file: FileId, position: TextSize) -> ScopeResult<Vec<Symbol>> {
        self.resolver
            .collect(self.snapshot(file)?, self.types(), &ResolveRequest::at(position))
    }

    /// The highest-precedence symbol called `name` at `position`.
    pub fn find_symbol(
        &self,
        file: FileId,
        position: TextSize,
        name: &str,
    ) -> ScopeResult<Option<Symbol>> {
        self.resolver
            .find(self.snapshot(file)?, self.types(), &ResolveRequest::at(position), name)
    }

    /// Pattern and path binds visible at `position`.
    pub fn bindings_at(&self, file: FileId, position: TextSize) -> ScopeResult<Vec<Symbol>> {
        let snapshot = self.snapshot(file)?;
        BindingWalker::new(snapshot.tree(), file, self.resolver.config())
            .collect(position, BindFilter::ALL)
    }

    /// Which providers contribute at `position`.
    pub fn capabilities(&self, file: FileId, position: TextSize) -> ScopeResult<Vec<Origin>> {
        self.resolver
            .capabilities(self.snapshot(file)?, self.types(), &ResolveRequest::at(position))
    }

    /// [`visible_symbols`](Self::visible_symbols) for many positions, in
    /// parallel. Results keep the order of `queries`.
    pub fn resolve_many(&self, queries: &[(FileId, TextSize)]) -> Vec<ScopeResult<Vec<Symbol>>> {
        queries
            .par_iter()
            .map(|&(file, position)| self.visible_symbols(file, position))
            .collect()
    }

    /// Convert a line/column to an offset. Needs the file's text.
    pub fn offset(&self, file: FileId, line_col: LineCol) -> ScopeResult<Option<TextSize>> {
        Ok(self
            .snapshot(file)?
            .line_index()
            .and_then(|index| index.offset(line_col)))
    }

    pub fn line_col(&self, file: FileId, offset: TextSize) -> ScopeResult<Option<LineCol>> {
        Ok(self.snapshot(file)?.line_index().map(|index| index.line_col(offset)))
    }

    pub fn completions(
        &self,
        file: FileId,
        position: TextSize,
    ) -> ScopeResult<Vec<CompletionItem>> {
        completions(&self.resolver, self.snapshot(file)?, self.types(), position)
    }

    pub fn goto_definition(
        &self,
        file: FileId,
        position: TextSize,
        name: &str,
    ) -> ScopeResult<GotoResult> {
        goto_definition(&self.resolver, self.snapshot(file)?, self.types(), position, name)
    }

    pub fn inlay_hints(
        &self,
        file: FileId,
        range: Option<TextRange>,
    ) -> ScopeResult<Vec<InlayHint>> {
        Ok(inlay_hints(self.snapshot(file)?, self.resolver.config(), range))
    }

    pub fn diagnostics(&self, file: FileId) -> ScopeResult<Vec<Diagnostic>> {
        check_file(&self.resolver, self.snapshot(file)?, self.types())
    }

    pub fn semantic_tokens(&self, file: FileId) -> ScopeResult<Vec<SemanticToken>> {
        semantic_tokens(&self.resolver, self.snapshot(file)?, self.types())
    }
}
