//! Diagnostics: semantic error reporting built on scope resolution.
//!
//! The resolver itself never reports unresolved names; it just contributes
//! nothing for them. The [`SemanticChecker`] turns those silent misses into
//! diagnostics by comparing what a file references against what is
//! visible.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;

use super::error::{ScopeError, ScopeResult};
use super::resolve::{ResolveRequest, ScopeResolver};
use super::source::FileSnapshot;
use super::types::TypeLookup;
use crate::base::{FileId, LineCol, LineIndex, TextRange};
use crate::syntax::{Import, ImportKind, Rule, Statement, StatementKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FileId,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn error(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, range, Severity::Error, message)
    }

    pub fn warning(file: FileId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, range, Severity::Warning, message)
    }

    fn new(
        file: FileId,
        range: TextRange,
        severity: Severity,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            file,
            range,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Start and end as line/column pairs.
    pub fn line_cols(&self, index: &LineIndex) -> (LineCol, LineCol) {
        (index.line_col(self.range.start()), index.line_col(self.range.end()))
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
pub mod codes {
    /// Undefined reference (name not visible).
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Circular rule inheritance.
    pub const CIRCULAR_INHERITANCE: &str = "E0007";
    /// `extends` names a rule that does not exist.
    pub const UNRESOLVED_PARENT: &str = "E0008";

    /// Import whose target does not resolve.
    pub const UNRESOLVED_IMPORT: &str = "W0004";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an undefined reference error.
    pub fn undefined_reference(&mut self, file: FileId, range: TextRange, name: &str) {
        self.add(
            Diagnostic::error(file, range, format!("undefined reference: '{}'", name))
                .with_code(codes::UNDEFINED_REFERENCE),
        );
    }

    /// Add a circular inheritance error on `rule`'s `extends` clause.
    ///
    /// `cycle` lists the rules from `rule` up to the last one before the
    /// chain returns to `rule`.
    pub fn circular_inheritance(
        &mut self,
        file: FileId,
        rule: &Rule,
        cycle: &[&str],
        parent_range: TextRange,
    ) {
        let message = if cycle.len() <= 1 {
            format!("circular inheritance: rule '{}' extends itself", rule.name)
        } else {
            format!(
                "circular inheritance: rule '{}' is part of the cycle {} -> {}",
                rule.name,
                cycle.join(" -> "),
                rule.name
            )
        };
        self.add(
            Diagnostic::error(file, parent_range, message).with_code(codes::CIRCULAR_INHERITANCE),
        );
    }

    pub fn unresolved_parent(&mut self, file: FileId, parent: &str, parent_range: TextRange) {
        self.add(
            Diagnostic::error(file, parent_range, format!("unresolved parent rule: '{}'", parent))
                .with_code(codes::UNRESOLVED_PARENT),
        );
    }

    pub fn unresolved_import(&mut self, file: FileId, import: &Import) {
        let message = format!("unresolved import: '{}'", import.target);
        self.add(
            Diagnostic::warning(file, import.range, message).with_code(codes::UNRESOLVED_IMPORT),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Checks one file against what the resolver can see.
pub struct SemanticChecker<'a> {
    resolver: &'a ScopeResolver,
    snapshot: &'a FileSnapshot,
    types: &'a dyn TypeLookup,
    cancellation: Option<CancellationToken>,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(
        resolver: &'a ScopeResolver,
        snapshot: &'a FileSnapshot,
        types: &'a dyn TypeLookup,
    ) -> Self {
        Self {
            resolver,
            snapshot,
            types,
            cancellation: None,
            collector: DiagnosticCollector::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Run every check.
    pub fn check_file(&mut self) -> ScopeResult<()> {
        self.check_imports();
        self.check_inheritance();
        self.check_references()
    }

    fn check_imports(&mut self) {
        let scope = self.resolver.config().search_scope;
        let file_id = self.snapshot.file_id();
        for import in &self.snapshot.tree().imports {
            let resolves = match import.kind {
                ImportKind::Class => self.types.find_type(import.path(), scope).is_some(),
                ImportKind::Package => self.types.package_types(import.path(), scope).is_some(),
                ImportKind::Static | ImportKind::Function => {
                    import.container_and_member().is_some_and(|(container, member)| {
                        self.types.find_type(container, scope).is_some_and(|owner| {
                            member == "*"
                                || owner.field(member).is_some()
                                || owner.methods_named(member).next().is_some()
                        })
                    })
                }
            };
            if !resolves {
                self.collector.unresolved_import(file_id, import);
            }
        }
    }

    fn check_inheritance(&mut self) {
        let file = self.snapshot.tree();
        let file_id = self.snapshot.file_id();
        for (index, rule) in file.rules.iter().enumerate() {
            let Some(parent) = &rule.parent else {
                continue;
            };
            if file.rule_by_name(&parent.name).is_none() {
                self.collector.unresolved_parent(file_id, &parent.name, parent.range);
                continue;
            }

            // Follow the chain until it ends, leaves a cycle, or comes back.
            let mut visited = FxHashSet::default();
            let mut chain = Vec::new();
            let mut current = Some(index);
            while let Some(i) = current {
                if !visited.insert(i) {
                    if i == index {
                        self.collector
                            .circular_inheritance(file_id, rule, &chain, parent.range);
                    }
                    break;
                }
                chain.push(file.rules[i].name.as_str());
                current = file.rules[i]
                    .parent
                    .as_ref()
                    .and_then(|p| file.rule_by_name(&p.name))
                    .map(|(next, _)| next);
            }
        }
    }

    fn check_references(&mut self) -> ScopeResult<()> {
        let file = self.snapshot.tree();
        for rule in &file.rules {
            self.check_statements(&rule.action.statements)?;
        }
        Ok(())
    }

    fn check_statements(&mut self, statements: &[Statement]) -> ScopeResult<()> {
        for statement in statements {
            if let StatementKind::Block(inner) = &statement.kind {
                self.check_statements(inner)?;
                continue;
            }
            for expr in statement.exprs() {
                for (name, range) in expr.referenced_names() {
                    let mut request = ResolveRequest::at(range.start()).named(name.clone());
                    request.cancellation = self.cancellation.clone();
                    let found = self.resolver.find(self.snapshot, self.types, &request, name)?;
                    if found.is_none() {
                        self.collector
                            .undefined_reference(self.snapshot.file_id(), range, name);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.collector.diagnostics
    }
}

/// Check a file and return diagnostics.
pub fn check_file(
    resolver: &ScopeResolver,
    snapshot: &FileSnapshot,
    types: &dyn TypeLookup,
) -> Result<Vec<Diagnostic>, ScopeError> {
    let mut checker = SemanticChecker::new(resolver, snapshot, types);
    checker.check_file()?;
    Ok(checker.finish())
}
