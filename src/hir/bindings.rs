//! Bind extraction from rule conditions.
//!
//! Every `$x : ...` in a rule's `when` part is visible throughout that rule
//! and throughout every rule that (transitively) `extends` it. The
//! inheritance graph is user-written and may contain cycles, so the walk
//! keeps a `visited` set of [`RuleId`]s and stops at the first revisit.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::config::ResolveConfig;
use super::error::{ScopeError, ScopeResult};
use super::ids::{LocalRuleId, RuleId};
use super::symbols::{Origin, SourceLocation, Symbol, SymbolKind};
use super::types::{PrimitiveType, TypeRef};
use crate::base::{FileId, TextSize};
use crate::syntax::{Pattern, PatternKind, Rule, RuleFile};

/// The shape of pattern that introduced a bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindKind {
    /// `$f : Fact()`
    Simple,
    /// `Fact( $n : name )`
    Field,
    /// `$p : /persons`
    Path,
    /// `accumulate( ... ; $total : sum($x) )`
    Accumulate,
}

/// Which [`BindKind`]s a walk collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindFilter {
    pub simple: bool,
    pub field: bool,
    pub path: bool,
    pub accumulate: bool,
}

impl BindFilter {
    pub const ALL: Self = Self {
        simple: true,
        field: true,
        path: true,
        accumulate: true,
    };

    /// Everything except OOPath binds.
    pub const PATTERNS: Self = Self {
        simple: true,
        field: true,
        path: false,
        accumulate: true,
    };

    pub const PATHS: Self = Self {
        simple: false,
        field: false,
        path: true,
        accumulate: false,
    };

    pub fn contains(self, kind: BindKind) -> bool {
        match kind {
            BindKind::Simple => self.simple,
            BindKind::Field => self.field,
            BindKind::Path => self.path,
            BindKind::Accumulate => self.accumulate,
        }
    }
}

/// Walks a rule and its ancestors collecting binds.
pub struct BindingWalker<'a> {
    file: &'a RuleFile,
    file_id: FileId,
    config: &'a ResolveConfig,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> BindingWalker<'a> {
    pub fn new(file: &'a RuleFile, file_id: FileId, config: &'a ResolveConfig) -> Self {
        Self {
            file,
            file_id,
            config,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Binds visible at `position`: those of the enclosing rule first, then
    /// those inherited through `extends`, nearest ancestor first.
    ///
    /// Outside any rule there is nothing to collect.
    pub fn collect(&self, position: TextSize, filter: BindFilter) -> ScopeResult<Vec<Symbol>> {
        match self.file.rule_at(position) {
            Some((index, _)) => self.collect_from_rule(index, filter),
            None => Ok(Vec::new()),
        }
    }

    /// Binds visible anywhere inside the rule at `index`.
    pub fn collect_from_rule(&self, index: usize, filter: BindFilter) -> ScopeResult<Vec<Symbol>> {
        let mut visited: FxHashSet<RuleId> = FxHashSet::default();
        let mut seen: FxHashSet<(SmolStr, RuleId)> = FxHashSet::default();
        let mut out = Vec::new();

        let mut current = Some(index);
        while let Some(index) = current {
            self.check_cancelled()?;
            let Some(rule) = self.file.rules.get(index) else {
                break;
            };
            let id = RuleId::new(self.file_id, LocalRuleId::from(index));
            if !visited.insert(id) {
                tracing::debug!("[BINDINGS] inheritance cycle reached rule '{}' again", rule.name);
                break;
            }

            self.collect_patterns(rule, id, &rule.condition.patterns, filter, &mut seen, &mut out)?;
            current = self.parent_of(rule);
        }

        Ok(out)
    }

    fn parent_of(&self, rule: &Rule) -> Option<usize> {
        let parent = rule.parent.as_ref()?;
        let found = self.file.rule_by_name(&parent.name).map(|(index, _)| index);
        if found.is_none() {
            tracing::trace!(
                "[BINDINGS] rule '{}' extends unknown rule '{}'",
                rule.name,
                parent.name
            );
        }
        found
    }

    fn collect_patterns(
        &self,
        rule: &Rule,
        id: RuleId,
        patterns: &[Pattern],
        filter: BindFilter,
        seen: &mut FxHashSet<(SmolStr, RuleId)>,
        out: &mut Vec<Symbol>,
    ) -> ScopeResult<()> {
        for pattern in patterns {
            self.check_cancelled()?;
            if let Some(symbol) = self.bind_symbol(rule, pattern, filter) {
                if seen.insert((symbol.name.clone(), id)) {
                    out.push(symbol);
                }
            }
            self.collect_patterns(rule, id, pattern.children(), filter, seen, out)?;
        }
        Ok(())
    }

    fn bind_symbol(&self, rule: &Rule, pattern: &Pattern, filter: BindFilter) -> Option<Symbol> {
        let (kind, name, ty) = match &pattern.kind {
            PatternKind::Bind {
                name: Some(name),
                constrained_type,
                ..
            } => (BindKind::Simple, name, Some(TypeRef::parse(constrained_type))),
            PatternKind::FieldBind { name, .. } => (BindKind::Field, name, None),
            PatternKind::PathBind {
                name: Some(name),
                segments,
            } => {
                // A bare `$p : /` binds nothing.
                if segments.first().is_none_or(|s| s.name.is_empty()) {
                    return None;
                }
                (BindKind::Path, name, None)
            }
            PatternKind::Accumulate { name, function, .. } => {
                let ty = self
                    .config
                    .is_integer_aggregate(function)
                    .then_some(TypeRef::Primitive(PrimitiveType::Int));
                (BindKind::Accumulate, name, ty)
            }
            _ => return None,
        };
        if !filter.contains(kind) || name.is_empty() {
            return None;
        }

        let origin = match kind {
            BindKind::Path => Origin::PathBind,
            _ => Origin::PatternBind,
        };
        let mut symbol = Symbol::new(
            name.clone(),
            SymbolKind::Variable,
            origin,
            SourceLocation::tree(self.file_id, pattern.range),
        )
        .with_container(rule.name.clone());
        symbol.declared_type = ty;
        Some(symbol)
    }

    fn check_cancelled(&self) -> ScopeResult<()> {
        match self.cancellation {
            Some(token) if token.is_cancelled() => Err(ScopeError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Every bind visible at `position`, with the default configuration.
pub fn all_bindings_visible_at(
    file: &RuleFile,
    file_id: FileId,
    position: TextSize,
) -> Vec<Symbol> {
    all_bindings_visible_at_matching(file, file_id, position, BindFilter::ALL)
}

/// Like [`all_bindings_visible_at`], restricted to `filter`.
pub fn all_bindings_visible_at_matching(
    file: &RuleFile,
    file_id: FileId,
    position: TextSize,
    filter: BindFilter,
) -> Vec<Symbol> {
    let config = ResolveConfig::default();
    // Without a cancellation token the walk cannot fail.
    BindingWalker::new(file, file_id, &config)
        .collect(position, filter)
        .unwrap_or_default()
}
