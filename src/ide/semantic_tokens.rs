//! Semantic tokens: highlight names in `then` blocks by what they resolve to.

use crate::base::{LineCol, TextSize};
use crate::hir::{
    FileSnapshot, Origin, ResolveRequest, ScopeResolver, ScopeResult, Symbol, SymbolKind,
    TypeLookup,
};
use crate::syntax::{Statement, StatementKind};

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Namespace,
    Type,
    Function,
    /// Pattern or OOPath bind
    Parameter,
    /// Action-section local
    Variable,
    /// Global, static field, unit member or path property
    Property,
    /// Implicit action-section variable
    Implicit,
    /// Nothing visible by that name
    Unresolved,
}

impl TokenType {
    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Namespace => 0,
            TokenType::Type => 1,
            TokenType::Function => 2,
            TokenType::Parameter => 3,
            TokenType::Variable => 4,
            TokenType::Property => 5,
            TokenType::Implicit => 6,
            TokenType::Unresolved => 7,
        }
    }
}

impl From<&Symbol> for TokenType {
    fn from(symbol: &Symbol) -> Self {
        match (symbol.kind, symbol.origin) {
            (SymbolKind::Package, _) => TokenType::Namespace,
            (SymbolKind::Type, _) => TokenType::Type,
            (SymbolKind::Function, _) => TokenType::Function,
            (SymbolKind::Variable, Origin::PatternBind | Origin::PathBind) => TokenType::Parameter,
            (SymbolKind::Variable, Origin::LocalVariable) => TokenType::Variable,
            (SymbolKind::Variable, Origin::ImplicitVariable) => TokenType::Implicit,
            (SymbolKind::Variable, _) => TokenType::Property,
        }
    }
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    pub offset: TextSize,
    /// Line/column of `offset`, when the file's text is known
    pub line_col: Option<LineCol>,
    /// Length of the token in bytes
    pub length: u32,
    pub token_type: TokenType,
}

/// Get semantic tokens for every name referenced in the file's `then`
/// blocks, sorted by position.
pub fn semantic_tokens(
    resolver: &ScopeResolver,
    snapshot: &FileSnapshot,
    types: &dyn TypeLookup,
) -> ScopeResult<Vec<SemanticToken>> {
    let mut tokens = Vec::new();
    for rule in &snapshot.tree().rules {
        collect_tokens(resolver, snapshot, types, &rule.action.statements, &mut tokens)?;
    }

    // Sort tokens by position
    tokens.sort_by_key(|t| t.offset);
    Ok(tokens)
}

fn collect_tokens(
    resolver: &ScopeResolver,
    snapshot: &FileSnapshot,
    types: &dyn TypeLookup,
    statements: &[Statement],
    tokens: &mut Vec<SemanticToken>,
) -> ScopeResult<()> {
    for statement in statements {
        if let StatementKind::Block(inner) = &statement.kind {
            collect_tokens(resolver, snapshot, types, inner, tokens)?;
            continue;
        }
        for expr in statement.exprs() {
            for (name, range) in expr.referenced_names() {
                let request = ResolveRequest::at(range.start());
                let found = resolver.find(snapshot, types, &request, name)?;
                let token_type = found.as_ref().map_or(TokenType::Unresolved, TokenType::from);
                tokens.push(SemanticToken {
                    offset: range.start(),
                    line_col: snapshot.line_index().map(|index| index.line_col(range.start())),
                    length: name.len() as u32,
                    token_type,
                });
            }
        }
    }
    Ok(())
}
