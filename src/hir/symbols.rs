//! Symbols handed to resolution visitors.
//!
//! A [`Symbol`] is created on demand for a single request and never
//! stored by the resolver. It carries enough to navigate (its
//! [`SourceLocation`]) and to explain where it came from (its [`Origin`]).

use std::fmt;

use smol_str::SmolStr;

use super::types::TypeRef;
use crate::base::{FileId, TextRange};

/// What a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    Type,
    Function,
    Variable,
    /// A package made visible by a wildcard import.
    Package,
}

impl SymbolKind {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::Package => "package",
        }
    }
}

/// Which provider produced a symbol.
///
/// There is exactly one tag per provider, so the set of origins seen at a
/// position doubles as a cheap "what can be referenced here" summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    DeclaredType,
    Function,
    Global,
    ImportedStatic,
    ImportedFunction,
    ImportedClass,
    ImportedPackage,
    ImplicitVariable,
    UnitMember,
    LocalVariable,
    PatternBind,
    PathBind,
    PathSegmentProperty,
}

impl Origin {
    /// Every origin, in default resolution order.
    pub const ALL: [Origin; 13] = [
        Origin::DeclaredType,
        Origin::Function,
        Origin::Global,
        Origin::ImportedStatic,
        Origin::ImportedFunction,
        Origin::ImportedClass,
        Origin::ImportedPackage,
        Origin::ImplicitVariable,
        Origin::UnitMember,
        Origin::LocalVariable,
        Origin::PatternBind,
        Origin::PathBind,
        Origin::PathSegmentProperty,
    ];

    pub fn display(&self) -> &'static str {
        match self {
            Origin::DeclaredType => "declared type",
            Origin::Function => "function",
            Origin::Global => "global",
            Origin::ImportedStatic => "static import",
            Origin::ImportedFunction => "function import",
            Origin::ImportedClass => "class import",
            Origin::ImportedPackage => "package import",
            Origin::ImplicitVariable => "implicit variable",
            Origin::UnitMember => "unit member",
            Origin::LocalVariable => "local variable",
            Origin::PatternBind => "pattern bind",
            Origin::PathBind => "path bind",
            Origin::PathSegmentProperty => "path segment",
        }
    }

    /// Binds introduced by condition patterns.
    pub fn is_bind(&self) -> bool {
        matches!(self, Origin::PatternBind | Origin::PathBind)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Where a symbol is declared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceLocation {
    /// A node of a rule file.
    Tree { file: FileId, range: TextRange },
    /// A host type, or one of its members.
    Host {
        type_name: SmolStr,
        member: Option<SmolStr>,
    },
    /// A package; it has no single declaration site.
    Package(SmolStr),
}

impl SourceLocation {
    pub fn tree(file: FileId, range: TextRange) -> Self {
        Self::Tree { file, range }
    }

    pub fn host(type_name: &str, member: Option<&str>) -> Self {
        Self::Host {
            type_name: type_name.into(),
            member: member.map(SmolStr::from),
        }
    }

    /// The tree range, when the symbol is declared in a rule file.
    pub fn tree_range(&self) -> Option<(FileId, TextRange)> {
        match self {
            Self::Tree { file, range } => Some((*file, *range)),
            _ => None,
        }
    }
}

/// One visible name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    /// Never empty.
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub declared_type: Option<TypeRef>,
    pub origin: Origin,
    /// Owning rule for binds, owning type for host members.
    pub container: Option<SmolStr>,
    pub location: SourceLocation,
}

impl Symbol {
    pub fn new(
        name: impl Into<SmolStr>,
        kind: SymbolKind,
        origin: Origin,
        location: SourceLocation,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type: None,
            origin,
            container: None,
            location,
        }
    }

    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.declared_type = Some(ty);
        self
    }

    pub fn with_container(mut self, container: impl Into<SmolStr>) -> Self {
        self.container = Some(container.into());
        self
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.display(), self.name)?;
        if let Some(ty) = &self.declared_type {
            write!(f, " : {ty}")?;
        }
        write!(f, " ({})", self.origin)
    }
}
