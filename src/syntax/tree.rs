//! Parsed rule-file nodes.
//!
//! The parser that produces these lives outside this crate; everything
//! here is plain, immutable data with a [`TextRange`] on every node so the
//! resolver can locate the node enclosing a position.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};

// ============================================================================
// FILE
// ============================================================================

/// One parsed `.drl` file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleFile {
    /// `package a.b;` declaration, if any.
    pub package: Option<SmolStr>,
    pub imports: Vec<Import>,
    pub declared_types: Vec<TypeDeclaration>,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<FunctionDeclaration>,
    pub rules: Vec<Rule>,
    /// `unit MyUnit;` declaration, if any.
    pub unit: Option<UnitRef>,
    pub range: TextRange,
}

impl RuleFile {
    /// Find the rule whose range contains `offset`.
    pub fn rule_at(&self, offset: TextSize) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.range.contains_inclusive(offset))
    }

    /// Look up a rule by name. The first rule with that name wins.
    pub fn rule_by_name(&self, name: &str) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.name == name)
    }

    /// Imports of a single kind, in file order.
    pub fn imports_of(&self, kind: ImportKind) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(move |import| import.kind == kind)
    }
}

// ============================================================================
// IMPORTS & DECLARATIONS
// ============================================================================

/// The flavour of an `import` clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import a.b.Type;`
    Class,
    /// `import a.b.*;`
    Package,
    /// `import static a.b.Type.member;` or `import static a.b.Type.*;`
    Static,
    /// `import function a.b.Type.method;`
    Function,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// Target as written, including a trailing `.*` for wildcards.
    pub target: SmolStr,
    pub kind: ImportKind,
    pub range: TextRange,
}

impl Import {
    pub fn is_wildcard(&self) -> bool {
        self.target.ends_with(".*")
    }

    /// Target without the trailing `.*`.
    pub fn path(&self) -> &str {
        self.target.trim_end_matches(".*")
    }

    /// Last segment of the target (`List` for `java.util.List`).
    pub fn simple_name(&self) -> &str {
        let path = self.path();
        path.rsplit_once('.').map_or(path, |(_, name)| name)
    }

    /// Split a member import into `(container type, member)`.
    ///
    /// `a.B.m` gives `("a.B", "m")`, `a.B.*` gives `("a.B", "*")`.
    pub fn container_and_member(&self) -> Option<(&str, &str)> {
        self.target.rsplit_once('.')
    }
}

/// Whether a `declare` introduces a class-shaped or enum-shaped type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclShape {
    Class,
    Enum,
}

/// `declare Person name : String end` or `declare enum Color ... end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: SmolStr,
    pub shape: DeclShape,
    pub fields: Vec<FieldDecl>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: SmolStr,
    pub type_name: SmolStr,
}

/// `global java.util.List items;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalVariable {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub name: SmolStr,
    /// `None` for `void`.
    pub return_type: Option<SmolStr>,
    pub params: Vec<Param>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: SmolStr,
    pub type_name: SmolStr,
}

/// `unit MyUnit;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitRef {
    pub name: SmolStr,
    pub range: TextRange,
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub name: SmolStr,
    /// `rule R2 extends R1`
    pub parent: Option<ParentRef>,
    pub condition: ConditionSection,
    pub action: ActionSection,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentRef {
    pub name: SmolStr,
    pub range: TextRange,
}

/// The `when` part of a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionSection {
    pub patterns: Vec<Pattern>,
    pub range: TextRange,
}

/// The `then` part of a rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionSection {
    pub statements: Vec<Statement>,
    pub range: TextRange,
}

// ============================================================================
// PATTERNS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// `$f : Fact( constraints )`, or `Fact()` without a bind.
    Bind {
        name: Option<SmolStr>,
        constrained_type: SmolStr,
        constraints: Vec<Pattern>,
    },
    /// `$n : name` inside a constraint list.
    FieldBind { name: SmolStr, field: SmolStr },
    /// `$p : /persons/addresses` (OOPath).
    PathBind {
        name: Option<SmolStr>,
        segments: Vec<PathSegment>,
    },
    /// `accumulate( source ; $total : sum($x) )`.
    Accumulate {
        name: SmolStr,
        function: SmolStr,
        source: Vec<Pattern>,
    },
    /// `not`, `exists`, `or`, ... around nested patterns.
    Group {
        op: GroupOp,
        children: Vec<Pattern>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupOp {
    And,
    Or,
    Not,
    Exists,
    Forall,
}

/// One `/segment` of an OOPath.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub name: SmolStr,
    pub range: TextRange,
}

impl Pattern {
    /// Nested patterns, in source order.
    pub fn children(&self) -> &[Pattern] {
        match &self.kind {
            PatternKind::Bind { constraints, .. } => constraints,
            PatternKind::Accumulate { source, .. } => source,
            PatternKind::Group { children, .. } => children,
            PatternKind::FieldBind { .. } | PatternKind::PathBind { .. } => &[],
        }
    }

    /// The bind name this pattern introduces, if any.
    pub fn bind_name(&self) -> Option<&SmolStr> {
        match &self.kind {
            PatternKind::Bind { name, .. } | PatternKind::PathBind { name, .. } => name.as_ref(),
            PatternKind::FieldBind { name, .. } | PatternKind::Accumulate { name, .. } => {
                Some(name)
            }
            PatternKind::Group { .. } => None,
        }
    }
}

// ============================================================================
// STATEMENTS & EXPRESSIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
    /// `Type name = init;` (or `var name = init;` with no written type).
    LocalDecl {
        name: SmolStr,
        type_name: Option<SmolStr>,
        init: Option<Expr>,
    },
    /// `target = value;`
    Assignment { target: SmolStr, value: Expr },
    Expr(Expr),
    /// `{ ... }`
    Block(Vec<Statement>),
}

impl Statement {
    /// Expressions directly owned by this statement (not nested blocks).
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        let expr = match &self.kind {
            StatementKind::LocalDecl { init, .. } => init.as_ref(),
            StatementKind::Assignment { value, .. } => Some(value),
            StatementKind::Expr(expr) => Some(expr),
            StatementKind::Block(_) => None,
        };
        expr.into_iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(SmolStr),
    New { type_name: SmolStr, args: Vec<Expr> },
    Cast { type_name: SmolStr, expr: Box<Expr> },
    Call {
        receiver: Option<Box<Expr>>,
        method: SmolStr,
        args: Vec<Expr>,
    },
    Field { receiver: Box<Expr>, field: SmolStr },
    /// Anything the parser did not break down further.
    Opaque(SmolStr),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Long(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(SmolStr),
    Null,
}

impl Expr {
    fn unplaced(kind: ExprKind) -> Self {
        Self {
            kind,
            range: TextRange::default(),
        }
    }

    pub fn int(value: i64) -> Self {
        Self::unplaced(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn string(value: &str) -> Self {
        Self::unplaced(ExprKind::Literal(Literal::Str(value.into())))
    }

    pub fn literal(literal: Literal) -> Self {
        Self::unplaced(ExprKind::Literal(literal))
    }

    pub fn name(name: &str) -> Self {
        Self::unplaced(ExprKind::Name(name.into()))
    }

    pub fn new_object(type_name: &str, args: Vec<Expr>) -> Self {
        Self::unplaced(ExprKind::New {
            type_name: type_name.into(),
            args,
        })
    }

    pub fn cast(type_name: &str, expr: Expr) -> Self {
        Self::unplaced(ExprKind::Cast {
            type_name: type_name.into(),
            expr: Box::new(expr),
        })
    }

    pub fn call(receiver: Option<Expr>, method: &str, args: Vec<Expr>) -> Self {
        Self::unplaced(ExprKind::Call {
            receiver: receiver.map(Box::new),
            method: method.into(),
            args,
        })
    }

    pub fn field(receiver: Expr, field: &str) -> Self {
        Self::unplaced(ExprKind::Field {
            receiver: Box::new(receiver),
            field: field.into(),
        })
    }

    pub fn opaque(text: &str) -> Self {
        Self::unplaced(ExprKind::Opaque(text.into()))
    }

    /// Direct sub-expressions, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Name(_) | ExprKind::Opaque(_) => Vec::new(),
            ExprKind::New { args, .. } => args.iter().collect(),
            ExprKind::Cast { expr, .. } => vec![expr],
            ExprKind::Call { receiver, args, .. } => {
                receiver.iter().map(|r| &**r).chain(args.iter()).collect()
            }
            ExprKind::Field { receiver, .. } => vec![receiver],
        }
    }

    /// Every bare name referenced by this expression, depth-first.
    ///
    /// Unqualified method calls (`insert(x)`) are reported too, since they
    /// resolve against functions and helper members.
    pub fn referenced_names(&self) -> Vec<(&SmolStr, TextRange)> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<(&'a SmolStr, TextRange)>) {
        match &self.kind {
            ExprKind::Name(name) => out.push((name, self.range)),
            ExprKind::Call {
                receiver: None,
                method,
                ..
            } => out.push((method, self.range)),
            _ => {}
        }
        for child in self.children() {
            child.collect_names(out);
        }
    }
}
