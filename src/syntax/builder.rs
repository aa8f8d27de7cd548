//! Fluent construction of [`RuleFile`] trees without source text.
//!
//! Every node gets a synthetic range from a running cursor. Leaves are
//! [`LEAF_WIDTH`] wide, siblings are separated by a one-byte gap, and a
//! container's range strictly encloses its children, so `rule_at` and the
//! statement-position logic behave exactly as they would on parsed text.
//!
//! ```
//! use drlscope::syntax::{Expr, RuleFileBuilder};
//!
//! let file = RuleFileBuilder::new()
//!     .global("java.util.List", "items")
//!     .rule("R1", |r| {
//!         r.when(|c| {
//!             c.bind("$f", "Fact");
//!         });
//!         r.then(|a| {
//!             a.assign("x", Expr::int(1));
//!         });
//!     })
//!     .build();
//! assert_eq!(file.rules.len(), 1);
//! ```

use smol_str::SmolStr;

use super::tree::*;
use crate::base::{TextRange, TextSize};

/// Width of every leaf node.
pub const LEAF_WIDTH: u32 = 4;

#[derive(Debug, Default)]
struct Layout {
    cursor: u32,
}

impl Layout {
    fn leaf(&mut self) -> TextRange {
        let start = self.cursor;
        self.cursor += LEAF_WIDTH + 1;
        TextRange::new(start.into(), (start + LEAF_WIDTH).into())
    }

    fn open(&mut self) -> TextSize {
        let start = self.cursor;
        self.cursor += 1;
        start.into()
    }

    fn close(&mut self, start: TextSize) -> TextRange {
        let end = self.cursor;
        self.cursor += 1;
        TextRange::new(start, end.into())
    }

    /// Assign ranges to an expression tree built with the `Expr` helpers.
    fn place_expr(&mut self, expr: &mut Expr) {
        let start = self.open();
        match &mut expr.kind {
            ExprKind::Literal(_) | ExprKind::Name(_) | ExprKind::Opaque(_) => {
                // leaves still get a visible width
                self.cursor += LEAF_WIDTH;
            }
            ExprKind::New { args, .. } => args.iter_mut().for_each(|a| self.place_expr(a)),
            ExprKind::Cast { expr: inner, .. } => self.place_expr(inner),
            ExprKind::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    self.place_expr(receiver);
                }
                args.iter_mut().for_each(|a| self.place_expr(a));
            }
            ExprKind::Field { receiver, .. } => self.place_expr(receiver),
        }
        expr.range = self.close(start);
    }
}

/// Builds a whole rule file. Nodes are laid out in call order.
#[derive(Debug)]
pub struct RuleFileBuilder {
    layout: Layout,
    start: TextSize,
    file: RuleFile,
}

impl Default for RuleFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleFileBuilder {
    pub fn new() -> Self {
        let mut layout = Layout::default();
        let start = layout.open();
        Self {
            layout,
            start,
            file: RuleFile::default(),
        }
    }

    pub fn package(mut self, name: &str) -> Self {
        self.layout.leaf();
        self.file.package = Some(name.into());
        self
    }

    fn import(mut self, target: SmolStr, kind: ImportKind) -> Self {
        let range = self.layout.leaf();
        self.file.imports.push(Import {
            target,
            kind,
            range,
        });
        self
    }

    /// `import a.b.Type;`
    pub fn import_class(self, target: &str) -> Self {
        self.import(target.into(), ImportKind::Class)
    }

    /// `import a.b.*;` (pass the package name without `.*`).
    pub fn import_package(self, package: &str) -> Self {
        let target = format!("{}.*", package.trim_end_matches(".*"));
        self.import(target.into(), ImportKind::Package)
    }

    /// `import static a.b.Type.member;`
    pub fn import_static(self, target: &str) -> Self {
        self.import(target.into(), ImportKind::Static)
    }

    /// `import function a.b.Type.method;`
    pub fn import_function(self, target: &str) -> Self {
        self.import(target.into(), ImportKind::Function)
    }

    /// `declare Name field : Type ... end`
    pub fn declare_class(mut self, name: &str, fields: &[(&str, &str)]) -> Self {
        let range = self.layout.leaf();
        self.file.declared_types.push(TypeDeclaration {
            name: name.into(),
            shape: DeclShape::Class,
            fields: fields
                .iter()
                .map(|(field, ty)| FieldDecl {
                    name: (*field).into(),
                    type_name: (*ty).into(),
                })
                .collect(),
            range,
        });
        self
    }

    /// `declare enum Name ... end`
    pub fn declare_enum(mut self, name: &str) -> Self {
        let range = self.layout.leaf();
        self.file.declared_types.push(TypeDeclaration {
            name: name.into(),
            shape: DeclShape::Enum,
            fields: Vec::new(),
            range,
        });
        self
    }

    /// `global Type name;`
    pub fn global(mut self, type_name: &str, name: &str) -> Self {
        let range = self.layout.leaf();
        self.file.globals.push(GlobalVariable {
            name: name.into(),
            type_name: type_name.into(),
            range,
        });
        self
    }

    /// `function ReturnType name(Type p, ...) { ... }`
    pub fn function(
        mut self,
        return_type: Option<&str>,
        name: &str,
        params: &[(&str, &str)],
    ) -> Self {
        let range = self.layout.leaf();
        self.file.functions.push(FunctionDeclaration {
            name: name.into(),
            return_type: return_type.map(SmolStr::from),
            params: params
                .iter()
                .map(|(ty, param)| Param {
                    name: (*param).into(),
                    type_name: (*ty).into(),
                })
                .collect(),
            range,
        });
        self
    }

    /// `unit Name;`
    pub fn unit(mut self, name: &str) -> Self {
        let range = self.layout.leaf();
        self.file.unit = Some(UnitRef {
            name: name.into(),
            range,
        });
        self
    }

    pub fn rule(mut self, name: &str, build: impl FnOnce(&mut RuleBuilder<'_>)) -> Self {
        let start = self.layout.open();
        self.layout.leaf();
        let mut builder = RuleBuilder {
            layout: &mut self.layout,
            name: name.into(),
            parent: None,
            condition: None,
            action: None,
        };
        build(&mut builder);
        let rule = builder.finish(start);
        self.file.rules.push(rule);
        self
    }

    pub fn build(mut self) -> RuleFile {
        self.file.range = self.layout.close(self.start);
        self.file
    }
}

/// Builds one rule. Call `extends`, `when` and `then` in textual order.
#[derive(Debug)]
pub struct RuleBuilder<'a> {
    layout: &'a mut Layout,
    name: SmolStr,
    parent: Option<ParentRef>,
    condition: Option<ConditionSection>,
    action: Option<ActionSection>,
}

impl RuleBuilder<'_> {
    pub fn extends(&mut self, parent: &str) -> &mut Self {
        let range = self.layout.leaf();
        self.parent = Some(ParentRef {
            name: parent.into(),
            range,
        });
        self
    }

    pub fn when(&mut self, build: impl FnOnce(&mut PatternsBuilder<'_>)) -> &mut Self {
        let start = self.layout.open();
        let mut patterns = PatternsBuilder::new(self.layout);
        build(&mut patterns);
        let patterns = patterns.patterns;
        self.condition = Some(ConditionSection {
            patterns,
            range: self.layout.close(start),
        });
        self
    }

    pub fn then(&mut self, build: impl FnOnce(&mut StatementsBuilder<'_>)) -> &mut Self {
        let start = self.layout.open();
        let mut statements = StatementsBuilder::new(self.layout);
        build(&mut statements);
        let statements = statements.statements;
        self.action = Some(ActionSection {
            statements,
            range: self.layout.close(start),
        });
        self
    }

    fn finish(self, start: TextSize) -> Rule {
        let condition = match self.condition {
            Some(condition) => condition,
            None => ConditionSection {
                patterns: Vec::new(),
                range: self.layout.leaf(),
            },
        };
        let action = match self.action {
            Some(action) => action,
            None => ActionSection {
                statements: Vec::new(),
                range: self.layout.leaf(),
            },
        };
        Rule {
            name: self.name,
            parent: self.parent,
            condition,
            action,
            range: self.layout.close(start),
        }
    }
}

/// Builds a list of condition patterns.
#[derive(Debug)]
pub struct PatternsBuilder<'a> {
    layout: &'a mut Layout,
    patterns: Vec<Pattern>,
}

impl<'a> PatternsBuilder<'a> {
    fn new(layout: &'a mut Layout) -> Self {
        Self {
            layout,
            patterns: Vec::new(),
        }
    }

    fn nested(
        &mut self,
        build: impl FnOnce(&mut PatternsBuilder<'_>),
        kind: impl FnOnce(Vec<Pattern>) -> PatternKind,
    ) -> &mut Self {
        let start = self.layout.open();
        let mut inner = PatternsBuilder::new(self.layout);
        build(&mut inner);
        let children = inner.patterns;
        let range = self.layout.close(start);
        self.patterns.push(Pattern {
            kind: kind(children),
            range,
        });
        self
    }

    /// `$name : Type()`
    pub fn bind(&mut self, name: &str, constrained_type: &str) -> &mut Self {
        let range = self.layout.leaf();
        self.patterns.push(Pattern {
            kind: PatternKind::Bind {
                name: Some(name.into()),
                constrained_type: constrained_type.into(),
                constraints: Vec::new(),
            },
            range,
        });
        self
    }

    /// `Type()` with no bind.
    pub fn fact(&mut self, constrained_type: &str) -> &mut Self {
        let range = self.layout.leaf();
        self.patterns.push(Pattern {
            kind: PatternKind::Bind {
                name: None,
                constrained_type: constrained_type.into(),
                constraints: Vec::new(),
            },
            range,
        });
        self
    }

    /// `$name : Type( constraints )`
    pub fn bind_with(
        &mut self,
        name: Option<&str>,
        constrained_type: &str,
        build: impl FnOnce(&mut PatternsBuilder<'_>),
    ) -> &mut Self {
        let name = name.map(SmolStr::from);
        let constrained_type = SmolStr::from(constrained_type);
        self.nested(build, |constraints| PatternKind::Bind {
            name,
            constrained_type,
            constraints,
        })
    }

    /// `$name : field` inside a constraint list.
    pub fn field_bind(&mut self, name: &str, field: &str) -> &mut Self {
        let range = self.layout.leaf();
        self.patterns.push(Pattern {
            kind: PatternKind::FieldBind {
                name: name.into(),
                field: field.into(),
            },
            range,
        });
        self
    }

    /// `$name : /a/b/c` (OOPath). Each segment gets its own range.
    pub fn path(&mut self, name: Option<&str>, segments: &[&str]) -> &mut Self {
        let start = self.layout.open();
        let segments = segments
            .iter()
            .map(|segment| PathSegment {
                name: (*segment).into(),
                range: self.layout.leaf(),
            })
            .collect();
        let range = self.layout.close(start);
        self.patterns.push(Pattern {
            kind: PatternKind::PathBind {
                name: name.map(SmolStr::from),
                segments,
            },
            range,
        });
        self
    }

    /// `accumulate( source ; $name : function(...) )`
    pub fn accumulate(
        &mut self,
        name: &str,
        function: &str,
        build: impl FnOnce(&mut PatternsBuilder<'_>),
    ) -> &mut Self {
        let name = SmolStr::from(name);
        let function = SmolStr::from(function);
        self.nested(build, |source| PatternKind::Accumulate {
            name,
            function,
            source,
        })
    }

    /// `not ( ... )`, `or ( ... )` and friends.
    pub fn group(
        &mut self,
        op: GroupOp,
        build: impl FnOnce(&mut PatternsBuilder<'_>),
    ) -> &mut Self {
        self.nested(build, |children| PatternKind::Group { op, children })
    }
}

/// Builds a list of action statements.
#[derive(Debug)]
pub struct StatementsBuilder<'a> {
    layout: &'a mut Layout,
    statements: Vec<Statement>,
}

impl<'a> StatementsBuilder<'a> {
    fn new(layout: &'a mut Layout) -> Self {
        Self {
            layout,
            statements: Vec::new(),
        }
    }

    fn push(&mut self, build: impl FnOnce(&mut Layout) -> StatementKind) -> &mut Self {
        let start = self.layout.open();
        let kind = build(self.layout);
        let range = self.layout.close(start);
        self.statements.push(Statement { kind, range });
        self
    }

    fn placed(layout: &mut Layout, mut expr: Expr) -> Expr {
        layout.place_expr(&mut expr);
        expr
    }

    /// `Type name = init;`
    pub fn declare(&mut self, type_name: &str, name: &str, init: Option<Expr>) -> &mut Self {
        self.push(|layout| StatementKind::LocalDecl {
            name: name.into(),
            type_name: Some(type_name.into()),
            init: init.map(|init| Self::placed(layout, init)),
        })
    }

    /// `var name = init;`
    pub fn declare_inferred(&mut self, name: &str, init: Expr) -> &mut Self {
        self.push(|layout| StatementKind::LocalDecl {
            name: name.into(),
            type_name: None,
            init: Some(Self::placed(layout, init)),
        })
    }

    /// `target = value;`
    pub fn assign(&mut self, target: &str, value: Expr) -> &mut Self {
        self.push(|layout| StatementKind::Assignment {
            target: target.into(),
            value: Self::placed(layout, value),
        })
    }

    /// `expr;`
    pub fn expr(&mut self, expr: Expr) -> &mut Self {
        self.push(|layout| StatementKind::Expr(Self::placed(layout, expr)))
    }

    /// `{ ... }`
    pub fn block(&mut self, build: impl FnOnce(&mut StatementsBuilder<'_>)) -> &mut Self {
        self.push(|layout| {
            let mut inner = StatementsBuilder::new(layout);
            build(&mut inner);
            StatementKind::Block(inner.statements)
        })
    }
}
