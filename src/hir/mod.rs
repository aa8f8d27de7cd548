//! High-level IR (HIR): scope resolution over rule files.
//!
//! Answers one question: given a position in a rule file, which names can
//! be referenced there, what do they denote, and which provider made them
//! visible?
//!
//! ## Key Types
//!
//! - [`ScopeResolver`]: Runs the provider chain for one request
//! - [`DeclarationProvider`]: One category of visible symbol
//! - [`SymbolVisitor`]: Receives symbols and decides when to stop
//! - [`Symbol`] / [`Origin`]: A visible name and the provider behind it
//! - [`TypeLookup`]: Host type system supplied by the caller
//! - [`ImplicitVarCache`]: Revision-checked memo of implicit variable types
//!
//! ## Provider Chain
//!
//! ```text
//! ResolveRequest { position, target_name?, cancellation? }
//!     │
//!     ▼
//! ScopeResolver::resolve      ← fixed provider order (ResolveConfig)
//!     │
//!     ├── declarations        ← declare / function / global
//!     ├── imports             ← static, function, class, package
//!     ├── implicit variables  ← kcontext, drools (+ helper members)
//!     ├── unit members        ← methods and bean properties
//!     ├── locals              ← earlier statements of the `then` block
//!     ├── binds               ← own rule first, then `extends` chain
//!     └── path segments       ← OOPath property under the cursor
//!     │
//!     ▼
//! SymbolVisitor               ← Continue / Break
//! ```

mod bindings;
mod cache;
mod config;
mod diagnostics;
mod error;
mod ids;
mod providers;
mod resolve;
mod source;
mod symbols;
mod types;

pub use bindings::{
    BindFilter, BindKind, BindingWalker, all_bindings_visible_at, all_bindings_visible_at_matching,
};
pub use cache::{ImplicitVarCache, ResolvedImplicit};
pub use config::{ImplicitVariable, ResolveConfig};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity, check_file, codes,
};
pub use error::{ScopeError, ScopeResult};
pub use ids::{LocalRuleId, Revision, RuleId};
pub use providers::{
    DeclarationProvider, DeclaredTypeProvider, FunctionProvider, GlobalProvider,
    ImplicitVariableProvider, ImportedClassProvider, ImportedFunctionProvider,
    ImportedPackageProvider, ImportedStaticProvider, LocalVariableProvider, PathBindProvider,
    PathSegmentProvider, PatternBindProvider, UnitMemberProvider, local_variables_at,
    probe_implicit_variables, provider_for,
};
pub use resolve::{
    FirstMatch, OriginRecorder, ResolveCtx, ResolveRequest, ScopeResolver, SymbolCollector,
    SymbolVisitor,
};
pub use source::{FileSet, FileSnapshot};
pub use symbols::{Origin, SourceLocation, Symbol, SymbolKind};
pub use types::{
    BeanProperty, FieldInfo, MethodInfo, PrimitiveType, SearchScope, TypeDescriptor, TypeLookup,
    TypeRef, TypeRegistry, simple_name,
};
