//! IDE features: High-level APIs for editor integrations.
//!
//! This module sits between the scope resolver (HIR) and whatever serves
//! editor requests. Each function corresponds to one request kind.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take a snapshot in, return data out
//! 2. **No protocol types**: Uses our own types, converted at the boundary
//! 3. **Composable**: Everything is built on [`ScopeResolver`](crate::hir::ScopeResolver)
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! let file = host.set_file("rules.drl", tree);
//!
//! let analysis = host.analysis();
//! let items = analysis.completions(file, offset)?;
//! ```

mod analysis;
mod completion;
mod goto;
mod inlay_hints;
mod semantic_tokens;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use inlay_hints::{InlayHint, inlay_hints};
pub use semantic_tokens::{SemanticToken, TokenType, semantic_tokens};
