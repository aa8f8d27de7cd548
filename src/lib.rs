//! # drl-scope
//!
//! Scope and symbol resolution for DRL rule files: which names are visible
//! at a position, what they denote, and where they were declared.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → IDE features (completion, goto-def, inlay hints, diagnostics)
//!   ↓
//! hir     → Scope resolution: providers, resolver, implicit-variable cache
//!   ↓
//! syntax  → Rule-file tree consumed by the resolver
//!   ↓
//! base    → Primitives (FileId, TextRange, LineIndex)
//! ```

/// Foundation types: FileId, TextRange, LineIndex
pub mod base;

/// Rule-file tree and builder
pub mod syntax;

/// High-level IR: scope resolution
pub mod hir;

/// IDE features: analysis snapshots, completion, goto-definition
pub mod ide;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
