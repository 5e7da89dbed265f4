// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Swift→Kotlin transpiler core.
//!
//! This crate contains the semantic rewriting pipeline:
//! - Canonical typed AST able to express both languages ([`ast`])
//! - Compositional tree-rewrite framework ([`pass`])
//! - The recording and semantic-rewrite passes ([`passes`])
//! - Cross-file registry built in the first round ([`context`])
//! - Call-argument matcher ([`matcher`])
//! - Kotlin emitter with source-position provenance ([`emitter`],
//!   [`translation`])
//!
//! Parsing Swift into the typed AST, CLI driving, and build orchestration
//! are external collaborators: the core consumes [`driver::TranspilationUnit`]s,
//! a [`driver::TypeOracle`], and a [`context::Configuration`], and produces
//! Kotlin text with a line-map and diagnostics.

pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod driver;
pub mod emitter;
pub mod matcher;
pub mod pass;
pub mod passes;
pub mod source_range;
pub mod translation;
pub mod type_strings;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
pub(crate) mod test_helpers;

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Provenance, Statement};
    pub use crate::context::{Configuration, TranspilationContext};
    pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
    pub use crate::driver::{
        NullTypeOracle, TranspilationResult, TranspilationUnit, TypeOracle, transpile,
    };
    pub use crate::source_range::{SourcePosition, SourceRange};
}
