// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The per-run pipeline: first round over every file, second round and
//! emission per file.
//!
//! The pipeline is single-threaded per file. The first round mutates the
//! shared context and runs single-threaded over all files, after which the
//! context is frozen; the second round and emission are pure over
//! `(AST, &context)`, so callers may process files on parallel threads.

use crate::ast::{Statement, SyntaxHandle};
use crate::context::{Configuration, TranspilationContext};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emitter::KotlinEmitter;
use crate::pass::run_pass;
use crate::passes::{recording, second_round_passes};
use camino::Utf8PathBuf;
use ecow::EcoString;
use tracing::debug;

/// The index oracle supplied by the frontend: type queries the AST cannot
/// answer itself.
pub trait TypeOracle {
    /// The type of the parent expression of the node behind `handle`, if the
    /// frontend knows it.
    fn parent_type(&self, handle: SyntaxHandle) -> Option<EcoString>;
}

/// An oracle that knows nothing. Used when the frontend supplies no index,
/// and by tests.
pub struct NullTypeOracle;

impl TypeOracle for NullTypeOracle {
    fn parent_type(&self, _handle: SyntaxHandle) -> Option<EcoString> {
        None
    }
}

/// One file's typed AST, as delivered by the frontend.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspilationUnit {
    /// The Swift source path.
    pub source_path: Utf8PathBuf,
    /// Where the Kotlin output should land, when the frontend mapped it.
    pub output_path: Option<Utf8PathBuf>,
    /// Top-level declarations.
    pub declarations: Vec<Statement>,
    /// Top-level non-declaration statements.
    pub statements: Vec<Statement>,
}

impl TranspilationUnit {
    /// A unit over the given declarations with no top-level statements.
    #[must_use]
    pub fn new(source_path: impl Into<Utf8PathBuf>, declarations: Vec<Statement>) -> Self {
        Self {
            source_path: source_path.into(),
            output_path: None,
            declarations,
            statements: Vec::new(),
        }
    }
}

/// One file's transpilation output.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspilationResult {
    /// The Swift source path the output came from.
    pub source_path: Utf8PathBuf,
    /// Where the Kotlin output should land, when mapped.
    pub output_path: Option<Utf8PathBuf>,
    /// The Kotlin source text.
    pub kotlin: String,
    /// The output→source line-map (one entry per line, see the translation
    /// buffer docs).
    pub line_map: String,
    /// Diagnostics collected for this file during the second round.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the first round: every recording pass over every unit, in the fixed
/// order. The context is write-only here and frozen afterwards.
pub fn populate_context(units: &mut [TranspilationUnit], context: &mut TranspilationContext) {
    debug!(files = units.len(), "populating transpilation context");
    recording::run_first_round(units, context);
}

/// Runs the second round over one unit: every semantic-rewrite pass in the
/// fixed order, against the frozen context.
#[must_use]
pub fn rewrite_unit(
    mut unit: TranspilationUnit,
    context: &TranspilationContext,
    oracle: &dyn TypeOracle,
    diagnostics: &mut Diagnostics,
) -> TranspilationUnit {
    for mut pass in second_round_passes() {
        debug!(pass = pass.name(), file = %unit.source_path, "running pass");
        unit = run_pass(pass.as_mut(), unit, context, oracle, diagnostics);
    }
    unit
}

/// Transpiles a batch of files end to end: first round across all of them,
/// then per-file rewriting and emission.
#[must_use]
pub fn transpile(
    mut units: Vec<TranspilationUnit>,
    configuration: Configuration,
    oracle: &dyn TypeOracle,
) -> Vec<TranspilationResult> {
    let mut context = TranspilationContext::new(configuration);
    populate_context(&mut units, &mut context);
    let context = context;

    units
        .into_iter()
        .map(|unit| {
            let mut diagnostics = Diagnostics::new();
            let unit = rewrite_unit(unit, &context, oracle, &mut diagnostics);
            let emitter = KotlinEmitter::new(&context);
            let (kotlin, line_map) = emitter.emit_unit(&unit).resolve();
            debug!(
                file = %unit.source_path,
                errors = diagnostics.error_count(),
                warnings = diagnostics.warning_count(),
                "emitted"
            );
            TranspilationResult {
                source_path: unit.source_path,
                output_path: unit.output_path,
                kotlin,
                line_map,
                diagnostics: diagnostics.into_entries(),
            }
        })
        .collect()
}
