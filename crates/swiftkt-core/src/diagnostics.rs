// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics: warnings and errors with source ranges.
//!
//! Warning passes emit diagnostics without touching the AST; recoverable
//! errors pair a diagnostic with an `Error` sentinel node. The run's exit
//! status is derived from the error count only — warnings never fail a run.

use crate::source_range::SourceRange;
use ecow::EcoString;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A construct could not be translated; the output contains a sentinel.
    Error,
    /// A construct was translated inexactly.
    Warning,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// Plain-text message.
    pub message: EcoString,
    /// The source location, when known.
    pub range: Option<SourceRange>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, range: Option<SourceRange>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            range,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, range: Option<SourceRange>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            range,
        }
    }
}

/// An append-only diagnostic sink with queryable counts.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Records a warning.
    pub fn warn(&mut self, message: impl Into<EcoString>, range: Option<SourceRange>) {
        self.push(Diagnostic::warning(message, range));
    }

    /// Records an error.
    pub fn error(&mut self, message: impl Into<EcoString>, range: Option<SourceRange>) {
        self.push(Diagnostic::error(message, range));
    }

    /// All recorded diagnostics, in emission order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Consumes the sink, returning the recorded diagnostics.
    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Whether the run should exit with failure. Errors only; warnings never
    /// fail a run.
    #[must_use]
    pub fn exit_status_is_failure(&self) -> bool {
        self.error_count() > 0
    }
}
