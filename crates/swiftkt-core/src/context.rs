// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The cross-file transpilation context.
//!
//! The context is the only state shared between files. Its lifecycle is
//! `new → populate (first round) → read-only (second round) → discard`:
//! recording passes append to it while every file's declarations are scanned,
//! after which the driver hands out only shared references. Running the first
//! round single-threaded keeps every record call a plain `&mut` append.

use crate::ast::{EnumDeclaration, Expression, FunctionParameter};
use camino::Utf8PathBuf;
use ecow::EcoString;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Run configuration, loaded by the embedding driver.
///
/// Only `indentation` and `defaults_to_final` are consulted by the core; the
/// remaining fields are forwarded to the frontend untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// The whitespace inserted per nesting level (typically `\t` or four
    /// spaces).
    pub indentation: EcoString,
    /// When true, declarations whose openness is otherwise ambiguous default
    /// to non-open.
    pub defaults_to_final: bool,
    /// Target toolchain version; forwarded, not consulted.
    pub target_version: Option<EcoString>,
    /// Toolchain name; forwarded, not consulted.
    pub toolchain_name: Option<EcoString>,
    /// Xcode project path; forwarded, not consulted.
    pub xcode_project_path: Option<Utf8PathBuf>,
    /// Build target; forwarded, not consulted.
    pub target: Option<EcoString>,
    /// Absolute file paths and any other compiler arguments; forwarded, not
    /// consulted.
    pub compilation_arguments: Vec<EcoString>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            indentation: "\t".into(),
            defaults_to_final: false,
            target_version: None,
            toolchain_name: None,
            xcode_project_path: None,
            target: None,
            compilation_arguments: Vec::new(),
        }
    }
}

/// A recorded function signature: how calls to `source_api_name` should be
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTranslation {
    /// The function's name as it appears at Swift call sites.
    pub source_api_name: EcoString,
    /// The function's full type, used to disambiguate same-named functions.
    pub type_name: EcoString,
    /// The output name to call.
    pub prefix: EcoString,
    /// The declared parameters, used by the argument matcher.
    pub parameters: Vec<FunctionParameter>,
}

/// A registered template: a source pattern with holes and the target snippet
/// to splice matched holes into.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRule {
    /// The pattern. Declaration references whose identifier starts with `_`
    /// are holes.
    pub pattern: Expression,
    /// The Kotlin snippet, with `_hole` names referencing pattern holes.
    pub replacement: EcoString,
}

/// The shared cross-file registry.
#[derive(Debug, Default)]
pub struct TranspilationContext {
    /// Run configuration.
    pub configuration: Configuration,
    protocols: HashSet<EcoString>,
    enum_classes: HashSet<EcoString>,
    sealed_classes: HashSet<EcoString>,
    enum_declarations: HashMap<EcoString, EnumDeclaration>,
    inheritances: HashMap<EcoString, Vec<EcoString>>,
    function_translations: Vec<FunctionTranslation>,
    pure_functions: HashSet<EcoString>,
    templates: Vec<TemplateRule>,
}

impl TranspilationContext {
    /// A fresh context for the given configuration.
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            ..Self::default()
        }
    }

    // ── Recording (first round) ──────────────────────────────────────────────

    /// Records a declared protocol name.
    pub fn record_protocol(&mut self, name: impl Into<EcoString>) {
        self.protocols.insert(name.into());
    }

    /// Records that `name` compiles as a Kotlin `enum class`.
    pub fn record_enum_class(&mut self, name: impl Into<EcoString>) {
        self.enum_classes.insert(name.into());
    }

    /// Records that `name` compiles as a Kotlin `sealed class`, keeping its
    /// declaration so later passes can look up element signatures.
    pub fn record_sealed_class(&mut self, name: impl Into<EcoString>, declaration: EnumDeclaration) {
        let name = name.into();
        self.sealed_classes.insert(name.clone());
        self.enum_declarations.insert(name, declaration);
    }

    /// Records the declared inheritances of a fully qualified type.
    pub fn record_inheritance(
        &mut self,
        full_type: impl Into<EcoString>,
        inherits: Vec<EcoString>,
    ) {
        self.inheritances
            .entry(full_type.into())
            .or_default()
            .extend(inherits);
    }

    /// Records a function signature translation.
    pub fn record_function_translation(&mut self, translation: FunctionTranslation) {
        self.function_translations.push(translation);
    }

    /// Records a known-pure function identifier.
    pub fn record_pure_function(&mut self, name: impl Into<EcoString>) {
        self.pure_functions.insert(name.into());
    }

    /// Registers a template rule.
    pub fn record_template(&mut self, template: TemplateRule) {
        self.templates.push(template);
    }

    // ── Lookup (second round) ────────────────────────────────────────────────

    /// Whether `name` is a declared protocol.
    #[must_use]
    pub fn is_protocol(&self, name: &str) -> bool {
        self.protocols.contains(name)
    }

    /// Whether `name` compiles as an `enum class`.
    #[must_use]
    pub fn is_enum_class(&self, name: &str) -> bool {
        self.enum_classes.contains(name)
    }

    /// Whether `name` compiles as a `sealed class`.
    #[must_use]
    pub fn is_sealed_class(&self, name: &str) -> bool {
        self.sealed_classes.contains(name)
    }

    /// The recorded declaration of a sealed-class enum.
    #[must_use]
    pub fn sealed_class_declaration(&self, name: &str) -> Option<&EnumDeclaration> {
        self.enum_declarations.get(name)
    }

    /// The recorded inheritances of a fully qualified type.
    #[must_use]
    pub fn inheritances_of(&self, full_type: &str) -> &[EcoString] {
        self.inheritances
            .get(full_type)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether `full_type` declares `inherited` among its inheritances.
    #[must_use]
    pub fn inherits_from(&self, full_type: &str, inherited: &str) -> bool {
        self.inheritances_of(full_type)
            .iter()
            .any(|name| name == inherited)
    }

    /// The most recently recorded translation whose source name and type both
    /// match. Collisions share a name; the type disambiguates, and when two
    /// translations share both, the last writer wins.
    #[must_use]
    pub fn get_function_translation(
        &self,
        name: &str,
        type_name: &str,
    ) -> Option<&FunctionTranslation> {
        self.function_translations
            .iter()
            .rev()
            .find(|t| t.source_api_name == name && t.type_name == type_name)
    }

    /// Whether `name` was recorded as side-effect free.
    #[must_use]
    pub fn is_pure_function(&self, name: &str) -> bool {
        self.pure_functions.contains(name)
    }

    /// The registered template rules, in registration order.
    #[must_use]
    pub fn templates(&self) -> &[TemplateRule] {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Provenance;

    fn translation(name: &str, type_name: &str, prefix: &str) -> FunctionTranslation {
        FunctionTranslation {
            source_api_name: name.into(),
            type_name: type_name.into(),
            prefix: prefix.into(),
            parameters: Vec::new(),
        }
    }

    #[test]
    fn function_translation_last_writer_wins() {
        let mut context = TranspilationContext::default();
        context.record_function_translation(translation("f", "(Int) -> Int", "first"));
        context.record_function_translation(translation("f", "(Int) -> Int", "second"));
        let found = context
            .get_function_translation("f", "(Int) -> Int")
            .expect("translation should be recorded");
        assert_eq!(found.prefix, "second");
    }

    #[test]
    fn function_translation_disambiguates_by_type() {
        let mut context = TranspilationContext::default();
        context.record_function_translation(translation("f", "(Int) -> Int", "ints"));
        context.record_function_translation(translation("f", "(String) -> String", "strings"));
        let found = context
            .get_function_translation("f", "(Int) -> Int")
            .expect("translation should be recorded");
        assert_eq!(found.prefix, "ints");
        assert!(context.get_function_translation("f", "(Bool) -> Bool").is_none());
    }

    #[test]
    fn inheritance_multimap_appends() {
        let mut context = TranspilationContext::default();
        context.record_inheritance("A.B", vec!["Equatable".into()]);
        context.record_inheritance("A.B", vec!["Codable".into()]);
        assert!(context.inherits_from("A.B", "Equatable"));
        assert!(context.inherits_from("A.B", "Codable"));
        assert!(!context.inherits_from("A.B", "Hashable"));
    }

    #[test]
    fn enum_kind_sets_are_disjoint_by_construction() {
        let mut context = TranspilationContext::default();
        context.record_enum_class("Compass");
        context.record_sealed_class(
            "Shape",
            EnumDeclaration {
                name: "Shape".into(),
                access: None,
                annotations: Vec::new(),
                inherits: Vec::new(),
                elements: Vec::new(),
                members: Vec::new(),
                raw_value_type: None,
                origin: Provenance::default(),
            },
        );
        assert!(context.is_enum_class("Compass"));
        assert!(!context.is_sealed_class("Compass"));
        assert!(context.is_sealed_class("Shape"));
        assert!(context.sealed_class_declaration("Shape").is_some());
    }

    #[test]
    fn default_configuration_uses_tabs() {
        let configuration = Configuration::default();
        assert_eq!(configuration.indentation, "\t");
        assert!(!configuration.defaults_to_final);
    }
}
