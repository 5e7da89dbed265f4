// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Warning passes: constructs whose translation is inexact draw a diagnostic
//! and (except for unsupported struct initializers, which are deleted) no AST
//! change.

use crate::ast::{
    DeclarationReference, EnumDeclaration, Expression, InitializerDeclaration, Provenance,
    Statement, StructDeclaration,
};
use crate::pass::{
    Ancestor, RewritePass, Traversal, walk_enum_declaration, walk_expression,
    walk_initializer_declaration, walk_struct_declaration,
};
use ecow::eco_format;

// ── Standard-library references ──────────────────────────────────────────────

/// A declaration reference still flagged as standard-library after template
/// replacement has no translation; warn.
#[derive(Default)]
pub struct StandardLibraryWarning;

impl RewritePass for StandardLibraryWarning {
    fn name(&self) -> &'static str {
        "standard-library-warning"
    }

    fn process_declaration_reference(
        &mut self,
        t: &mut Traversal<'_>,
        reference: DeclarationReference,
    ) -> DeclarationReference {
        if reference.is_standard_library {
            t.diagnostics.warn(
                eco_format!(
                    "reference to standard library symbol `{}` was not replaced by a template; \
                     the Kotlin output may not compile",
                    reference.identifier
                ),
                reference.origin.range,
            );
        }
        reference
    }
}

// ── Double optionals ─────────────────────────────────────────────────────────

/// Expressions typed `T??` collapse in Kotlin; warn on every one.
#[derive(Default)]
pub struct DoubleOptionalWarning;

impl RewritePass for DoubleOptionalWarning {
    fn name(&self) -> &'static str {
        "double-optional-warning"
    }

    fn replace_expression(&mut self, t: &mut Traversal<'_>, expression: Expression) -> Expression {
        if let Some(type_name) = expression.type_name() {
            if type_name.ends_with("??") {
                t.diagnostics.warn(
                    eco_format!(
                        "expression of double optional type `{type_name}` loses a level of \
                         optionality in Kotlin"
                    ),
                    expression.range(),
                );
            }
        }
        walk_expression(self, t, expression)
    }
}

// ── Mutable value types ──────────────────────────────────────────────────────

/// Structs and enums translate to reference types, so mutable stored
/// properties and mutating methods change meaning; warn on each.
#[derive(Default)]
pub struct MutableValueTypeWarning;

fn warn_on_mutable_members(
    t: &mut Traversal<'_>,
    type_kind: &str,
    type_name: &str,
    members: &[Statement],
) {
    for member in members {
        match member {
            Statement::Variable(variable)
                if !variable.is_let && variable.getter.is_none() && !variable.is_static =>
            {
                t.diagnostics.warn(
                    eco_format!(
                        "mutable stored property `{}` on {type_kind} `{type_name}` behaves as a \
                         reference in Kotlin; value semantics are lost",
                        variable.identifier
                    ),
                    variable.origin.range,
                );
            }
            Statement::Function(function) if function.is_mutating => {
                t.diagnostics.warn(
                    eco_format!(
                        "mutating method `{}` on {type_kind} `{type_name}` mutates a reference \
                         in Kotlin; value semantics are lost",
                        function.prefix
                    ),
                    function.origin.range,
                );
            }
            _ => {}
        }
    }
}

impl RewritePass for MutableValueTypeWarning {
    fn name(&self) -> &'static str {
        "mutable-value-type-warning"
    }

    fn process_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: StructDeclaration,
    ) -> StructDeclaration {
        warn_on_mutable_members(t, "struct", &declaration.name, &declaration.members);
        walk_struct_declaration(self, t, declaration)
    }

    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: EnumDeclaration,
    ) -> EnumDeclaration {
        warn_on_mutable_members(t, "enum", &declaration.name, &declaration.members);
        walk_enum_declaration(self, t, declaration)
    }
}

// ── Struct initializers ──────────────────────────────────────────────────────

/// Explicit struct initializers beyond the synthesized memberwise one are
/// unsupported: warn and delete.
#[derive(Default)]
pub struct StructInitializerWarning;

impl RewritePass for StructInitializerWarning {
    fn name(&self) -> &'static str {
        "struct-initializer-warning"
    }

    fn replace_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: InitializerDeclaration,
    ) -> Vec<Statement> {
        let in_struct = matches!(
            t.ancestors()
                .iter()
                .rev()
                .find(|ancestor| ancestor.type_name().is_some()),
            Some(Ancestor::Struct(_))
        );
        if in_struct && !declaration.function.is_implicit {
            t.diagnostics.warn(
                "explicit struct initializers are not supported; only the synthesized \
                 memberwise initializer translates (the declaration was removed)",
                declaration.function.origin.range,
            );
            return Vec::new();
        }
        vec![Statement::Initializer(
            walk_initializer_declaration(self, t, declaration),
        )]
    }
}

// ── Native collections ───────────────────────────────────────────────────────

/// Array/dictionary literals typed with the source's native collection types
/// warn, recommending the translated list/map types.
#[derive(Default)]
pub struct NativeCollectionWarning;

fn is_native_collection(type_name: Option<&ecow::EcoString>) -> bool {
    type_name.is_some_and(|t| {
        let t = t.trim();
        (t.starts_with('[') && t.ends_with(']'))
            || t.starts_with("Array<")
            || t.starts_with("Dictionary<")
    })
}

impl RewritePass for NativeCollectionWarning {
    fn name(&self) -> &'static str {
        "native-collection-warning"
    }

    fn replace_array(
        &mut self,
        t: &mut Traversal<'_>,
        elements: Vec<Expression>,
        type_name: Option<ecow::EcoString>,
        origin: Provenance,
    ) -> Expression {
        if is_native_collection(type_name.as_ref()) {
            t.diagnostics.warn(
                eco_format!(
                    "native array type `{}` translates to an immutable List; use the List or \
                     MutableList wrappers for matching semantics",
                    type_name.as_deref().unwrap_or_default()
                ),
                origin.range,
            );
        }
        t.with_ancestor(Ancestor::Array, |t| Expression::Array {
            elements: elements
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            type_name,
            origin,
        })
    }

    fn replace_dictionary(
        &mut self,
        t: &mut Traversal<'_>,
        keys: Vec<Expression>,
        values: Vec<Expression>,
        type_name: Option<ecow::EcoString>,
        origin: Provenance,
    ) -> Expression {
        if is_native_collection(type_name.as_ref()) {
            t.diagnostics.warn(
                eco_format!(
                    "native dictionary type `{}` translates to an immutable Map; use the Map or \
                     MutableMap wrappers for matching semantics",
                    type_name.as_deref().unwrap_or_default()
                ),
                origin.range,
            );
        }
        t.with_ancestor(Ancestor::Dictionary, |t| Expression::Dictionary {
            keys: keys
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            values: values
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            type_name,
            origin,
        })
    }
}

// ── Defer ────────────────────────────────────────────────────────────────────

/// `defer` has no Kotlin equivalent; its body is emitted in place as a `run`
/// block, which changes execution order. Warn.
#[derive(Default)]
pub struct DeferWarning;

impl RewritePass for DeferWarning {
    fn name(&self) -> &'static str {
        "defer-warning"
    }

    fn replace_defer_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statements: Vec<Statement>,
        origin: Provenance,
    ) -> Vec<Statement> {
        t.diagnostics.warn(
            "defer has no Kotlin equivalent; its body is emitted in place as a run block and \
             will not execute at scope exit",
            origin.range,
        );
        let statements =
            t.with_ancestor(Ancestor::Defer, |t| self.replace_statements(t, statements));
        vec![Statement::Defer { statements, origin }]
    }
}

// ── Unexpected structure ─────────────────────────────────────────────────────

/// Variants earlier passes were specified to have eliminated must not reach
/// the emitter. Each one becomes an `Error` sentinel with a diagnostic; the
/// pipeline continues.
#[derive(Default)]
pub struct UnexpectedStructure;

impl RewritePass for UnexpectedStructure {
    fn name(&self) -> &'static str {
        "unexpected-structure"
    }

    fn replace_extension(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::ExtensionDeclaration,
    ) -> Vec<Statement> {
        vec![t.unexpected_statement(
            eco_format!(
                "extension of `{}` survived extension removal",
                declaration.type_name
            ),
            declaration.origin,
        )]
    }
}
