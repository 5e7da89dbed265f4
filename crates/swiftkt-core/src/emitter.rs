// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Kotlin emission.
//!
//! Serializes the rewritten AST into Kotlin source as a [`Translation`] tree,
//! so every emitted fragment keeps the source range it came from and the
//! resolved output carries a line-map.
//!
//! Layout contracts:
//!
//! - Indentation is the configured string, one copy per nesting level.
//! - A call or function signature whose flat layout would overflow
//!   [`MAX_LINE_LENGTH`] columns is re-emitted with one parameter per line —
//!   a single try-flat pass followed by a single break-out pass.
//! - Blank lines separate adjacent statements except between pairs the rules
//!   exempt (comments, variable declarations, assignments, typealiases, call
//!   statements, literal-code statements, `do`/`catch` and `catch`/`catch`).
//! - A function whose body is exactly one expression statement is emitted in
//!   `fun f(…) = expr` shorthand when its return type is not `Unit`.
//!
//! Statements the passes were specified to have eliminated (extensions,
//! remaining if-let declarations) render as the `<<Error>>` sentinel; the
//! pass that failed to eliminate them is responsible for the diagnostic.

use crate::ast::{
    AssignmentStatement, CallExpression, CatchStatement, ClassDeclaration, ClosureExpression,
    CompanionObject, DoStatement, EnumDeclaration, EnumElement, Expression, ForEachStatement,
    FunctionDeclaration, FunctionParameter, IfCondition, IfStatement, InitializerDeclaration,
    LabeledExpression, ProtocolDeclaration, Radix, ReturnStatement, Statement, StructDeclaration,
    SwitchCase, SwitchStatement, VariableDeclaration, WhileStatement,
};
use crate::context::TranspilationContext;
use crate::driver::TranspilationUnit;
use crate::translation::Translation;
use crate::type_strings::map_type;
use ecow::{EcoString, eco_format};

/// Column limit beyond which calls and signatures break onto multiple lines.
pub const MAX_LINE_LENGTH: usize = 100;

/// The sentinel token rendered for `Error` nodes.
pub const ERROR_SENTINEL: &str = "<<Error>>";

/// The Kotlin emitter. Stateless apart from the frozen context; emission
/// never mutates anything, so one emitter serves any number of files.
pub struct KotlinEmitter<'a> {
    context: &'a TranspilationContext,
}

impl<'a> KotlinEmitter<'a> {
    /// Creates an emitter over the frozen context.
    #[must_use]
    pub fn new(context: &'a TranspilationContext) -> Self {
        Self { context }
    }

    fn single_indent(&self) -> &str {
        &self.context.configuration.indentation
    }

    fn increase(&self, indentation: &str) -> String {
        let mut deeper = String::with_capacity(indentation.len() + self.single_indent().len());
        deeper.push_str(indentation);
        deeper.push_str(self.single_indent());
        deeper
    }

    /// Emits a whole translation unit: declarations, then top-level
    /// statements, under the shared blank-line rules.
    #[must_use]
    pub fn emit_unit(&self, unit: &TranspilationUnit) -> Translation {
        let mut all: Vec<&Statement> = unit.declarations.iter().collect();
        all.extend(unit.statements.iter());
        self.emit_statement_list(&all, "")
    }

    /// Emits a statement slice at an indentation level.
    #[must_use]
    pub fn emit_statements(&self, statements: &[Statement], indentation: &str) -> Translation {
        let refs: Vec<&Statement> = statements.iter().collect();
        self.emit_statement_list(&refs, indentation)
    }

    fn emit_statement_list(&self, statements: &[&Statement], indentation: &str) -> Translation {
        let mut translation = Translation::new();
        let mut previous: Option<&Statement> = None;
        for &statement in statements {
            // Imports have no Kotlin counterpart.
            if matches!(statement, Statement::Import { .. }) {
                continue;
            }
            if let Some(previous) = previous {
                if should_insert_blank_line(previous, statement) {
                    translation.append("\n");
                }
            }
            translation.append_translation(self.emit_statement(statement, indentation));
            previous = Some(statement);
        }
        translation
    }

    /// Emits one statement, including its trailing newline.
    #[must_use]
    pub fn emit_statement(&self, statement: &Statement, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(statement.range());
        match statement {
            Statement::Comment { content, .. } => {
                translation.append(indentation);
                if content.starts_with(' ') || content.is_empty() {
                    translation.append(eco_format!("//{content}\n"));
                } else {
                    translation.append(eco_format!("// {content}\n"));
                }
            }
            Statement::Expression { expression, .. } => {
                translation.append(indentation);
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append("\n");
            }
            Statement::TypeAlias {
                identifier,
                type_name,
                access,
                ..
            } => {
                translation.append(indentation);
                if let Some(access) = access.as_ref().filter(|a| !a.is_empty()) {
                    translation.append(eco_format!("{access} "));
                }
                translation.append(eco_format!(
                    "typealias {identifier} = {}\n",
                    map_type(type_name)
                ));
            }
            Statement::Extension(_) | Statement::Error { .. } => {
                translation.append(indentation);
                translation.append(ERROR_SENTINEL);
                translation.append("\n");
            }
            Statement::Import { .. } => {}
            Statement::Class(declaration) => {
                translation.append_translation(self.emit_class(declaration, indentation));
            }
            Statement::CompanionObject(declaration) => {
                translation.append_translation(self.emit_companion(declaration, indentation));
            }
            Statement::Enum(declaration) => {
                translation.append_translation(self.emit_enum(declaration, indentation));
            }
            Statement::Protocol(declaration) => {
                translation.append_translation(self.emit_protocol(declaration, indentation));
            }
            Statement::Struct(declaration) => {
                translation.append_translation(self.emit_struct(declaration, indentation));
            }
            Statement::Function(declaration) => {
                translation.append_translation(self.emit_function(declaration, indentation));
            }
            Statement::Initializer(declaration) => {
                translation.append_translation(self.emit_initializer(declaration, indentation));
            }
            Statement::Variable(declaration) => {
                translation.append_translation(self.emit_variable(declaration, indentation));
            }
            Statement::Do(DoStatement { statements, .. }) => {
                translation.append(eco_format!("{indentation}try {{\n"));
                translation
                    .append_translation(self.emit_statements(statements, &self.increase(indentation)));
                translation.append(eco_format!("{indentation}}}\n"));
            }
            Statement::Catch(CatchStatement {
                variable,
                statements,
                ..
            }) => {
                translation.append(eco_format!("{indentation}catch ("));
                if let Some(variable) = variable {
                    translation.append(eco_format!(
                        "{}: {}",
                        variable.identifier,
                        map_type(&variable.type_name)
                    ));
                }
                translation.append(") {\n");
                translation
                    .append_translation(self.emit_statements(statements, &self.increase(indentation)));
                translation.append(eco_format!("{indentation}}}\n"));
            }
            Statement::ForEach(ForEachStatement {
                variable,
                collection,
                statements,
                ..
            }) => {
                translation.append(eco_format!("{indentation}for ("));
                translation.append_translation(self.emit_expression(variable, indentation));
                translation.append(" in ");
                translation.append_translation(self.emit_expression(collection, indentation));
                translation.append(") {\n");
                translation
                    .append_translation(self.emit_statements(statements, &self.increase(indentation)));
                translation.append(eco_format!("{indentation}}}\n"));
            }
            Statement::While(WhileStatement {
                condition,
                statements,
                ..
            }) => {
                translation.append(eco_format!("{indentation}while ("));
                translation.append_translation(self.emit_expression(condition, indentation));
                translation.append(") {\n");
                translation
                    .append_translation(self.emit_statements(statements, &self.increase(indentation)));
                translation.append(eco_format!("{indentation}}}\n"));
            }
            Statement::If(statement) => {
                translation.append_translation(self.emit_if(statement, indentation, false));
            }
            Statement::Switch(statement) => {
                translation.append_translation(self.emit_when(statement, indentation));
            }
            Statement::Defer { statements, .. } => {
                translation.append(eco_format!("{indentation}run {{\n"));
                translation
                    .append_translation(self.emit_statements(statements, &self.increase(indentation)));
                translation.append(eco_format!("{indentation}}}\n"));
            }
            Statement::Throw { expression, .. } => {
                translation.append(eco_format!("{indentation}throw "));
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append("\n");
            }
            Statement::Return(ReturnStatement {
                expression, label, ..
            }) => {
                translation.append(indentation);
                translation.append("return");
                if let Some(label) = label {
                    translation.append(eco_format!("@{label}"));
                }
                if let Some(expression) = expression {
                    translation.append(" ");
                    translation.append_translation(self.emit_expression(expression, indentation));
                }
                translation.append("\n");
            }
            Statement::Break { .. } => {
                translation.append(eco_format!("{indentation}break\n"));
            }
            Statement::Continue { .. } => {
                translation.append(eco_format!("{indentation}continue\n"));
            }
            Statement::Assignment(AssignmentStatement { left, right, .. }) => {
                translation.append(indentation);
                translation.append_translation(self.emit_expression(left, indentation));
                translation.append(" = ");
                translation.append_translation(self.emit_expression(right, indentation));
                translation.append("\n");
            }
        }
        translation
    }

    // ── Declarations ─────────────────────────────────────────────────────────

    fn emit_class(&self, declaration: &ClassDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        if declaration.is_open {
            translation.append("open ");
        }
        translation.append(eco_format!("class {}", declaration.name));
        translation.append(self.inheritance_clause(&declaration.inherits));
        if declaration.members.is_empty() {
            translation.append("\n");
        } else {
            translation.append(" {\n");
            translation.append_translation(
                self.emit_statements(&declaration.members, &self.increase(indentation)),
            );
            translation.append(eco_format!("{indentation}}}\n"));
        }
        translation
    }

    fn inheritance_clause(&self, inherits: &[EcoString]) -> EcoString {
        if inherits.is_empty() {
            return EcoString::new();
        }
        let rendered: Vec<EcoString> = inherits
            .iter()
            .map(|name| {
                if self.context.is_protocol(name) {
                    map_type(name)
                } else {
                    eco_format!("{}()", map_type(name))
                }
            })
            .collect();
        eco_format!(": {}", rendered.join(", "))
    }

    fn emit_companion(&self, declaration: &CompanionObject, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(eco_format!("{indentation}companion object {{\n"));
        translation.append_translation(
            self.emit_statements(&declaration.members, &self.increase(indentation)),
        );
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    fn emit_protocol(&self, declaration: &ProtocolDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        translation.append(eco_format!("interface {}", declaration.name));
        if declaration.members.is_empty() {
            translation.append("\n");
        } else {
            translation.append(" {\n");
            translation.append_translation(
                self.emit_statements(&declaration.members, &self.increase(indentation)),
            );
            translation.append(eco_format!("{indentation}}}\n"));
        }
        translation
    }

    fn emit_struct(&self, declaration: &StructDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        let (stored, other): (Vec<&Statement>, Vec<&Statement>) =
            declaration.members.iter().partition(|member| {
                matches!(
                    member,
                    Statement::Variable(v) if v.getter.is_none() && v.setter.is_none() && !v.is_static
                )
            });

        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        if stored.is_empty() {
            translation.append(eco_format!("class {}", declaration.name));
        } else {
            translation.append(eco_format!("data class {}(", declaration.name));
            let parameters: Vec<EcoString> = stored
                .iter()
                .filter_map(|member| match member {
                    Statement::Variable(v) => Some(self.constructor_property(v, indentation)),
                    _ => None,
                })
                .collect();
            let flat = parameters.join(", ");
            if indentation.len() + flat.len() < MAX_LINE_LENGTH {
                translation.append(flat);
                translation.append(")");
            } else {
                let deeper = self.increase(indentation);
                translation.append("\n");
                for (index, parameter) in parameters.iter().enumerate() {
                    translation.append(eco_format!("{deeper}{parameter}"));
                    if index + 1 < parameters.len() {
                        translation.append(",");
                    }
                    translation.append("\n");
                }
                translation.append(indentation);
                translation.append(")");
            }
        }
        translation.append(self.inheritance_clause(&declaration.inherits));
        if other.is_empty() {
            translation.append("\n");
        } else {
            translation.append(" {\n");
            translation
                .append_translation(self.emit_statement_list(&other, &self.increase(indentation)));
            translation.append(eco_format!("{indentation}}}\n"));
        }
        translation
    }

    fn constructor_property(&self, variable: &VariableDeclaration, indentation: &str) -> EcoString {
        let keyword = if variable.is_let { "val" } else { "var" };
        let mut rendered = eco_format!(
            "{keyword} {}: {}",
            variable.identifier,
            map_type(&variable.type_name)
        );
        if let Some(default) = &variable.expression {
            let (text, _) = self.emit_expression(default, indentation).resolve();
            rendered = eco_format!("{rendered} = {text}");
        }
        rendered
    }

    fn emit_enum(&self, declaration: &EnumDeclaration, indentation: &str) -> Translation {
        // The registry is keyed by fully qualified name; the associated-value
        // check covers nested enums the simple-name lookup misses.
        let sealed = self.context.is_sealed_class(&declaration.name)
            || declaration
                .elements
                .iter()
                .any(|element| !element.associated_values.is_empty());
        if sealed {
            self.emit_sealed_class(declaration, indentation)
        } else {
            self.emit_enum_class(declaration, indentation)
        }
    }

    fn emit_sealed_class(&self, declaration: &EnumDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        translation.append(eco_format!("sealed class {}", declaration.name));
        translation.append(self.inheritance_clause(&declaration.inherits));
        translation.append(" {\n");
        let deeper = self.increase(indentation);
        for element in &declaration.elements {
            translation.append(eco_format!("{deeper}class {}", element.name));
            if !element.associated_values.is_empty() {
                let values: Vec<EcoString> = element
                    .associated_values
                    .iter()
                    .map(|value| {
                        let label = value.label.as_deref().unwrap_or("value");
                        eco_format!("val {label}: {}", map_type(&value.type_name))
                    })
                    .collect();
                translation.append(eco_format!("({})", values.join(", ")));
            }
            translation.append(eco_format!(": {}()\n", declaration.name));
        }
        if !declaration.members.is_empty() {
            translation.append("\n");
            translation.append_translation(self.emit_statements(&declaration.members, &deeper));
        }
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    fn emit_enum_class(&self, declaration: &EnumDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        translation.append(eco_format!("enum class {}", declaration.name));
        if let Some(raw_type) = &declaration.raw_value_type {
            translation.append(eco_format!("(val rawValue: {})", map_type(raw_type)));
        }
        translation.append(self.inheritance_clause(&declaration.inherits));
        translation.append(" {\n");
        let deeper = self.increase(indentation);
        for (index, element) in declaration.elements.iter().enumerate() {
            translation.append_translation(self.emit_enum_element(element, &deeper, indentation));
            let is_last = index + 1 == declaration.elements.len();
            if is_last {
                if !declaration.members.is_empty() {
                    translation.append(";");
                }
            } else {
                translation.append(",");
            }
            translation.append("\n");
        }
        if !declaration.members.is_empty() {
            translation.append("\n");
            translation.append_translation(self.emit_statements(&declaration.members, &deeper));
        }
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    fn emit_enum_element(
        &self,
        element: &EnumElement,
        deeper: &str,
        indentation: &str,
    ) -> Translation {
        let mut translation = Translation::new();
        translation.append(eco_format!("{deeper}{}", element.name));
        if let Some(raw_value) = &element.raw_value {
            translation.append("(");
            translation.append_translation(self.emit_expression(raw_value, indentation));
            translation.append(")");
        }
        translation
    }

    fn function_modifiers(&self, declaration: &FunctionDeclaration) -> EcoString {
        let mut modifiers = EcoString::new();
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            modifiers.push_str(access);
            modifiers.push(' ');
        }
        if declaration.is_open {
            modifiers.push_str("open ");
        }
        if declaration.annotations.iter().any(|a| a == "override") {
            modifiers.push_str("override ");
        }
        if declaration.annotations.iter().any(|a| a == "operator") {
            modifiers.push_str("operator ");
        }
        modifiers
    }

    fn render_parameter(&self, parameter: &FunctionParameter, indentation: &str) -> EcoString {
        let mut rendered = EcoString::new();
        if parameter.is_variadic {
            rendered.push_str("vararg ");
        }
        rendered.push_str(&eco_format!(
            "{}: {}",
            parameter.label,
            map_type(&parameter.type_name)
        ));
        if let Some(default) = &parameter.value {
            let (text, _) = self.emit_expression(default, indentation).resolve();
            rendered.push_str(&eco_format!(" = {text}"));
        }
        rendered
    }

    /// Emits a function signature: everything up to (not including) the body.
    ///
    /// Applies the try-flat/break-out layout to the parameter list.
    fn function_signature(&self, declaration: &FunctionDeclaration, indentation: &str) -> EcoString {
        let mut signature = eco_format!("{indentation}{}", self.function_modifiers(declaration));
        signature.push_str("fun ");
        if !declaration.generic_types.is_empty() {
            signature.push_str(&eco_format!("<{}> ", declaration.generic_types.join(", ")));
        }
        if let Some(extends) = &declaration.extends_type {
            signature.push_str(&eco_format!("{}.", map_type(extends)));
        }
        signature.push_str(&declaration.prefix);

        let parameters: Vec<EcoString> = declaration
            .parameters
            .iter()
            .map(|parameter| self.render_parameter(parameter, indentation))
            .collect();
        let return_clause = {
            let mapped = map_type(&declaration.return_type);
            if mapped == "Unit" || mapped.is_empty() {
                EcoString::new()
            } else {
                eco_format!(": {mapped}")
            }
        };

        let flat = eco_format!("{signature}({}){return_clause}", parameters.join(", "));
        if flat.len() < MAX_LINE_LENGTH || parameters.is_empty() {
            return flat;
        }

        // Break out: one parameter per line.
        let deeper = self.increase(indentation);
        let mut broken = signature;
        broken.push_str("(\n");
        for (index, parameter) in parameters.iter().enumerate() {
            broken.push_str(&eco_format!("{deeper}{parameter}"));
            if index + 1 < parameters.len() {
                broken.push(',');
            }
            broken.push('\n');
        }
        broken.push_str(&eco_format!("{indentation}){return_clause}"));
        broken
    }

    fn emit_function(&self, declaration: &FunctionDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(self.function_signature(declaration, indentation));

        let Some(statements) = declaration
            .statements
            .as_ref()
            .filter(|_| !declaration.is_just_protocol_interface)
        else {
            translation.append("\n");
            return translation;
        };

        // Single-expression shorthand.
        if let [Statement::Expression { expression, .. }] = statements.as_slice() {
            let return_type = map_type(&declaration.return_type);
            let qualifies = !matches!(
                expression,
                Expression::LiteralCode { .. } | Expression::Concatenation { .. }
            ) && return_type != "Unit";
            if qualifies {
                translation.append(" = ");
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append("\n");
                return translation;
            }
        }

        translation.append(" {\n");
        translation.append_translation(self.emit_statements(statements, &self.increase(indentation)));
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    fn emit_initializer(
        &self,
        declaration: &InitializerDeclaration,
        indentation: &str,
    ) -> Translation {
        let mut translation = Translation::with_range(declaration.function.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration
            .function
            .access
            .as_ref()
            .filter(|a| !a.is_empty())
        {
            translation.append(eco_format!("{access} "));
        }
        let parameters: Vec<EcoString> = declaration
            .function
            .parameters
            .iter()
            .map(|parameter| self.render_parameter(parameter, indentation))
            .collect();
        translation.append(eco_format!("constructor({})", parameters.join(", ")));

        if let Some(super_call) = &declaration.super_call {
            translation.append(": ");
            translation.append_translation(self.emit_super_header(super_call, indentation));
        }

        match &declaration.function.statements {
            Some(statements) if !statements.is_empty() => {
                translation.append(" {\n");
                translation.append_translation(
                    self.emit_statements(statements, &self.increase(indentation)),
                );
                translation.append(eco_format!("{indentation}}}\n"));
            }
            _ => translation.append("\n"),
        }
        translation
    }

    fn emit_super_header(&self, super_call: &Expression, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(super_call.range());
        if let Expression::Call(call) = super_call {
            translation.append("super(");
            translation
                .append_translation(self.emit_arguments(&call.arguments.pairs, indentation));
            translation.append(")");
        } else {
            translation.append_translation(self.emit_expression(super_call, indentation));
        }
        translation
    }

    fn emit_variable(&self, declaration: &VariableDeclaration, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(declaration.origin.range);
        translation.append(indentation);
        if let Some(access) = declaration.access.as_ref().filter(|a| !a.is_empty()) {
            translation.append(eco_format!("{access} "));
        }
        if declaration.is_open {
            translation.append("open ");
        }
        if declaration.annotations.iter().any(|a| a == "override") {
            translation.append("override ");
        }
        translation.append(if declaration.is_let { "val " } else { "var " });
        if let Some(extends) = &declaration.extends_type {
            translation.append(eco_format!("{}.", map_type(extends)));
        }
        translation.append(declaration.identifier.clone());
        if !declaration.type_name.is_empty() {
            translation.append(eco_format!(": {}", map_type(&declaration.type_name)));
        }
        if let Some(expression) = &declaration.expression {
            translation.append(" = ");
            translation.append_translation(self.emit_expression(expression, indentation));
        }
        translation.append("\n");

        let deeper = self.increase(indentation);
        if let Some(getter) = &declaration.getter {
            translation.append_translation(self.emit_accessor(getter, "get()", &deeper));
        }
        if let Some(setter) = &declaration.setter {
            translation.append_translation(self.emit_accessor(setter, "set(newValue)", &deeper));
        }
        translation
    }

    /// Bodyless accessors (interface requirements) emit nothing; the
    /// property line alone is the requirement.
    fn emit_accessor(
        &self,
        accessor: &FunctionDeclaration,
        header: &str,
        indentation: &str,
    ) -> Translation {
        let mut translation = Translation::with_range(accessor.origin.range);
        let Some(statements) = accessor
            .statements
            .as_ref()
            .filter(|statements| !statements.is_empty() && !accessor.is_just_protocol_interface)
        else {
            return translation;
        };
        translation.append(eco_format!("{indentation}{header} {{\n"));
        translation
            .append_translation(self.emit_statements(statements, &self.increase(indentation)));
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    // ── Control flow ─────────────────────────────────────────────────────────

    fn emit_if(&self, statement: &IfStatement, indentation: &str, is_else_if: bool) -> Translation {
        let mut translation = Translation::with_range(statement.origin.range);
        if !is_else_if {
            translation.append(indentation);
        }
        if statement.conditions.is_empty() {
            // A plain else branch.
            translation.append("{\n");
        } else {
            translation.append("if (");
            let conditions: Vec<Translation> = statement
                .conditions
                .iter()
                .map(|condition| match condition {
                    IfCondition::Condition(expression) => {
                        self.emit_expression(expression, indentation)
                    }
                    IfCondition::Declaration(_) => ERROR_SENTINEL.into(),
                })
                .collect();
            if statement.is_guard {
                translation.append("!(");
                translation.append_translations(conditions, " && ");
                translation.append(")");
            } else {
                translation.append_translations(conditions, " && ");
            }
            translation.append(") {\n");
        }
        translation
            .append_translation(self.emit_statements(&statement.statements, &self.increase(indentation)));
        translation.append(eco_format!("{indentation}}}"));
        if let Some(else_statement) = &statement.else_statement {
            translation.append(" else ");
            translation.append_translation(self.emit_if(else_statement, indentation, true));
        } else {
            translation.append("\n");
        }
        translation
    }

    fn emit_when(&self, statement: &SwitchStatement, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(statement.origin.range);
        translation.append(indentation);
        match statement.converts_to_expression.as_deref() {
            Some(Statement::Return(_)) => translation.append("return when ("),
            Some(Statement::Assignment(assignment)) => {
                translation.append_translation(self.emit_expression(&assignment.left, indentation));
                translation.append(" = when (");
            }
            Some(Statement::Variable(variable)) => {
                translation.append(if variable.is_let { "val " } else { "var " });
                translation.append(variable.identifier.clone());
                if !variable.type_name.is_empty() {
                    translation.append(eco_format!(": {}", map_type(&variable.type_name)));
                }
                translation.append(" = when (");
            }
            _ => translation.append("when ("),
        }
        translation.append_translation(self.emit_expression(&statement.expression, indentation));
        translation.append(") {\n");

        let deeper = self.increase(indentation);
        for case in &statement.cases {
            translation.append_translation(self.emit_when_case(case, &deeper));
        }
        translation.append(eco_format!("{indentation}}}\n"));
        translation
    }

    fn emit_when_case(&self, case: &SwitchCase, indentation: &str) -> Translation {
        let mut translation = Translation::new();
        translation.append(indentation);
        if case.expressions.is_empty() {
            translation.append("else");
        } else {
            let rendered: Vec<Translation> = case
                .expressions
                .iter()
                .map(|expression| self.emit_case_expression(expression, indentation))
                .collect();
            translation.append_translations(rendered, ", ");
        }
        translation.append(" -> ");

        match case.statements.as_slice() {
            [] => translation.append("{}\n"),
            [single] if inlinable_case_statement(single) => {
                let body = self.emit_statement(single, "");
                translation.append_translation(body);
            }
            statements => {
                translation.append("{\n");
                let deeper = self.increase(indentation);
                for statement in statements {
                    translation.append_translation(self.emit_statement(statement, &deeper));
                }
                translation.append(eco_format!("{indentation}}}\n"));
            }
        }
        translation
    }

    /// Case expressions of the form `subject is Type` print as `is Type` —
    /// `when` supplies the subject.
    fn emit_case_expression(&self, expression: &Expression, indentation: &str) -> Translation {
        if let Expression::BinaryOperator {
            operator, right, ..
        } = expression
        {
            if operator == "is" {
                let mut translation = Translation::with_range(expression.range());
                translation.append("is ");
                translation.append_translation(self.emit_expression(right, indentation));
                return translation;
            }
        }
        self.emit_expression(expression, indentation)
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    /// Emits one expression at the given statement indentation (used when a
    /// call breaks across lines or a closure body nests).
    #[must_use]
    pub fn emit_expression(&self, expression: &Expression, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(expression.range());
        match expression {
            Expression::LiteralCode { string, .. } => translation.append(string.clone()),
            Expression::Concatenation { left, right, .. } => {
                translation.append_translation(self.emit_expression(left, indentation));
                translation.append_translation(self.emit_expression(right, indentation));
            }
            Expression::Parentheses { expression, .. } => {
                translation.append("(");
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append(")");
            }
            Expression::ForceUnwrap { expression, .. } => {
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append("!!");
            }
            Expression::OptionalChain { expression, .. } => {
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append("?");
            }
            Expression::DeclarationReference(reference) => {
                translation.append(reference.identifier.clone());
            }
            Expression::TypeReference { type_name, .. } => {
                translation.append(map_type(type_name));
            }
            Expression::Subscript {
                subscripted,
                indices,
                ..
            } => {
                translation.append_translation(self.emit_expression(subscripted, indentation));
                translation.append("[");
                let rendered: Vec<Translation> = indices
                    .iter()
                    .map(|index| self.emit_expression(&index.expression, indentation))
                    .collect();
                translation.append_translations(rendered, ", ");
                translation.append("]");
            }
            Expression::Array {
                elements,
                type_name,
                ..
            } => {
                let constructor = match type_name.as_deref() {
                    Some(t) if t.starts_with("MutableList") => "mutableListOf",
                    _ => "listOf",
                };
                translation.append(eco_format!("{constructor}("));
                let rendered: Vec<Translation> = elements
                    .iter()
                    .map(|element| self.emit_expression(element, indentation))
                    .collect();
                translation.append_translations(rendered, ", ");
                translation.append(")");
            }
            Expression::Dictionary {
                keys,
                values,
                type_name,
                ..
            } => {
                let constructor = match type_name.as_deref() {
                    Some(t) if t.starts_with("MutableMap") => "mutableMapOf",
                    _ => "mapOf",
                };
                translation.append(eco_format!("{constructor}("));
                let rendered: Vec<Translation> = keys
                    .iter()
                    .zip(values.iter())
                    .map(|(key, value)| {
                        let mut pair = Translation::new();
                        pair.append_translation(self.emit_expression(key, indentation));
                        pair.append(" to ");
                        pair.append_translation(self.emit_expression(value, indentation));
                        pair
                    })
                    .collect();
                translation.append_translations(rendered, ", ");
                translation.append(")");
            }
            Expression::ReturnExpression { expression, .. } => {
                translation.append("return");
                if let Some(expression) = expression {
                    translation.append(" ");
                    translation.append_translation(self.emit_expression(expression, indentation));
                }
            }
            Expression::Dot { left, right, .. } => {
                translation.append_translation(self.emit_expression(left, indentation));
                translation.append(".");
                translation.append_translation(self.emit_expression(right, indentation));
            }
            Expression::BinaryOperator {
                left,
                right,
                operator,
                ..
            } => {
                translation.append_translation(self.emit_expression(left, indentation));
                translation.append(eco_format!(" {operator} "));
                translation.append_translation(self.emit_expression(right, indentation));
            }
            Expression::PrefixUnary {
                operand, operator, ..
            } => {
                translation.append(operator.clone());
                translation.append_translation(self.emit_expression(operand, indentation));
            }
            Expression::PostfixUnary {
                operand, operator, ..
            } => {
                translation.append_translation(self.emit_expression(operand, indentation));
                translation.append(operator.clone());
            }
            Expression::IfTernary {
                condition,
                then_expression,
                else_expression,
                ..
            } => {
                translation.append("if (");
                translation.append_translation(self.emit_expression(condition, indentation));
                translation.append(") ");
                translation.append_translation(self.emit_expression(then_expression, indentation));
                translation.append(" else ");
                translation.append_translation(self.emit_expression(else_expression, indentation));
            }
            Expression::Call(call) => {
                translation.append_translation(self.emit_call(call, indentation));
            }
            Expression::Closure(closure) => {
                translation.append_translation(self.emit_closure(closure, indentation));
            }
            Expression::IntegerLiteral { value, radix, .. } => {
                translation.append(render_integer(*value, *radix));
            }
            Expression::UIntegerLiteral { value, radix, .. } => {
                let rendered = match radix {
                    Radix::Decimal => eco_format!("{value}u"),
                    Radix::Hexadecimal => eco_format!("0x{value:x}u"),
                    Radix::Binary => eco_format!("0b{value:b}u"),
                };
                translation.append(rendered);
            }
            Expression::DoubleLiteral { value, .. } => {
                translation.append(render_double(*value));
            }
            Expression::FloatLiteral { value, .. } => {
                if value.fract() == 0.0 {
                    translation.append(eco_format!("{value:.1}f"));
                } else {
                    translation.append(eco_format!("{value}f"));
                }
            }
            Expression::BoolLiteral { value, .. } => {
                translation.append(if *value { "true" } else { "false" });
            }
            Expression::StringLiteral {
                value, is_multiline, ..
            } => {
                if *is_multiline {
                    translation.append(eco_format!("\"\"\"{value}\"\"\""));
                } else {
                    translation.append(eco_format!("\"{value}\""));
                }
            }
            Expression::CharacterLiteral { value, .. } => {
                translation.append(eco_format!("'{value}'"));
            }
            Expression::NilLiteral { .. } => translation.append("null"),
            Expression::InterpolatedString { segments, .. } => {
                translation.append("\"");
                for segment in segments {
                    match segment {
                        Expression::StringLiteral { value, .. } => {
                            translation.append(value.clone());
                        }
                        other => {
                            translation.append("${");
                            translation
                                .append_translation(self.emit_expression(other, indentation));
                            translation.append("}");
                        }
                    }
                }
                translation.append("\"");
            }
            Expression::Tuple(tuple) => {
                translation.append("(");
                translation.append_translation(self.emit_arguments(&tuple.pairs, indentation));
                translation.append(")");
            }
            Expression::Error { .. } => translation.append(ERROR_SENTINEL),
        }
        translation
    }

    fn emit_arguments(
        &self,
        arguments: &[LabeledExpression],
        indentation: &str,
    ) -> Translation {
        let mut translation = Translation::new();
        let rendered: Vec<Translation> = arguments
            .iter()
            .map(|argument| {
                let mut piece = Translation::new();
                if let Some(label) = &argument.label {
                    piece.append(eco_format!("{label} = "));
                }
                piece.append_translation(self.emit_expression(&argument.expression, indentation));
                piece
            })
            .collect();
        translation.append_translations(rendered, ", ");
        translation
    }

    fn emit_call(&self, call: &CallExpression, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(call.origin.range);
        let function = self.emit_expression(&call.function, indentation);

        // Trailing closure syntax.
        let (plain_arguments, trailing) = match call.arguments.pairs.split_last() {
            Some((last, rest))
                if call.allows_trailing_closure
                    && last.label.is_none()
                    && matches!(&last.expression, Expression::Closure(c) if c.is_trailing) =>
            {
                (rest, Some(&last.expression))
            }
            _ => (call.arguments.pairs.as_slice(), None),
        };

        translation.append_translation(function);
        if trailing.is_none() || !plain_arguments.is_empty() {
            let arguments = self.emit_arguments(plain_arguments, indentation);
            // Try flat, then break out one argument per line.
            if indentation.len() + translation.length() + arguments.length() + 2 < MAX_LINE_LENGTH
                || plain_arguments.is_empty()
            {
                translation.append("(");
                translation.append_translation(arguments);
                translation.append(")");
            } else {
                let deeper = self.increase(indentation);
                translation.append("(\n");
                for (index, argument) in plain_arguments.iter().enumerate() {
                    translation.append(deeper.clone());
                    if let Some(label) = &argument.label {
                        translation.append(eco_format!("{label} = "));
                    }
                    translation
                        .append_translation(self.emit_expression(&argument.expression, &deeper));
                    if index + 1 < plain_arguments.len() {
                        translation.append(",");
                    }
                    translation.append("\n");
                }
                translation.append(eco_format!("{indentation})"));
            }
        }
        if let Some(closure) = trailing {
            translation.append(" ");
            translation.append_translation(self.emit_expression(closure, indentation));
        }
        translation
    }

    fn emit_closure(&self, closure: &ClosureExpression, indentation: &str) -> Translation {
        let mut translation = Translation::with_range(closure.origin.range);
        let parameters: Vec<EcoString> = closure
            .parameters
            .iter()
            .map(|parameter| parameter.label.clone().unwrap_or_else(|| "_".into()))
            .collect();
        let implicit_it = parameters.len() == 1 && parameters[0] == "it";
        let header = if parameters.is_empty() || implicit_it {
            EcoString::new()
        } else {
            eco_format!("{} -> ", parameters.join(", "))
        };

        match closure.statements.as_slice() {
            [] => translation.append(eco_format!("{{ {header}}}")),
            [Statement::Expression { expression, .. }] => {
                translation.append(eco_format!("{{ {header}"));
                translation.append_translation(self.emit_expression(expression, indentation));
                translation.append(" }");
            }
            statements => {
                translation.append(eco_format!("{{ {header}\n"));
                let deeper = self.increase(indentation);
                translation.append_translation(self.emit_statements(statements, &deeper));
                translation.append(eco_format!("{indentation}}}"));
            }
        }
        translation
    }
}

/// Statements that fit inline after `->` in a `when` case.
fn inlinable_case_statement(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Expression { .. }
            | Statement::Return(_)
            | Statement::Assignment(_)
            | Statement::Throw { .. }
    )
}

fn render_integer(value: i64, radix: Radix) -> EcoString {
    match radix {
        Radix::Decimal => eco_format!("{value}"),
        Radix::Hexadecimal => eco_format!("0x{value:x}"),
        Radix::Binary => eco_format!("0b{value:b}"),
    }
}

fn render_double(value: f64) -> EcoString {
    if value.fract() == 0.0 && value.is_finite() {
        eco_format!("{value:.1}")
    } else {
        eco_format!("{value}")
    }
}

/// Whether a blank line belongs between two adjacent statements.
fn should_insert_blank_line(previous: &Statement, next: &Statement) -> bool {
    // do + catch and catch + catch stay attached.
    if matches!(previous, Statement::Do(_)) && matches!(next, Statement::Catch(_)) {
        return false;
    }
    if matches!(previous, Statement::Catch(_)) && matches!(next, Statement::Catch(_)) {
        return false;
    }
    !(is_tightly_spaced(previous) && is_tightly_spaced(next))
}

/// Statement kinds that pack together without a separating blank line.
fn is_tightly_spaced(statement: &Statement) -> bool {
    match statement {
        Statement::Comment { .. }
        | Statement::Variable(_)
        | Statement::Assignment(_)
        | Statement::TypeAlias { .. }
        | Statement::Return(_)
        | Statement::Break { .. }
        | Statement::Continue { .. }
        | Statement::Throw { .. }
        | Statement::Import { .. } => true,
        Statement::Expression { expression, .. } => matches!(
            expression,
            Expression::Call(_) | Expression::LiteralCode { .. }
        ),
        _ => false,
    }
}
