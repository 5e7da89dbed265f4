// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration-shape rewrites: operators to methods, synthesized members,
//! companion objects, protocol bodies, and extension inlining.

use crate::ast::{
    CompanionObject, EnumDeclaration, Expression, ExtensionDeclaration, FunctionDeclaration,
    FunctionParameter, IfCondition, IfStatement, InitializerDeclaration, Provenance,
    ReturnStatement, Statement, VariableDeclaration,
};
use crate::pass::{
    Ancestor, RewritePass, Traversal, walk_class_declaration, walk_enum_declaration,
    walk_initializer_declaration, walk_protocol_declaration, walk_struct_declaration,
};
use ecow::{EcoString, eco_format};

fn plain_function(
    prefix: impl Into<EcoString>,
    return_type: impl Into<EcoString>,
    parameters: Vec<FunctionParameter>,
    statements: Vec<Statement>,
) -> FunctionDeclaration {
    let return_type = return_type.into();
    let parameter_types: Vec<EcoString> =
        parameters.iter().map(|p| p.type_name.clone()).collect();
    FunctionDeclaration {
        prefix: prefix.into(),
        function_type: eco_format!("({}) -> {return_type}", parameter_types.join(", ")),
        parameters,
        return_type,
        generic_types: Vec::new(),
        is_open: false,
        is_implicit: false,
        is_static: false,
        is_mutating: false,
        is_pure: false,
        is_just_protocol_interface: false,
        extends_type: None,
        statements: Some(statements),
        access: None,
        annotations: Vec::new(),
        origin: Provenance::default(),
    }
}

// ── Equatable operators ──────────────────────────────────────────────────────

/// Rewrites a declared `==(a, b)` operator into `equals(other: Any?)` with a
/// leading `is` check that guards the body and returns `false` on a type
/// mismatch.
#[derive(Default)]
pub struct EquatableOperators;

impl RewritePass for EquatableOperators {
    fn name(&self) -> &'static str {
        "equatable-operators"
    }

    fn replace_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: FunctionDeclaration,
    ) -> Vec<Statement> {
        let enclosing = t
            .ancestors()
            .iter()
            .rev()
            .find_map(|ancestor| ancestor.type_name().cloned());
        let is_equality_operator = declaration.prefix == "=="
            && declaration.is_static
            && declaration.parameters.len() == 2;
        let (Some(type_name), true) = (enclosing, is_equality_operator) else {
            return vec![Statement::Function(
                self.process_function_declaration(t, declaration),
            )];
        };

        let lhs = declaration.parameters[0].label.clone();
        let rhs = declaration.parameters[1].label.clone();
        let original_body = declaration.statements.unwrap_or_default();

        let mut guarded = vec![
            Statement::Variable(VariableDeclaration::binding(
                lhs,
                type_name.clone(),
                Expression::reference("this"),
            )),
            Statement::Variable(VariableDeclaration::binding(
                rhs,
                type_name.clone(),
                Expression::reference("other"),
            )),
        ];
        guarded.extend(original_body);

        let body = vec![
            Statement::If(IfStatement {
                conditions: vec![IfCondition::Condition(Expression::BinaryOperator {
                    left: Box::new(Expression::reference("other")),
                    right: Box::new(Expression::TypeReference {
                        type_name,
                        origin: Provenance::default(),
                    }),
                    operator: "is".into(),
                    type_name: Some("Bool".into()),
                    origin: Provenance::default(),
                })],
                statements: guarded,
                else_statement: None,
                is_guard: false,
                origin: Provenance::default(),
            }),
            Statement::Return(ReturnStatement {
                expression: Some(Expression::BoolLiteral {
                    value: false,
                    origin: Provenance::default(),
                }),
                label: None,
                origin: Provenance::default(),
            }),
        ];

        let mut equals = plain_function(
            "equals",
            "Bool",
            vec![FunctionParameter::positional("other", "Any?")],
            body,
        );
        equals.annotations.push("override".into());
        equals.origin = declaration.origin;
        let equals = self.process_function_declaration(t, equals);
        vec![Statement::Function(equals)]
    }
}

// ── Raw-values members ───────────────────────────────────────────────────────

/// For enums with raw values, synthesizes the companion factory
/// `operator fun invoke(rawValue: T): Name?` implemented via
/// `values().firstOrNull { it.rawValue == rawValue }`. The `rawValue`
/// property itself is the enum-class constructor parameter the emitter
/// prints from [`EnumDeclaration::raw_value_type`].
#[derive(Default)]
pub struct RawValueMembers;

impl RewritePass for RawValueMembers {
    fn name(&self) -> &'static str {
        "raw-value-members"
    }

    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: EnumDeclaration,
    ) -> EnumDeclaration {
        let mut declaration = walk_enum_declaration(self, t, declaration);
        let has_raw_values = declaration
            .elements
            .iter()
            .any(|element| element.raw_value.is_some());
        let Some(raw_type) = declaration.raw_value_type.clone().filter(|_| has_raw_values)
        else {
            return declaration;
        };

        let mut factory = plain_function(
            "invoke",
            eco_format!("{}?", declaration.name),
            vec![FunctionParameter::named("rawValue", raw_type)],
            vec![Statement::Return(ReturnStatement {
                expression: Some(Expression::literal_code(
                    "values().firstOrNull { it.rawValue == rawValue }",
                )),
                label: None,
                origin: Provenance::default(),
            })],
        );
        factory.annotations.push("operator".into());

        declaration
            .members
            .push(Statement::CompanionObject(CompanionObject {
                members: vec![Statement::Function(factory)],
                origin: Provenance::default(),
            }));
        declaration
    }
}

// ── Description to toString ──────────────────────────────────────────────────

/// When a type inherited the textual-description protocol, rewrites its
/// `description: String` computed property into `override fun toString()`.
#[derive(Default)]
pub struct DescriptionToToString;

impl DescriptionToToString {
    fn rewrite_members(members: &mut Vec<Statement>) {
        for member in members {
            let Statement::Variable(variable) = member else {
                continue;
            };
            if variable.identifier != "description" || variable.type_name != "String" {
                continue;
            }
            let Some(getter) = variable.getter.take() else {
                continue;
            };
            let mut to_string = plain_function(
                "toString",
                "String",
                Vec::new(),
                getter.statements.unwrap_or_default(),
            );
            to_string.annotations.push("override".into());
            to_string.origin = variable.origin.clone();
            *member = Statement::Function(to_string);
        }
    }

    fn qualified(t: &Traversal<'_>, name: &EcoString) -> EcoString {
        match t.enclosing_type_name() {
            Some(enclosing) => eco_format!("{enclosing}.{name}"),
            None => name.clone(),
        }
    }
}

impl RewritePass for DescriptionToToString {
    fn name(&self) -> &'static str {
        "description-to-tostring"
    }

    fn process_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::ClassDeclaration,
    ) -> crate::ast::ClassDeclaration {
        let full = Self::qualified(t, &declaration.name);
        let mut declaration = walk_class_declaration(self, t, declaration);
        if t.context.inherits_from(&full, "CustomStringConvertible") {
            Self::rewrite_members(&mut declaration.members);
        }
        declaration
    }

    fn process_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::StructDeclaration,
    ) -> crate::ast::StructDeclaration {
        let full = Self::qualified(t, &declaration.name);
        let mut declaration = walk_struct_declaration(self, t, declaration);
        if t.context.inherits_from(&full, "CustomStringConvertible") {
            Self::rewrite_members(&mut declaration.members);
        }
        declaration
    }
}

// ── Optional initializers ────────────────────────────────────────────────────

/// Converts failable initializers into a static `invoke` operator returning
/// an optional; assignments to `self` inside become returns.
#[derive(Default)]
pub struct OptionalInits;

fn rewrite_self_assignments(statements: &mut Vec<Statement>) {
    for statement in statements {
        match statement {
            Statement::Assignment(assignment) => {
                let assigns_self = matches!(
                    &assignment.left,
                    Expression::DeclarationReference(reference) if reference.identifier == "self"
                );
                if assigns_self {
                    *statement = Statement::Return(ReturnStatement {
                        expression: Some(assignment.right.clone()),
                        label: None,
                        origin: assignment.origin.clone(),
                    });
                }
            }
            Statement::If(if_statement) => rewrite_self_assignments_in_if(if_statement),
            Statement::While(s) => rewrite_self_assignments(&mut s.statements),
            Statement::ForEach(s) => rewrite_self_assignments(&mut s.statements),
            Statement::Do(s) => rewrite_self_assignments(&mut s.statements),
            Statement::Catch(s) => rewrite_self_assignments(&mut s.statements),
            Statement::Switch(s) => {
                for case in &mut s.cases {
                    rewrite_self_assignments(&mut case.statements);
                }
            }
            _ => {}
        }
    }
}

fn rewrite_self_assignments_in_if(statement: &mut IfStatement) {
    rewrite_self_assignments(&mut statement.statements);
    if let Some(else_statement) = &mut statement.else_statement {
        rewrite_self_assignments_in_if(else_statement);
    }
}

impl RewritePass for OptionalInits {
    fn name(&self) -> &'static str {
        "optional-inits"
    }

    fn replace_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: InitializerDeclaration,
    ) -> Vec<Statement> {
        let declaration = walk_initializer_declaration(self, t, declaration);
        if !declaration.is_optional {
            return vec![Statement::Initializer(declaration)];
        }

        let mut invoke = declaration.function;
        invoke.prefix = "invoke".into();
        invoke.is_static = true;
        invoke.return_type = eco_format!("{}?", invoke.return_type);
        invoke.annotations.push("operator".into());
        if let Some(statements) = &mut invoke.statements {
            rewrite_self_assignments(statements);
        }
        vec![Statement::Function(invoke)]
    }
}

// ── Static members ───────────────────────────────────────────────────────────

/// Gathers all static members of a class/struct/enum into one companion
/// object appended after the instance members.
#[derive(Default)]
pub struct StaticMembers;

fn gather_statics(members: &mut Vec<Statement>) {
    let mut statics = Vec::new();
    members.retain_mut(|member| {
        let is_static = match member {
            Statement::Function(function) => function.is_static,
            Statement::Variable(variable) => variable.is_static,
            _ => false,
        };
        if is_static {
            if let Statement::Function(function) = member {
                function.is_static = false;
            }
            if let Statement::Variable(variable) = member {
                variable.is_static = false;
            }
            statics.push(member.clone());
            false
        } else {
            true
        }
    });
    if !statics.is_empty() {
        members.push(Statement::CompanionObject(CompanionObject {
            members: statics,
            origin: Provenance::default(),
        }));
    }
}

impl RewritePass for StaticMembers {
    fn name(&self) -> &'static str {
        "static-members"
    }

    fn process_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::ClassDeclaration,
    ) -> crate::ast::ClassDeclaration {
        let mut declaration = walk_class_declaration(self, t, declaration);
        gather_statics(&mut declaration.members);
        declaration
    }

    fn process_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::StructDeclaration,
    ) -> crate::ast::StructDeclaration {
        let mut declaration = walk_struct_declaration(self, t, declaration);
        gather_statics(&mut declaration.members);
        declaration
    }

    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: EnumDeclaration,
    ) -> EnumDeclaration {
        let mut declaration = walk_enum_declaration(self, t, declaration);
        gather_statics(&mut declaration.members);
        declaration
    }
}

// ── Protocol contents ────────────────────────────────────────────────────────

/// Clears the statement bodies of protocol members; they are interface
/// requirements from here on.
#[derive(Default)]
pub struct ProtocolContents;

impl RewritePass for ProtocolContents {
    fn name(&self) -> &'static str {
        "protocol-contents"
    }

    fn process_protocol_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::ProtocolDeclaration,
    ) -> crate::ast::ProtocolDeclaration {
        let mut declaration = walk_protocol_declaration(self, t, declaration);
        for member in &mut declaration.members {
            match member {
                Statement::Function(function) => {
                    function.statements = None;
                    function.is_just_protocol_interface = true;
                }
                Statement::Variable(variable) => {
                    if let Some(getter) = &mut variable.getter {
                        getter.statements = None;
                        getter.is_just_protocol_interface = true;
                    }
                    if let Some(setter) = &mut variable.setter {
                        setter.statements = None;
                        setter.is_just_protocol_interface = true;
                    }
                }
                _ => {}
            }
        }
        declaration
    }
}

// ── Remove extensions ────────────────────────────────────────────────────────

/// Inlines extension members by stamping each with the extended type, then
/// deletes the extension wrapper.
#[derive(Default)]
pub struct RemoveExtensions;

impl RewritePass for RemoveExtensions {
    fn name(&self) -> &'static str {
        "remove-extensions"
    }

    fn replace_extension(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ExtensionDeclaration,
    ) -> Vec<Statement> {
        let type_name = declaration.type_name.clone();
        let members = t.with_ancestor(Ancestor::Extension(type_name.clone()), |t| {
            self.replace_statements(t, declaration.members)
        });
        members
            .into_iter()
            .map(|mut member| {
                match &mut member {
                    Statement::Function(function) => {
                        function.extends_type = Some(type_name.clone());
                    }
                    Statement::Variable(variable) => {
                        variable.extends_type = Some(type_name.clone());
                    }
                    _ => {}
                }
                member
            })
            .collect()
    }
}
