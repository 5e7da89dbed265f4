// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Function-level rewrites: constructor headers, access and openness,
//! generics propagation, catch bindings, call/declaration matching, and
//! lambda returns.

use crate::ast::{
    CallExpression, CatchStatement, ClassDeclaration, ClosureExpression, DeclarationReference,
    EnumDeclaration, Expression, FunctionDeclaration, IfStatement, InitializerDeclaration,
    ProtocolDeclaration, Provenance, Statement, StructDeclaration, SwitchStatement,
    VariableDeclaration,
};
use crate::matcher::{last_variadic_index, match_arguments};
use crate::pass::{
    Ancestor, RewritePass, Traversal, walk_call, walk_catch_statement, walk_class_declaration,
    walk_closure, walk_enum_declaration, walk_function_declaration,
    walk_initializer_declaration, walk_protocol_declaration, walk_struct_declaration,
    walk_variable_declaration,
};
use crate::type_strings::split_generic_args;
use ecow::{EcoString, eco_format};

// ── Super calls to headers ───────────────────────────────────────────────────

/// Extracts the single allowed top-level `super.init(…)` call from an
/// initializer body into the constructor header; a second super-call warns
/// and stays in place.
#[derive(Default)]
pub struct SuperCallsToHeaders;

fn is_super_init_call(statement: &Statement) -> bool {
    let Statement::Expression {
        expression: Expression::Call(call),
        ..
    } = statement
    else {
        return false;
    };
    let Expression::Dot { left, right, .. } = call.function.as_ref() else {
        return false;
    };
    matches!(left.as_ref(), Expression::DeclarationReference(r) if r.identifier == "super")
        && matches!(right.as_ref(), Expression::DeclarationReference(r) if r.identifier == "init")
}

impl RewritePass for SuperCallsToHeaders {
    fn name(&self) -> &'static str {
        "super-calls-to-headers"
    }

    fn process_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: InitializerDeclaration,
    ) -> InitializerDeclaration {
        let mut declaration = walk_initializer_declaration(self, t, declaration);
        let Some(statements) = &mut declaration.function.statements else {
            return declaration;
        };
        let mut extracted: Option<Expression> = None;
        let mut remaining = Vec::with_capacity(statements.len());
        for statement in statements.drain(..) {
            if is_super_init_call(&statement) {
                if extracted.is_none() {
                    let Statement::Expression { expression, .. } = statement else {
                        unreachable!("is_super_init_call checked the shape");
                    };
                    extracted = Some(expression);
                    continue;
                }
                t.diagnostics.warn(
                    "multiple super.init calls in one initializer; only the first moves to \
                     the constructor header",
                    statement.range(),
                );
            }
            remaining.push(statement);
        }
        *statements = remaining;
        declaration.super_call = extracted.or(declaration.super_call);
        declaration
    }
}

// ── Access modifiers ─────────────────────────────────────────────────────────

/// Translates source access levels to Kotlin ones.
///
/// Top-level declarations default to public and print nothing unless more
/// restrictive; inner declarations are constrained by their enclosing access;
/// `fileprivate` has no Kotlin equivalent (warns, becomes internal);
/// `protected` only arises from an explicit annotation; protocol members
/// never print modifiers.
#[derive(Default)]
pub struct AccessModifiers {
    enclosing: Vec<AccessLevel>,
    in_protocol: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum AccessLevel {
    Private,
    Internal,
    Public,
}

impl AccessLevel {
    fn printed(self) -> Option<EcoString> {
        match self {
            Self::Public => None,
            Self::Internal => Some("internal".into()),
            Self::Private => Some("private".into()),
        }
    }
}

impl AccessModifiers {
    /// Resolves the declared access of one declaration, warning on
    /// `fileprivate`. Annotations override the access field.
    fn resolve(
        &mut self,
        t: &mut Traversal<'_>,
        access: Option<&EcoString>,
        annotations: &[EcoString],
        range: Option<crate::source_range::SourceRange>,
    ) -> Resolved {
        let explicit = annotations.iter().find_map(|a| match a.as_str() {
            "public" | "internal" | "private" | "protected" | "fileprivate" => Some(a.clone()),
            _ => None,
        });
        let declared = explicit.or_else(|| access.cloned());
        if declared.as_deref() == Some("protected") {
            return Resolved::Protected;
        }
        let level = match declared.as_deref() {
            Some("private") => AccessLevel::Private,
            Some("internal") => AccessLevel::Internal,
            Some("fileprivate") => {
                t.diagnostics.warn(
                    "fileprivate has no Kotlin equivalent; using internal",
                    range,
                );
                AccessLevel::Internal
            }
            // `open` and `public` are public access-wise; so is unstated.
            _ => AccessLevel::Public,
        };
        let constrained = self
            .enclosing
            .last()
            .map_or(level, |enclosing| level.min(*enclosing));
        Resolved::Level(constrained)
    }

    fn apply(
        &mut self,
        t: &mut Traversal<'_>,
        access: &mut Option<EcoString>,
        annotations: &[EcoString],
        range: Option<crate::source_range::SourceRange>,
    ) -> AccessLevel {
        if self.in_protocol {
            *access = None;
            return AccessLevel::Public;
        }
        match self.resolve(t, access.as_ref(), annotations, range) {
            Resolved::Protected => {
                *access = Some("protected".into());
                AccessLevel::Public
            }
            Resolved::Level(level) => {
                *access = level.printed();
                level
            }
        }
    }
}

enum Resolved {
    Level(AccessLevel),
    Protected,
}

impl RewritePass for AccessModifiers {
    fn name(&self) -> &'static str {
        "access-modifiers"
    }

    fn process_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: ClassDeclaration,
    ) -> ClassDeclaration {
        let range = declaration.origin.range;
        let level = self.apply(t, &mut declaration.access, &declaration.annotations, range);
        self.enclosing.push(level);
        let declaration = walk_class_declaration(self, t, declaration);
        self.enclosing.pop();
        declaration
    }

    fn process_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: StructDeclaration,
    ) -> StructDeclaration {
        let range = declaration.origin.range;
        let level = self.apply(t, &mut declaration.access, &declaration.annotations, range);
        self.enclosing.push(level);
        let declaration = walk_struct_declaration(self, t, declaration);
        self.enclosing.pop();
        declaration
    }

    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: EnumDeclaration,
    ) -> EnumDeclaration {
        let range = declaration.origin.range;
        let level = self.apply(t, &mut declaration.access, &declaration.annotations, range);
        self.enclosing.push(level);
        let declaration = walk_enum_declaration(self, t, declaration);
        self.enclosing.pop();
        declaration
    }

    fn process_protocol_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: ProtocolDeclaration,
    ) -> ProtocolDeclaration {
        let range = declaration.origin.range;
        self.apply(t, &mut declaration.access, &declaration.annotations, range);
        self.in_protocol = true;
        let declaration = walk_protocol_declaration(self, t, declaration);
        self.in_protocol = false;
        declaration
    }

    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        let range = declaration.origin.range;
        self.apply(t, &mut declaration.access, &declaration.annotations, range);
        walk_function_declaration(self, t, declaration)
    }

    fn process_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: InitializerDeclaration,
    ) -> InitializerDeclaration {
        let range = declaration.function.origin.range;
        self.apply(
            t,
            &mut declaration.function.access,
            &declaration.function.annotations,
            range,
        );
        walk_initializer_declaration(self, t, declaration)
    }

    fn process_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: VariableDeclaration,
    ) -> VariableDeclaration {
        let range = declaration.origin.range;
        self.apply(t, &mut declaration.access, &declaration.annotations, range);
        walk_variable_declaration(self, t, declaration)
    }
}

// ── Open declarations ────────────────────────────────────────────────────────

/// Decides the `is_open` flag: explicit `open`/`final` annotations win,
/// private declarations are never open, local/top-level variables and
/// static/struct/enum members are never open, and otherwise the
/// frontend-provided default survives unless the run defaults to final.
#[derive(Default)]
pub struct OpenDeclarations;

fn decided_openness(
    annotations: &[EcoString],
    access: Option<&EcoString>,
    frontend_default: bool,
    never_open: bool,
    defaults_to_final: bool,
) -> bool {
    if annotations.iter().any(|a| a == "final") {
        return false;
    }
    if annotations.iter().any(|a| a == "open") {
        return true;
    }
    if access.is_some_and(|a| a == "private") || never_open {
        return false;
    }
    if defaults_to_final {
        return false;
    }
    frontend_default
}

fn inside_value_type(t: &Traversal<'_>) -> bool {
    t.ancestors()
        .iter()
        .rev()
        .find_map(|ancestor| match ancestor {
            Ancestor::Class(_) => Some(false),
            Ancestor::Struct(_) | Ancestor::Enum(_) => Some(true),
            _ => None,
        })
        .unwrap_or(false)
}

fn inside_function(t: &Traversal<'_>) -> bool {
    t.ancestors()
        .iter()
        .any(|ancestor| matches!(ancestor, Ancestor::Function(_) | Ancestor::Initializer))
}

impl RewritePass for OpenDeclarations {
    fn name(&self) -> &'static str {
        "open-declarations"
    }

    fn process_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: ClassDeclaration,
    ) -> ClassDeclaration {
        declaration.is_open = decided_openness(
            &declaration.annotations,
            declaration.access.as_ref(),
            declaration.is_open,
            false,
            t.context.configuration.defaults_to_final,
        );
        walk_class_declaration(self, t, declaration)
    }

    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        let never_open = declaration.is_static || inside_value_type(t);
        declaration.is_open = decided_openness(
            &declaration.annotations,
            declaration.access.as_ref(),
            declaration.is_open,
            never_open,
            t.context.configuration.defaults_to_final,
        );
        walk_function_declaration(self, t, declaration)
    }

    fn process_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: VariableDeclaration,
    ) -> VariableDeclaration {
        let never_open = declaration.is_static
            || inside_value_type(t)
            || inside_function(t)
            || t.is_top_level_node();
        declaration.is_open = decided_openness(
            &declaration.annotations,
            declaration.access.as_ref(),
            declaration.is_open,
            never_open,
            t.context.configuration.defaults_to_final,
        );
        walk_variable_declaration(self, t, declaration)
    }
}

// ── Protocol and extension generics ──────────────────────────────────────────

/// Strips synthetic `Self: Protocol` constraints and propagates the extended
/// type's generic parameters into extension-member signatures.
#[derive(Default)]
pub struct ProtocolExtensionGenerics;

impl RewritePass for ProtocolExtensionGenerics {
    fn name(&self) -> &'static str {
        "protocol-extension-generics"
    }

    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        declaration
            .generic_types
            .retain(|generic| !generic.trim_start().starts_with("Self"));
        if let Some(extends) = &declaration.extends_type {
            if let Some((_, arguments)) = split_generic_args(extends) {
                for argument in arguments {
                    let is_plain_parameter = argument
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_');
                    if is_plain_parameter && !declaration.generic_types.contains(&argument) {
                        declaration.generic_types.push(argument);
                    }
                }
            }
        }
        walk_function_declaration(self, t, declaration)
    }
}

// ── Remove open on initializers ──────────────────────────────────────────────

/// Constructors are never open in the target.
#[derive(Default)]
pub struct RemoveOpenOnInitializers;

impl RewritePass for RemoveOpenOnInitializers {
    fn name(&self) -> &'static str {
        "remove-open-on-initializers"
    }

    fn process_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: InitializerDeclaration,
    ) -> InitializerDeclaration {
        declaration.function.is_open = false;
        walk_initializer_declaration(self, t, declaration)
    }
}

// ── Catch variable synthesis ─────────────────────────────────────────────────

/// A `catch` without a binding receives the synthetic `_error: Error`.
#[derive(Default)]
pub struct CatchVariableSynthesis;

impl RewritePass for CatchVariableSynthesis {
    fn name(&self) -> &'static str {
        "catch-variable-synthesis"
    }

    fn process_catch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        mut statement: CatchStatement,
    ) -> CatchStatement {
        if statement.variable.is_none() {
            statement.variable = Some(VariableDeclaration {
                identifier: "_error".into(),
                type_name: "Error".into(),
                expression: None,
                getter: None,
                setter: None,
                access: None,
                is_open: false,
                is_let: true,
                is_static: false,
                extends_type: None,
                annotations: Vec::new(),
                origin: Provenance::default(),
            });
        }
        walk_catch_statement(self, t, statement)
    }
}

// ── Match calls to declarations ──────────────────────────────────────────────

/// Binds every call's arguments to its declared parameter slots and rewrites
/// the labels to the implementation labels; parameters before the last
/// variadic one (and variadic runs themselves) lose their labels. A failed
/// match strips all labels and warns.
#[derive(Default)]
pub struct MatchCallsToDeclarations;

fn called_name(expression: &Expression) -> Option<&DeclarationReference> {
    match expression {
        Expression::DeclarationReference(reference) => Some(reference),
        Expression::Dot { right, .. } => called_name(right),
        Expression::OptionalChain { expression, .. }
        | Expression::Parentheses { expression, .. } => called_name(expression),
        _ => None,
    }
}

impl RewritePass for MatchCallsToDeclarations {
    fn name(&self) -> &'static str {
        "match-calls-to-declarations"
    }

    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        let mut call = walk_call(self, t, call);
        let translation = called_name(&call.function).and_then(|reference| {
            let type_name = reference
                .type_name
                .clone()
                .or_else(|| call.function.type_name())?;
            t.context
                .get_function_translation(&reference.identifier, &type_name)
                .cloned()
        });
        let Some(translation) = translation else {
            return call;
        };

        match match_arguments(&translation.parameters, &call.arguments.pairs) {
            Ok(matched) => {
                let variadic_boundary = last_variadic_index(&translation.parameters);
                for (parameter_index, bound) in matched.bindings.iter().enumerate() {
                    let parameter = &translation.parameters[parameter_index];
                    let suppressed = parameter.is_variadic
                        || variadic_boundary.is_some_and(|last| parameter_index < last);
                    for &argument_index in bound {
                        let argument = &mut call.arguments.pairs[argument_index];
                        let is_trailing_closure = matches!(
                            &argument.expression,
                            Expression::Closure(closure) if closure.is_trailing
                        );
                        argument.label = if suppressed || is_trailing_closure {
                            None
                        } else {
                            Some(parameter.label.clone())
                        };
                    }
                }
            }
            Err(error) => {
                t.diagnostics.warn(
                    eco_format!(
                        "could not match call to `{}` against its declaration ({error}); \
                         emitting positional arguments",
                        translation.source_api_name
                    ),
                    call.origin.range,
                );
                for argument in &mut call.arguments.pairs {
                    argument.label = None;
                }
            }
        }
        call
    }
}

// ── Remove overrides ─────────────────────────────────────────────────────────

/// `override` is dropped from static members and initializers.
#[derive(Default)]
pub struct RemoveOverrides;

impl RewritePass for RemoveOverrides {
    fn name(&self) -> &'static str {
        "remove-overrides"
    }

    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        let in_companion = t.parent() == Some(&Ancestor::CompanionObject);
        if declaration.is_static || in_companion {
            declaration.annotations.retain(|a| a != "override");
        }
        walk_function_declaration(self, t, declaration)
    }

    fn process_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        mut declaration: InitializerDeclaration,
    ) -> InitializerDeclaration {
        declaration.function.annotations.retain(|a| a != "override");
        walk_initializer_declaration(self, t, declaration)
    }
}

// ── Returns in lambdas ───────────────────────────────────────────────────────

/// Single-statement closures lose their `return`; multi-statement closures
/// label every return with the name of the function the closure was passed
/// to. A single-statement switch already converted to a return-expression
/// drops the outer return too.
#[derive(Default)]
pub struct ReturnsInLambdas {
    call_names: Vec<EcoString>,
}

fn label_returns(statements: &mut [Statement], label: &EcoString) {
    for statement in statements {
        match statement {
            Statement::Return(return_statement) => {
                if return_statement.label.is_none() {
                    return_statement.label = Some(label.clone());
                }
            }
            Statement::If(if_statement) => label_returns_in_if(if_statement, label),
            Statement::While(s) => label_returns(&mut s.statements, label),
            Statement::ForEach(s) => label_returns(&mut s.statements, label),
            Statement::Do(s) => label_returns(&mut s.statements, label),
            Statement::Catch(s) => label_returns(&mut s.statements, label),
            Statement::Switch(s) => {
                for case in &mut s.cases {
                    label_returns(&mut case.statements, label);
                }
            }
            // Nested closures label against their own call, not this one.
            _ => {}
        }
    }
}

fn label_returns_in_if(statement: &mut IfStatement, label: &EcoString) {
    label_returns(&mut statement.statements, label);
    if let Some(else_statement) = &mut statement.else_statement {
        label_returns_in_if(else_statement, label);
    }
}

impl RewritePass for ReturnsInLambdas {
    fn name(&self) -> &'static str {
        "returns-in-lambdas"
    }

    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        let name = called_name(&call.function)
            .map(|reference| reference.identifier.clone())
            .unwrap_or_else(|| "run".into());
        self.call_names.push(name);
        let call = walk_call(self, t, call);
        self.call_names.pop();
        call
    }

    fn process_closure(
        &mut self,
        t: &mut Traversal<'_>,
        closure: ClosureExpression,
    ) -> ClosureExpression {
        let mut closure = walk_closure(self, t, closure);
        let single_return = matches!(
            closure.statements.as_slice(),
            [Statement::Return(r)] if r.expression.is_some()
        );
        let single_converted_switch = matches!(
            closure.statements.as_slice(),
            [Statement::Switch(s)] if matches!(
                s.converts_to_expression.as_deref(),
                Some(Statement::Return(_))
            )
        );
        if single_return {
            if let Some(Statement::Return(return_statement)) = closure.statements.pop() {
                if let Some(expression) = return_statement.expression {
                    closure.statements.push(Statement::Expression {
                        expression,
                        origin: return_statement.origin,
                    });
                }
            }
        } else if single_converted_switch {
            if let Some(Statement::Switch(mut switch)) = closure.statements.pop() {
                drop_outer_return(&mut switch);
                closure.statements.push(Statement::Switch(switch));
            }
        } else if closure.statements.len() > 1 {
            if let Some(label) = self.call_names.last() {
                label_returns(&mut closure.statements, label);
            }
        }
        closure
    }
}

fn drop_outer_return(switch: &mut SwitchStatement) {
    switch.converts_to_expression = Some(Box::new(Statement::Expression {
        expression: Expression::NilLiteral {
            origin: Provenance::default(),
        },
        origin: Provenance::default(),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LabeledExpression, ReturnStatement, TupleExpression};
    use crate::context::{FunctionTranslation, TranspilationContext};
    use crate::diagnostics::Diagnostics;
    use crate::driver::NullTypeOracle;
    use crate::test_helpers::function;

    fn run_statements<P: RewritePass>(
        pass: &mut P,
        context: &TranspilationContext,
        statements: Vec<Statement>,
    ) -> (Vec<Statement>, Diagnostics) {
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let result = {
            let mut t = Traversal::new(context, &oracle, &mut diagnostics);
            pass.replace_statements(&mut t, statements)
        };
        (result, diagnostics)
    }

    fn super_init_call() -> Statement {
        Statement::Expression {
            expression: Expression::Call(CallExpression {
                function: Box::new(Expression::Dot {
                    left: Box::new(Expression::reference("super")),
                    right: Box::new(Expression::reference("init")),
                    origin: Provenance::default(),
                }),
                arguments: TupleExpression::unlabeled(vec![Expression::reference("size")]),
                type_name: None,
                allows_trailing_closure: false,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        }
    }

    fn initializer_with(statements: Vec<Statement>) -> InitializerDeclaration {
        InitializerDeclaration {
            function: FunctionDeclaration {
                statements: Some(statements),
                ..function("init", "Box", Vec::new())
            },
            super_call: None,
            is_optional: false,
        }
    }

    #[test]
    fn first_super_call_moves_to_header() {
        let initializer = initializer_with(vec![
            super_init_call(),
            Statement::Return(ReturnStatement {
                expression: None,
                label: None,
                origin: Provenance::default(),
            }),
        ]);
        let context = TranspilationContext::default();
        let (result, diagnostics) = run_statements(
            &mut SuperCallsToHeaders,
            &context,
            vec![Statement::Initializer(initializer)],
        );
        let Statement::Initializer(initializer) = &result[0] else {
            panic!("expected initializer");
        };
        assert!(initializer.super_call.is_some(), "header extracted");
        assert_eq!(
            initializer.function.statements.as_ref().map(Vec::len),
            Some(1),
            "call removed from body"
        );
        assert_eq!(diagnostics.warning_count(), 0);
    }

    #[test]
    fn second_super_call_warns_and_stays() {
        let initializer = initializer_with(vec![super_init_call(), super_init_call()]);
        let context = TranspilationContext::default();
        let (result, diagnostics) = run_statements(
            &mut SuperCallsToHeaders,
            &context,
            vec![Statement::Initializer(initializer)],
        );
        let Statement::Initializer(initializer) = &result[0] else {
            panic!("expected initializer");
        };
        assert!(initializer.super_call.is_some());
        assert_eq!(
            initializer.function.statements.as_ref().map(Vec::len),
            Some(1),
            "second call left in the body"
        );
        assert_eq!(diagnostics.warning_count(), 1, "{:?}", diagnostics.entries());
    }

    #[test]
    fn fileprivate_warns_and_becomes_internal() {
        let mut declaration = function("helper", "()", Vec::new());
        declaration.access = Some("fileprivate".into());
        let context = TranspilationContext::default();
        let (result, diagnostics) = run_statements(
            &mut AccessModifiers::default(),
            &context,
            vec![Statement::Function(declaration)],
        );
        let Statement::Function(declaration) = &result[0] else {
            panic!("expected function");
        };
        assert_eq!(declaration.access.as_deref(), Some("internal"));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn top_level_public_prints_nothing() {
        let mut declaration = function("api", "()", Vec::new());
        declaration.access = Some("public".into());
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut AccessModifiers::default(),
            &context,
            vec![Statement::Function(declaration)],
        );
        let Statement::Function(declaration) = &result[0] else {
            panic!("expected function");
        };
        assert_eq!(declaration.access, None);
    }

    #[test]
    fn members_are_constrained_by_enclosing_access() {
        let mut member = function("inner", "()", Vec::new());
        member.access = Some("public".into());
        let class = ClassDeclaration {
            name: "Hidden".into(),
            annotations: Vec::new(),
            access: Some("internal".into()),
            is_open: false,
            inherits: Vec::new(),
            members: vec![Statement::Function(member)],
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut AccessModifiers::default(),
            &context,
            vec![Statement::Class(class)],
        );
        let Statement::Class(class) = &result[0] else {
            panic!("expected class");
        };
        let Statement::Function(member) = &class.members[0] else {
            panic!("expected member");
        };
        assert_eq!(member.access.as_deref(), Some("internal"));
    }

    #[test]
    fn explicit_final_beats_frontend_openness() {
        let mut declaration = function("sealed", "()", Vec::new());
        declaration.is_open = true;
        declaration.annotations = vec!["final".into()];
        let class = ClassDeclaration {
            name: "Holder".into(),
            annotations: Vec::new(),
            access: None,
            is_open: false,
            inherits: Vec::new(),
            members: vec![Statement::Function(declaration)],
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut OpenDeclarations,
            &context,
            vec![Statement::Class(class)],
        );
        let Statement::Class(class) = &result[0] else {
            panic!("expected class");
        };
        let Statement::Function(declaration) = &class.members[0] else {
            panic!("expected function");
        };
        assert!(!declaration.is_open);
    }

    #[test]
    fn struct_members_are_never_open() {
        let mut member = function("method", "()", Vec::new());
        member.is_open = true;
        let declaration = StructDeclaration {
            name: "Value".into(),
            annotations: Vec::new(),
            access: None,
            inherits: Vec::new(),
            members: vec![Statement::Function(member)],
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut OpenDeclarations,
            &context,
            vec![Statement::Struct(declaration)],
        );
        let Statement::Struct(declaration) = &result[0] else {
            panic!("expected struct");
        };
        let Statement::Function(member) = &declaration.members[0] else {
            panic!("expected function");
        };
        assert!(!member.is_open);
    }

    #[test]
    fn defaults_to_final_closes_ambiguous_declarations() {
        let mut declaration = function("maybeOpen", "()", Vec::new());
        declaration.is_open = true;
        let class = ClassDeclaration {
            name: "Holder".into(),
            annotations: Vec::new(),
            access: None,
            is_open: true,
            inherits: Vec::new(),
            members: vec![Statement::Function(declaration)],
            origin: Provenance::default(),
        };
        let mut context = TranspilationContext::default();
        context.configuration.defaults_to_final = true;
        let (result, _) = run_statements(
            &mut OpenDeclarations,
            &context,
            vec![Statement::Class(class)],
        );
        let Statement::Class(class) = &result[0] else {
            panic!("expected class");
        };
        assert!(!class.is_open);
    }

    #[test]
    fn self_constraints_are_stripped_and_extension_generics_propagate() {
        let mut declaration = function("first", "T?", Vec::new());
        declaration.generic_types = vec!["Self: Collection".into()];
        declaration.extends_type = Some("Box<T>".into());
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut ProtocolExtensionGenerics,
            &context,
            vec![Statement::Function(declaration)],
        );
        let Statement::Function(declaration) = &result[0] else {
            panic!("expected function");
        };
        assert_eq!(declaration.generic_types, vec![EcoString::from("T")]);
    }

    #[test]
    fn bindingless_catch_gets_synthetic_error() {
        let statement = Statement::Catch(CatchStatement {
            variable: None,
            statements: Vec::new(),
            origin: Provenance::default(),
        });
        let context = TranspilationContext::default();
        let (result, _) =
            run_statements(&mut CatchVariableSynthesis, &context, vec![statement]);
        let Statement::Catch(statement) = &result[0] else {
            panic!("expected catch");
        };
        let variable = statement.variable.as_ref().expect("synthesized binding");
        assert_eq!(variable.identifier, "_error");
        assert_eq!(variable.type_name, "Error");
    }

    #[test]
    fn matched_call_gains_declaration_labels() {
        let mut context = TranspilationContext::default();
        context.record_function_translation(FunctionTranslation {
            source_api_name: "move".into(),
            type_name: "(Int) -> ()".into(),
            prefix: "move".into(),
            parameters: vec![crate::ast::FunctionParameter {
                label: "distance".into(),
                api_label: Some("by".into()),
                type_name: "Int".into(),
                value: None,
                is_variadic: false,
            }],
        });
        let call = Statement::Expression {
            expression: Expression::Call(CallExpression {
                function: Box::new(Expression::typed_reference("move", "(Int) -> ()")),
                arguments: TupleExpression {
                    pairs: vec![LabeledExpression {
                        label: Some("by".into()),
                        expression: Expression::reference("step"),
                    }],
                    origin: Provenance::default(),
                },
                type_name: Some("()".into()),
                allows_trailing_closure: false,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        };
        let (result, diagnostics) =
            run_statements(&mut MatchCallsToDeclarations, &context, vec![call]);
        let Statement::Expression {
            expression: Expression::Call(call),
            ..
        } = &result[0]
        else {
            panic!("expected call");
        };
        assert_eq!(call.arguments.pairs[0].label.as_deref(), Some("distance"));
        assert_eq!(diagnostics.warning_count(), 0);
    }

    #[test]
    fn failed_match_strips_labels_and_warns() {
        let mut context = TranspilationContext::default();
        context.record_function_translation(FunctionTranslation {
            source_api_name: "move".into(),
            type_name: "(Int) -> ()".into(),
            prefix: "move".into(),
            parameters: vec![crate::ast::FunctionParameter::named("by", "Int")],
        });
        let call = Statement::Expression {
            expression: Expression::Call(CallExpression {
                function: Box::new(Expression::typed_reference("move", "(Int) -> ()")),
                arguments: TupleExpression {
                    pairs: vec![
                        LabeledExpression {
                            label: Some("by".into()),
                            expression: Expression::reference("step"),
                        },
                        LabeledExpression {
                            label: Some("extra".into()),
                            expression: Expression::reference("junk"),
                        },
                    ],
                    origin: Provenance::default(),
                },
                type_name: Some("()".into()),
                allows_trailing_closure: false,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        };
        let (result, diagnostics) =
            run_statements(&mut MatchCallsToDeclarations, &context, vec![call]);
        let Statement::Expression {
            expression: Expression::Call(call),
            ..
        } = &result[0]
        else {
            panic!("expected call");
        };
        assert!(call.arguments.pairs.iter().all(|pair| pair.label.is_none()));
        assert_eq!(diagnostics.warning_count(), 1, "{:?}", diagnostics.entries());
    }

    #[test]
    fn static_member_override_is_dropped() {
        let mut declaration = function("create", "Box", Vec::new());
        declaration.is_static = true;
        declaration.annotations = vec!["override".into()];
        let context = TranspilationContext::default();
        let (result, _) = run_statements(
            &mut RemoveOverrides,
            &context,
            vec![Statement::Function(declaration)],
        );
        let Statement::Function(declaration) = &result[0] else {
            panic!("expected function");
        };
        assert!(declaration.annotations.is_empty());
    }

    #[test]
    fn single_return_closure_loses_the_return() {
        let closure = Expression::Closure(ClosureExpression {
            parameters: Vec::new(),
            statements: vec![Statement::Return(ReturnStatement {
                expression: Some(Expression::reference("it")),
                label: None,
                origin: Provenance::default(),
            })],
            type_name: "(Int) -> Int".into(),
            is_trailing: true,
            origin: Provenance::default(),
        });
        let call = Statement::Expression {
            expression: Expression::Call(CallExpression {
                function: Box::new(Expression::reference("map")),
                arguments: TupleExpression::unlabeled(vec![closure]),
                type_name: None,
                allows_trailing_closure: true,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let (result, _) =
            run_statements(&mut ReturnsInLambdas::default(), &context, vec![call]);
        let Statement::Expression {
            expression: Expression::Call(call),
            ..
        } = &result[0]
        else {
            panic!("expected call");
        };
        let Expression::Closure(closure) = &call.arguments.pairs[0].expression else {
            panic!("expected closure");
        };
        assert!(
            matches!(&closure.statements[0], Statement::Expression { .. }),
            "return elided: {:?}",
            closure.statements[0]
        );
    }

    #[test]
    fn multi_statement_closure_returns_get_labeled() {
        let closure = Expression::Closure(ClosureExpression {
            parameters: Vec::new(),
            statements: vec![
                Statement::Expression {
                    expression: Expression::reference("sideEffect"),
                    origin: Provenance::default(),
                },
                Statement::Return(ReturnStatement {
                    expression: Some(Expression::reference("it")),
                    label: None,
                    origin: Provenance::default(),
                }),
            ],
            type_name: "(Int) -> Int".into(),
            is_trailing: true,
            origin: Provenance::default(),
        });
        let call = Statement::Expression {
            expression: Expression::Call(CallExpression {
                function: Box::new(Expression::reference("map")),
                arguments: TupleExpression::unlabeled(vec![closure]),
                type_name: None,
                allows_trailing_closure: true,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let (result, _) =
            run_statements(&mut ReturnsInLambdas::default(), &context, vec![call]);
        let Statement::Expression {
            expression: Expression::Call(call),
            ..
        } = &result[0]
        else {
            panic!("expected call");
        };
        let Expression::Closure(closure) = &call.arguments.pairs[0].expression else {
            panic!("expected closure");
        };
        let Statement::Return(labeled) = &closure.statements[1] else {
            panic!("expected return");
        };
        assert_eq!(labeled.label.as_deref(), Some("map"));
    }
}
