// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Switch rewrites: case-pattern bindings, enum capitalization, `is` tests,
//! expression-valued `when`s, and break removal.

use crate::ast::{
    AssignmentStatement, Expression, IfStatement, Provenance, Statement, SwitchStatement,
    VariableDeclaration,
};
use crate::pass::{
    Ancestor, RewritePass, Traversal, walk_enum_declaration, walk_statements,
    walk_switch_statement,
};
use ecow::{EcoString, eco_format};

/// First letter uppercased: `south` → `South`.
pub(crate) fn capitalized(name: &str) -> EcoString {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => eco_format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => EcoString::new(),
    }
}

/// Lower camel case to upper snake case: `northWest` → `NORTH_WEST`.
/// Already-converted names pass through unchanged.
pub(crate) fn upper_snake_case(name: &str) -> EcoString {
    let already_converted = name
        .chars()
        .all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit());
    if already_converted {
        return name.into();
    }
    let mut result = EcoString::new();
    for (index, character) in name.chars().enumerate() {
        if character.is_uppercase() && index > 0 {
            result.push('_');
        }
        for upper in character.to_uppercase() {
            result.push(upper);
        }
    }
    result
}

/// The fully qualified name of a declaration at the current traversal point.
fn qualified_name(t: &Traversal<'_>, name: &EcoString) -> EcoString {
    match t.enclosing_type_name() {
        Some(enclosing) => eco_format!("{enclosing}.{name}"),
        None => name.clone(),
    }
}

/// The enum type a switch subject (or comparison operand) ranges over.
fn subject_enum_name(t: &Traversal<'_>, subject: &Expression) -> Option<EcoString> {
    let type_name = subject.type_name().or_else(|| {
        subject
            .origin()
            .handle
            .and_then(|handle| t.oracle.parent_type(handle))
    })?;
    Some(type_name.trim_end_matches('?').into())
}

/// Splits `Enum.case` dots and implicit `.case` references.
fn case_reference<'e>(
    expression: &'e Expression,
    enum_name: &str,
) -> Option<(&'e EcoString, bool)> {
    match expression {
        Expression::Dot { left, right, .. } => {
            let matches_enum = match left.as_ref() {
                Expression::TypeReference { type_name, .. } => type_name == enum_name,
                Expression::DeclarationReference(reference) => reference.identifier == enum_name,
                _ => false,
            };
            if !matches_enum {
                return None;
            }
            match right.as_ref() {
                Expression::DeclarationReference(reference) => Some((&reference.identifier, false)),
                _ => None,
            }
        }
        Expression::DeclarationReference(reference) if reference.is_implicit => {
            Some((&reference.identifier, true))
        }
        _ => None,
    }
}

// ── Characters in switches ───────────────────────────────────────────────────

/// When the switch subject is a character, string-literal cases become
/// character literals.
#[derive(Default)]
pub struct CharactersInSwitches;

impl RewritePass for CharactersInSwitches {
    fn name(&self) -> &'static str {
        "characters-in-switches"
    }

    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        let mut statement = walk_switch_statement(self, t, statement);
        if statement.expression.type_name().as_deref() != Some("Character") {
            return statement;
        }
        for case in &mut statement.cases {
            for expression in &mut case.expressions {
                if let Expression::StringLiteral { value, origin, .. } = expression {
                    if value.chars().count() == 1 {
                        *expression = Expression::CharacterLiteral {
                            value: value.clone(),
                            origin: origin.clone(),
                        };
                    }
                }
            }
        }
        statement
    }
}

// ── Annotations for case-let ─────────────────────────────────────────────────

/// In a switch over a sealed-class enum, `case .south(let k)` drops its
/// binding list and every use of `k` in the case body becomes a typed member
/// access on the subject (`d.distance`).
#[derive(Default)]
pub struct AnnotationsForCaseLet;

fn replace_reference(expression: &mut Expression, name: &str, replacement: &Expression) {
    match expression {
        Expression::DeclarationReference(reference) if reference.identifier == name => {
            *expression = replacement.clone();
        }
        Expression::Dot { left, .. } => {
            // Member names to the right of a dot are not uses of the binding.
            replace_reference(left, name, replacement);
        }
        Expression::Call(call) => {
            replace_reference(&mut call.function, name, replacement);
            for pair in &mut call.arguments.pairs {
                replace_reference(&mut pair.expression, name, replacement);
            }
        }
        Expression::BinaryOperator { left, right, .. }
        | Expression::Concatenation { left, right, .. } => {
            replace_reference(left, name, replacement);
            replace_reference(right, name, replacement);
        }
        Expression::Parentheses { expression, .. }
        | Expression::ForceUnwrap { expression, .. }
        | Expression::OptionalChain { expression, .. } => {
            replace_reference(expression, name, replacement);
        }
        Expression::PrefixUnary { operand, .. } | Expression::PostfixUnary { operand, .. } => {
            replace_reference(operand, name, replacement);
        }
        Expression::Subscript {
            subscripted,
            indices,
            ..
        } => {
            replace_reference(subscripted, name, replacement);
            for index in indices {
                replace_reference(&mut index.expression, name, replacement);
            }
        }
        Expression::InterpolatedString { segments, .. } => {
            for segment in segments {
                replace_reference(segment, name, replacement);
            }
        }
        Expression::IfTernary {
            condition,
            then_expression,
            else_expression,
            ..
        } => {
            replace_reference(condition, name, replacement);
            replace_reference(then_expression, name, replacement);
            replace_reference(else_expression, name, replacement);
        }
        _ => {}
    }
}

fn replace_reference_in_statements(
    statements: &mut [Statement],
    name: &str,
    replacement: &Expression,
) {
    for statement in statements {
        match statement {
            Statement::Expression { expression, .. } | Statement::Throw { expression, .. } => {
                replace_reference(expression, name, replacement);
            }
            Statement::Variable(variable) => {
                if let Some(expression) = &mut variable.expression {
                    replace_reference(expression, name, replacement);
                }
            }
            Statement::Assignment(assignment) => {
                replace_reference(&mut assignment.left, name, replacement);
                replace_reference(&mut assignment.right, name, replacement);
            }
            Statement::Return(return_statement) => {
                if let Some(expression) = &mut return_statement.expression {
                    replace_reference(expression, name, replacement);
                }
            }
            Statement::If(if_statement) => {
                replace_reference_in_if(if_statement, name, replacement);
            }
            Statement::While(s) => {
                replace_reference(&mut s.condition, name, replacement);
                replace_reference_in_statements(&mut s.statements, name, replacement);
            }
            Statement::ForEach(s) => {
                replace_reference(&mut s.collection, name, replacement);
                replace_reference_in_statements(&mut s.statements, name, replacement);
            }
            Statement::Do(s) => {
                replace_reference_in_statements(&mut s.statements, name, replacement);
            }
            Statement::Catch(s) => {
                replace_reference_in_statements(&mut s.statements, name, replacement);
            }
            Statement::Switch(s) => {
                replace_reference(&mut s.expression, name, replacement);
                for case in &mut s.cases {
                    replace_reference_in_statements(&mut case.statements, name, replacement);
                }
            }
            _ => {}
        }
    }
}

fn replace_reference_in_if(statement: &mut IfStatement, name: &str, replacement: &Expression) {
    for condition in &mut statement.conditions {
        match condition {
            crate::ast::IfCondition::Condition(expression) => {
                replace_reference(expression, name, replacement);
            }
            crate::ast::IfCondition::Declaration(declaration) => {
                if let Some(expression) = &mut declaration.expression {
                    replace_reference(expression, name, replacement);
                }
            }
        }
    }
    replace_reference_in_statements(&mut statement.statements, name, replacement);
    if let Some(else_statement) = &mut statement.else_statement {
        replace_reference_in_if(else_statement, name, replacement);
    }
}

impl RewritePass for AnnotationsForCaseLet {
    fn name(&self) -> &'static str {
        "annotations-for-case-let"
    }

    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        let mut statement = walk_switch_statement(self, t, statement);
        let Some(enum_name) = subject_enum_name(t, &statement.expression) else {
            return statement;
        };
        let Some(declaration) = t.context.sealed_class_declaration(&enum_name).cloned() else {
            return statement;
        };

        for case in &mut statement.cases {
            for expression in &mut case.expressions {
                let Expression::Call(call) = expression else {
                    continue;
                };
                let Some((element_name, _)) = case_reference(&call.function, &enum_name) else {
                    continue;
                };
                let Some(element) = declaration
                    .elements
                    .iter()
                    .find(|element| element.name == *element_name)
                else {
                    continue;
                };

                // The pattern keeps only the element reference.
                let bare_pattern = (*call.function).clone();
                for (argument, value) in call
                    .arguments
                    .pairs
                    .iter()
                    .zip(element.associated_values.iter())
                {
                    let Expression::DeclarationReference(binding) = &argument.expression else {
                        continue;
                    };
                    let label = value.label.clone().unwrap_or_else(|| "value".into());
                    let access = Expression::Dot {
                        left: Box::new(statement.expression.clone()),
                        right: Box::new(Expression::typed_reference(
                            label,
                            value.type_name.clone(),
                        )),
                        origin: Provenance::default(),
                    };
                    replace_reference_in_statements(
                        &mut case.statements,
                        &binding.identifier,
                        &access,
                    );
                }
                *expression = bare_pattern;
            }
        }
        statement
    }
}

// ── Capitalize enums ─────────────────────────────────────────────────────────

/// Sealed-class cases capitalize; enum-class cases upper-snake-case. Applies
/// at declaration sites and at qualified use sites.
#[derive(Default)]
pub struct CapitalizeEnums;

impl RewritePass for CapitalizeEnums {
    fn name(&self) -> &'static str {
        "capitalize-enums"
    }

    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: crate::ast::EnumDeclaration,
    ) -> crate::ast::EnumDeclaration {
        let full = qualified_name(t, &declaration.name);
        let mut declaration = walk_enum_declaration(self, t, declaration);
        if t.context.is_sealed_class(&full) {
            for element in &mut declaration.elements {
                element.name = capitalized(&element.name);
            }
        } else if t.context.is_enum_class(&full) {
            for element in &mut declaration.elements {
                element.name = upper_snake_case(&element.name);
            }
        }
        declaration
    }

    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        let enum_name = match &left {
            Expression::TypeReference { type_name, .. } => Some(type_name.clone()),
            Expression::DeclarationReference(reference) => Some(reference.identifier.clone()),
            _ => None,
        };
        let mut right = right;
        if let (Some(enum_name), Expression::DeclarationReference(reference)) =
            (&enum_name, &mut right)
        {
            if t.context.is_sealed_class(enum_name) {
                reference.identifier = capitalized(&reference.identifier);
            } else if t.context.is_enum_class(enum_name) {
                reference.identifier = upper_snake_case(&reference.identifier);
            }
        }
        t.with_ancestor(Ancestor::Dot, |t| Expression::Dot {
            left: Box::new(self.replace_expression(t, left)),
            right: Box::new(self.replace_expression(t, right)),
            origin,
        })
    }
}

// ── is in switches and ifs ───────────────────────────────────────────────────

/// Switching over a sealed-class enum turns each case's dot reference into an
/// `is` test; in `==` comparisons, sealed-class operands use `is` while
/// enum-class operands stay `==` (with implicit references qualified).
#[derive(Default)]
pub struct IsInSwitches;

fn sealed_case_test(subject: &Expression, enum_name: &str, case_name: &str) -> Expression {
    Expression::BinaryOperator {
        left: Box::new(subject.clone()),
        right: Box::new(Expression::TypeReference {
            type_name: eco_format!("{enum_name}.{}", capitalized(case_name)),
            origin: Provenance::default(),
        }),
        operator: "is".into(),
        type_name: Some("Bool".into()),
        origin: Provenance::default(),
    }
}

fn qualified_case(enum_name: &str, case_name: &str) -> Expression {
    Expression::Dot {
        left: Box::new(Expression::TypeReference {
            type_name: enum_name.into(),
            origin: Provenance::default(),
        }),
        right: Box::new(Expression::reference(upper_snake_case(case_name))),
        origin: Provenance::default(),
    }
}

impl RewritePass for IsInSwitches {
    fn name(&self) -> &'static str {
        "is-in-switches"
    }

    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        let mut statement = walk_switch_statement(self, t, statement);
        let Some(enum_name) = subject_enum_name(t, &statement.expression) else {
            return statement;
        };
        let sealed = t.context.is_sealed_class(&enum_name);
        let enum_class = t.context.is_enum_class(&enum_name);
        if !sealed && !enum_class {
            return statement;
        }

        for case in &mut statement.cases {
            for expression in &mut case.expressions {
                let Some((case_name, implicit)) = case_reference(expression, &enum_name) else {
                    continue;
                };
                let case_name = case_name.clone();
                if sealed {
                    *expression =
                        sealed_case_test(&statement.expression, &enum_name, &case_name);
                } else if implicit {
                    *expression = qualified_case(&enum_name, &case_name);
                }
            }
        }
        statement
    }

    fn replace_binary_operator(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        operator: EcoString,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        if operator == "==" {
            if let Some(enum_name) = subject_enum_name(t, &left) {
                let case = case_reference(&right, &enum_name).map(|(name, i)| (name.clone(), i));
                if let Some((case_name, implicit)) = case {
                    if t.context.is_sealed_class(&enum_name) {
                        let test = sealed_case_test(&left, &enum_name, &case_name);
                        let left = t.with_ancestor(Ancestor::BinaryOperator("is".into()), |t| {
                            self.replace_expression(t, left)
                        });
                        let Expression::BinaryOperator { right, .. } = test else {
                            unreachable!("sealed_case_test builds a binary operator");
                        };
                        return Expression::BinaryOperator {
                            left: Box::new(left),
                            right,
                            operator: "is".into(),
                            type_name: Some("Bool".into()),
                            origin,
                        };
                    }
                    if t.context.is_enum_class(&enum_name) && implicit {
                        let left = t.with_ancestor(Ancestor::BinaryOperator("==".into()), |t| {
                            self.replace_expression(t, left)
                        });
                        return Expression::BinaryOperator {
                            left: Box::new(left),
                            right: Box::new(qualified_case(&enum_name, &case_name)),
                            operator,
                            type_name,
                            origin,
                        };
                    }
                }
            }
        }
        t.with_ancestor(Ancestor::BinaryOperator(operator.clone()), |t| {
            Expression::BinaryOperator {
                left: Box::new(self.replace_expression(t, left)),
                right: Box::new(self.replace_expression(t, right)),
                operator,
                type_name,
                origin,
            }
        })
    }
}

// ── Switches to expressions ──────────────────────────────────────────────────

/// A switch whose every case ends in `return expr` (or `lhs = expr` with one
/// `lhs`) becomes an expression-valued `when`; a variable declaration
/// immediately followed by a switch assigning it merges into one declaration.
#[derive(Default)]
pub struct SwitchesToExpressions;

fn convert_returning_switch(statement: &mut SwitchStatement) -> bool {
    let all_return = !statement.cases.is_empty()
        && statement.cases.iter().all(|case| {
            matches!(
                case.statements.last(),
                Some(Statement::Return(r)) if r.expression.is_some()
            )
        });
    if !all_return {
        return false;
    }
    for case in &mut statement.cases {
        if let Some(Statement::Return(r)) = case.statements.pop() {
            let expression = r.expression.unwrap_or(Expression::NilLiteral {
                origin: Provenance::default(),
            });
            case.statements.push(Statement::Expression {
                expression,
                origin: r.origin,
            });
        }
    }
    statement.converts_to_expression = Some(Box::new(Statement::Return(
        crate::ast::ReturnStatement {
            expression: None,
            label: None,
            origin: Provenance::default(),
        },
    )));
    true
}

fn convert_assigning_switch(statement: &mut SwitchStatement) -> bool {
    let mut target: Option<Expression> = None;
    for case in &statement.cases {
        let Some(Statement::Assignment(assignment)) = case.statements.last() else {
            return false;
        };
        match &target {
            None => target = Some(assignment.left.clone()),
            Some(existing) if *existing == assignment.left => {}
            Some(_) => return false,
        }
    }
    let Some(target) = target else {
        return false;
    };
    for case in &mut statement.cases {
        if let Some(Statement::Assignment(assignment)) = case.statements.pop() {
            case.statements.push(Statement::Expression {
                expression: assignment.right,
                origin: assignment.origin,
            });
        }
    }
    statement.converts_to_expression = Some(Box::new(Statement::Assignment(
        AssignmentStatement {
            left: target,
            right: Expression::NilLiteral {
                origin: Provenance::default(),
            },
            origin: Provenance::default(),
        },
    )));
    true
}

impl RewritePass for SwitchesToExpressions {
    fn name(&self) -> &'static str {
        "switches-to-expressions"
    }

    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        let mut statement = walk_switch_statement(self, t, statement);
        if !convert_returning_switch(&mut statement) {
            convert_assigning_switch(&mut statement);
        }
        statement
    }

    fn replace_statements(
        &mut self,
        t: &mut Traversal<'_>,
        statements: Vec<Statement>,
    ) -> Vec<Statement> {
        let rewritten = walk_statements(self, t, statements);

        // Merge `var r = …` + `r = when (…)` pairs into one declaration.
        let mut merged: Vec<Statement> = Vec::with_capacity(rewritten.len());
        for statement in rewritten {
            let mergeable = match (&merged.last(), &statement) {
                (Some(Statement::Variable(variable)), Statement::Switch(switch)) => {
                    matches!(
                        switch.converts_to_expression.as_deref(),
                        Some(Statement::Assignment(assignment)) if matches!(
                            &assignment.left,
                            Expression::DeclarationReference(reference)
                                if reference.identifier == variable.identifier
                        )
                    )
                }
                _ => false,
            };
            if mergeable {
                let Some(Statement::Variable(mut variable)) = merged.pop() else {
                    unreachable!("checked above");
                };
                let Statement::Switch(mut switch) = statement else {
                    unreachable!("checked above");
                };
                variable.expression = None;
                variable.is_let = true;
                switch.converts_to_expression =
                    Some(Box::new(Statement::Variable(variable)));
                merged.push(Statement::Switch(switch));
            } else {
                merged.push(statement);
            }
        }
        merged
    }
}

// ── Remove breaks in switches ────────────────────────────────────────────────

/// Drops a case body that is nothing but `break`.
#[derive(Default)]
pub struct RemoveBreaksInSwitches;

impl RewritePass for RemoveBreaksInSwitches {
    fn name(&self) -> &'static str {
        "remove-breaks-in-switches"
    }

    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        let mut statement = walk_switch_statement(self, t, statement);
        for case in &mut statement.cases {
            if matches!(case.statements.as_slice(), [Statement::Break { .. }]) {
                case.statements.clear();
            }
        }
        statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumElement, LabeledType, ReturnStatement, SwitchCase};
    use crate::context::TranspilationContext;
    use crate::diagnostics::Diagnostics;
    use crate::driver::NullTypeOracle;
    use crate::test_helpers::enum_declaration;

    fn sealed_direction_context() -> TranspilationContext {
        let mut context = TranspilationContext::default();
        let declaration = enum_declaration(
            "Direction",
            vec![
                EnumElement {
                    name: "north".into(),
                    associated_values: Vec::new(),
                    raw_value: None,
                    annotations: Vec::new(),
                },
                EnumElement {
                    name: "south".into(),
                    associated_values: vec![LabeledType {
                        label: Some("distance".into()),
                        type_name: "Int".into(),
                    }],
                    raw_value: None,
                    annotations: Vec::new(),
                },
            ],
        );
        context.record_sealed_class("Direction", declaration);
        context
    }

    fn run_switch<P: RewritePass>(
        pass: &mut P,
        context: &TranspilationContext,
        statement: SwitchStatement,
    ) -> Vec<Statement> {
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(context, &oracle, &mut diagnostics);
        pass.replace_statements(&mut t, vec![Statement::Switch(statement)])
    }

    fn direction_subject() -> Expression {
        Expression::typed_reference("d", "Direction")
    }

    fn implicit_case(name: &str) -> Expression {
        Expression::DeclarationReference(crate::ast::DeclarationReference {
            identifier: name.into(),
            type_name: None,
            is_standard_library: false,
            is_implicit: true,
            origin: Provenance::default(),
        })
    }

    fn print_call(argument: Expression) -> Statement {
        Statement::Expression {
            expression: Expression::Call(crate::ast::CallExpression {
                function: Box::new(Expression::reference("print")),
                arguments: crate::ast::TupleExpression::unlabeled(vec![argument]),
                type_name: Some("()".into()),
                allows_trailing_closure: false,
                is_pure: false,
                origin: Provenance::default(),
            }),
            origin: Provenance::default(),
        }
    }

    #[test]
    fn case_let_bindings_become_subject_member_accesses() {
        let context = sealed_direction_context();
        let case_pattern = Expression::Call(crate::ast::CallExpression {
            function: Box::new(implicit_case("south")),
            arguments: crate::ast::TupleExpression::unlabeled(vec![Expression::reference("k")]),
            type_name: None,
            allows_trailing_closure: false,
            is_pure: false,
            origin: Provenance::default(),
        });
        let statement = SwitchStatement {
            expression: direction_subject(),
            converts_to_expression: None,
            cases: vec![SwitchCase {
                expressions: vec![case_pattern],
                statements: vec![print_call(Expression::reference("k"))],
            }],
            origin: Provenance::default(),
        };
        let result = run_switch(&mut AnnotationsForCaseLet, &context, statement);
        let Statement::Switch(statement) = &result[0] else {
            panic!("expected switch");
        };
        // The binding list is gone from the pattern.
        assert!(matches!(
            &statement.cases[0].expressions[0],
            Expression::DeclarationReference(r) if r.identifier == "south"
        ));
        // Uses of k became d.distance.
        let Statement::Expression {
            expression: Expression::Call(call),
            ..
        } = &statement.cases[0].statements[0]
        else {
            panic!("expected print call");
        };
        let Expression::Dot { left, right, .. } = &call.arguments.pairs[0].expression else {
            panic!(
                "expected member access, got {:?}",
                call.arguments.pairs[0].expression
            );
        };
        assert!(matches!(
            left.as_ref(),
            Expression::DeclarationReference(r) if r.identifier == "d"
        ));
        assert!(matches!(
            right.as_ref(),
            Expression::DeclarationReference(r) if r.identifier == "distance"
        ));
    }

    #[test]
    fn sealed_enum_declaration_sites_capitalize() {
        let context = sealed_direction_context();
        let declaration = context
            .sealed_class_declaration("Direction")
            .expect("recorded")
            .clone();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let result =
            CapitalizeEnums.replace_statements(&mut t, vec![Statement::Enum(declaration)]);
        let Statement::Enum(declaration) = &result[0] else {
            panic!("expected enum");
        };
        let names: Vec<&str> = declaration
            .elements
            .iter()
            .map(|element| element.name.as_str())
            .collect();
        assert_eq!(names, vec!["North", "South"]);
    }

    #[test]
    fn enum_class_cases_upper_snake() {
        let mut context = TranspilationContext::default();
        context.record_enum_class("Compass");
        let declaration = enum_declaration(
            "Compass",
            vec![EnumElement {
                name: "northWest".into(),
                associated_values: Vec::new(),
                raw_value: None,
                annotations: Vec::new(),
            }],
        );
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let result =
            CapitalizeEnums.replace_statements(&mut t, vec![Statement::Enum(declaration)]);
        let Statement::Enum(declaration) = &result[0] else {
            panic!("expected enum");
        };
        assert_eq!(declaration.elements[0].name, "NORTH_WEST");
    }

    #[test]
    fn dot_use_sites_capitalize_too() {
        let context = sealed_direction_context();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let dot = Expression::Dot {
            left: Box::new(Expression::TypeReference {
                type_name: "Direction".into(),
                origin: Provenance::default(),
            }),
            right: Box::new(Expression::reference("south")),
            origin: Provenance::default(),
        };
        let rewritten = CapitalizeEnums.replace_expression(&mut t, dot);
        let Expression::Dot { right, .. } = rewritten else {
            panic!("expected dot");
        };
        assert!(matches!(
            right.as_ref(),
            Expression::DeclarationReference(r) if r.identifier == "South"
        ));
    }

    #[test]
    fn sealed_switch_cases_become_is_tests() {
        let context = sealed_direction_context();
        let statement = SwitchStatement {
            expression: direction_subject(),
            converts_to_expression: None,
            cases: vec![
                SwitchCase {
                    expressions: vec![implicit_case("north")],
                    statements: vec![print_call(Expression::StringLiteral {
                        value: "n".into(),
                        is_multiline: false,
                        origin: Provenance::default(),
                    })],
                },
                SwitchCase {
                    expressions: Vec::new(),
                    statements: vec![Statement::Break {
                        origin: Provenance::default(),
                    }],
                },
            ],
            origin: Provenance::default(),
        };
        let result = run_switch(&mut IsInSwitches, &context, statement);
        let Statement::Switch(statement) = &result[0] else {
            panic!("expected switch");
        };
        let Expression::BinaryOperator {
            operator, right, ..
        } = &statement.cases[0].expressions[0]
        else {
            panic!(
                "expected is test, got {:?}",
                statement.cases[0].expressions[0]
            );
        };
        assert_eq!(operator, "is");
        assert!(matches!(
            right.as_ref(),
            Expression::TypeReference { type_name, .. } if type_name == "Direction.North"
        ));
    }

    #[test]
    fn equality_against_sealed_case_becomes_is() {
        let context = sealed_direction_context();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let comparison = Expression::BinaryOperator {
            left: Box::new(direction_subject()),
            right: Box::new(implicit_case("north")),
            operator: "==".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let rewritten = IsInSwitches.replace_expression(&mut t, comparison);
        let Expression::BinaryOperator { operator, .. } = &rewritten else {
            panic!("expected binary operator");
        };
        assert_eq!(operator, "is");
    }

    #[test]
    fn equality_against_enum_class_case_stays_equality() {
        let mut context = TranspilationContext::default();
        context.record_enum_class("Compass");
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let comparison = Expression::BinaryOperator {
            left: Box::new(Expression::typed_reference("c", "Compass")),
            right: Box::new(implicit_case("north")),
            operator: "==".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let rewritten = IsInSwitches.replace_expression(&mut t, comparison);
        let Expression::BinaryOperator {
            operator, right, ..
        } = &rewritten
        else {
            panic!("expected binary operator");
        };
        assert_eq!(operator, "==");
        let Expression::Dot { right: case, .. } = right.as_ref() else {
            panic!("expected qualified case, got {right:?}");
        };
        assert!(matches!(
            case.as_ref(),
            Expression::DeclarationReference(r) if r.identifier == "NORTH"
        ));
    }

    #[test]
    fn all_return_switch_converts_to_expression() {
        let return_of = |value: i64| {
            Statement::Return(ReturnStatement {
                expression: Some(Expression::IntegerLiteral {
                    value,
                    radix: crate::ast::Radix::Decimal,
                    origin: Provenance::default(),
                }),
                label: None,
                origin: Provenance::default(),
            })
        };
        let statement = SwitchStatement {
            expression: Expression::typed_reference("k", "Int"),
            converts_to_expression: None,
            cases: vec![
                SwitchCase {
                    expressions: vec![Expression::IntegerLiteral {
                        value: 1,
                        radix: crate::ast::Radix::Decimal,
                        origin: Provenance::default(),
                    }],
                    statements: vec![return_of(10)],
                },
                SwitchCase {
                    expressions: Vec::new(),
                    statements: vec![return_of(0)],
                },
            ],
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let result = run_switch(&mut SwitchesToExpressions, &context, statement);
        let Statement::Switch(statement) = &result[0] else {
            panic!("expected switch");
        };
        assert!(matches!(
            statement.converts_to_expression.as_deref(),
            Some(Statement::Return(_))
        ));
        assert!(statement.cases.iter().all(|case| matches!(
            case.statements.last(),
            Some(Statement::Expression { .. })
        )));
    }

    #[test]
    fn variable_plus_assigning_switch_merges() {
        let assignment_of = |value: i64| {
            Statement::Assignment(AssignmentStatement {
                left: Expression::reference("r"),
                right: Expression::IntegerLiteral {
                    value,
                    radix: crate::ast::Radix::Decimal,
                    origin: Provenance::default(),
                },
                origin: Provenance::default(),
            })
        };
        let variable = Statement::Variable(VariableDeclaration {
            is_let: false,
            ..VariableDeclaration::binding(
                "r",
                "Int",
                Expression::IntegerLiteral {
                    value: 0,
                    radix: crate::ast::Radix::Decimal,
                    origin: Provenance::default(),
                },
            )
        });
        let switch = Statement::Switch(SwitchStatement {
            expression: Expression::typed_reference("k", "Int"),
            converts_to_expression: None,
            cases: vec![
                SwitchCase {
                    expressions: vec![Expression::IntegerLiteral {
                        value: 1,
                        radix: crate::ast::Radix::Decimal,
                        origin: Provenance::default(),
                    }],
                    statements: vec![assignment_of(10)],
                },
                SwitchCase {
                    expressions: Vec::new(),
                    statements: vec![assignment_of(0)],
                },
            ],
            origin: Provenance::default(),
        });
        let context = TranspilationContext::default();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        let result =
            SwitchesToExpressions.replace_statements(&mut t, vec![variable, switch]);
        assert_eq!(result.len(), 1, "merged into one statement: {result:?}");
        let Statement::Switch(statement) = &result[0] else {
            panic!("expected switch");
        };
        let Some(Statement::Variable(variable)) =
            statement.converts_to_expression.as_deref()
        else {
            panic!("expected variable conversion");
        };
        assert_eq!(variable.identifier, "r");
        assert!(variable.is_let);
        assert!(variable.expression.is_none());
    }

    #[test]
    fn break_only_cases_empty_out() {
        let statement = SwitchStatement {
            expression: Expression::typed_reference("k", "Int"),
            converts_to_expression: None,
            cases: vec![SwitchCase {
                expressions: Vec::new(),
                statements: vec![Statement::Break {
                    origin: Provenance::default(),
                }],
            }],
            origin: Provenance::default(),
        };
        let context = TranspilationContext::default();
        let result = run_switch(&mut RemoveBreaksInSwitches, &context, statement);
        let Statement::Switch(statement) = &result[0] else {
            panic!("expected switch");
        };
        assert!(statement.cases[0].statements.is_empty());
    }

    #[test]
    fn upper_snake_case_handles_camel_humps() {
        assert_eq!(upper_snake_case("north"), "NORTH");
        assert_eq!(upper_snake_case("northWest"), "NORTH_WEST");
        assert_eq!(upper_snake_case("a"), "A");
    }
}
