// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Conditional rewrites: if-let binding elimination, guard negation, and the
//! null-check-to-elvis shortcut.

use crate::ast::{
    Expression, IfCondition, IfStatement, Provenance, ReturnStatement, Statement,
    VariableDeclaration,
};
use crate::pass::{RewritePass, Traversal, walk_if_statement};
use crate::type_strings::is_optional;
use ecow::{EcoString, eco_format};
use std::collections::HashSet;

fn null_literal() -> Expression {
    Expression::NilLiteral {
        origin: Provenance::default(),
    }
}

fn not_null_check(identifier: &EcoString) -> Expression {
    Expression::BinaryOperator {
        left: Box::new(Expression::reference(identifier.clone())),
        right: Box::new(null_literal()),
        operator: "!=".into(),
        type_name: Some("Bool".into()),
        origin: Provenance::default(),
    }
}

// ── Shadowed if-let to is ────────────────────────────────────────────────────

/// `if let x = x as? T { … }` becomes `if (x is T) { … }`.
#[derive(Default)]
pub struct ShadowedIfLetAsIs;

impl RewritePass for ShadowedIfLetAsIs {
    fn name(&self) -> &'static str {
        "shadowed-if-let-as-is"
    }

    fn process_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        mut statement: IfStatement,
    ) -> IfStatement {
        for condition in &mut statement.conditions {
            let IfCondition::Declaration(declaration) = condition else {
                continue;
            };
            let Some(Expression::BinaryOperator {
                left,
                right,
                operator,
                ..
            }) = &declaration.expression
            else {
                continue;
            };
            let shadowed = operator == "as?"
                && matches!(
                    left.as_ref(),
                    Expression::DeclarationReference(reference)
                        if reference.identifier == declaration.identifier
                );
            if shadowed {
                *condition = IfCondition::Condition(Expression::BinaryOperator {
                    left: left.clone(),
                    right: right.clone(),
                    operator: "is".into(),
                    type_name: Some("Bool".into()),
                    origin: declaration.origin.clone(),
                });
            }
        }
        walk_if_statement(self, t, statement)
    }
}

// ── Side-effect warnings in if-lets ──────────────────────────────────────────

/// Conditions after the first are re-evaluated when the if-let chain is
/// rearranged; warn on any impure call inside them before that happens.
#[derive(Default)]
pub struct SideEffectWarningsInIfLets;

fn rightmost_function_name(expression: &Expression) -> Option<&EcoString> {
    match expression {
        Expression::DeclarationReference(reference) => Some(&reference.identifier),
        Expression::Dot { right, .. } => rightmost_function_name(right),
        _ => None,
    }
}

fn warn_on_impure_calls(expression: &Expression, t: &mut Traversal<'_>) {
    if let Expression::Call(call) = expression {
        let known_pure = call.is_pure
            || rightmost_function_name(&call.function)
                .is_some_and(|name| t.context.is_pure_function(name));
        if !known_pure {
            let name = rightmost_function_name(&call.function)
                .cloned()
                .unwrap_or_else(|| "a function".into());
            t.diagnostics.warn(
                eco_format!(
                    "call to `{name}` in a secondary if-let condition may have side effects; \
                     the rearranged conditions evaluate it unconditionally"
                ),
                expression.range(),
            );
        }
    }
    // Recurse into the places a call can hide.
    match expression {
        Expression::Call(call) => {
            warn_on_impure_calls(&call.function, t);
            for pair in &call.arguments.pairs {
                warn_on_impure_calls(&pair.expression, t);
            }
        }
        Expression::Dot { left, right, .. }
        | Expression::BinaryOperator { left, right, .. } => {
            warn_on_impure_calls(left, t);
            warn_on_impure_calls(right, t);
        }
        Expression::Parentheses { expression, .. }
        | Expression::ForceUnwrap { expression, .. }
        | Expression::OptionalChain { expression, .. } => warn_on_impure_calls(expression, t),
        Expression::PrefixUnary { operand, .. } | Expression::PostfixUnary { operand, .. } => {
            warn_on_impure_calls(operand, t);
        }
        Expression::Subscript { subscripted, .. } => warn_on_impure_calls(subscripted, t),
        _ => {}
    }
}

impl RewritePass for SideEffectWarningsInIfLets {
    fn name(&self) -> &'static str {
        "side-effect-warnings-in-if-lets"
    }

    fn process_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: IfStatement,
    ) -> IfStatement {
        for condition in statement.conditions.iter().skip(1) {
            let expression = match condition {
                IfCondition::Declaration(declaration) => declaration.expression.as_ref(),
                IfCondition::Condition(expression) => Some(expression),
            };
            if let Some(expression) = expression {
                warn_on_impure_calls(expression, t);
            }
        }
        walk_if_statement(self, t, statement)
    }
}

// ── Parenthesize || in multi-condition ifs ───────────────────────────────────

/// Conditions joined with `&&` in the output: any condition whose top
/// operator is `||` needs parentheses to keep its meaning.
#[derive(Default)]
pub struct ParenthesizeOrInIf;

impl RewritePass for ParenthesizeOrInIf {
    fn name(&self) -> &'static str {
        "parenthesize-or-in-if"
    }

    fn process_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        mut statement: IfStatement,
    ) -> IfStatement {
        if statement.conditions.len() > 1 {
            for condition in &mut statement.conditions {
                let IfCondition::Condition(expression) = condition else {
                    continue;
                };
                if matches!(expression, Expression::BinaryOperator { operator, .. } if operator == "||")
                {
                    let wrapped = Expression::Parentheses {
                        expression: Box::new(expression.clone()),
                        origin: expression.origin().clone(),
                    };
                    *condition = IfCondition::Condition(wrapped);
                }
            }
        }
        walk_if_statement(self, t, statement)
    }
}

// ── Rearrange if-lets ────────────────────────────────────────────────────────

/// Hoists if-let binding declarations to statements preceding the `if`,
/// deduplicating by identifier across the `else if` chain; each hoisted
/// condition becomes a `!= null` check, and later uses of a hoisted
/// identifier inside subsequent condition initializers become
/// optional-chained.
#[derive(Default)]
pub struct RearrangeIfLets;

/// Optional-chains any dot/subscript whose receiver is one of `names`.
fn mark_optional_uses(expression: &mut Expression, names: &HashSet<EcoString>) {
    let needs_chain = |candidate: &Expression| -> bool {
        matches!(
            candidate,
            Expression::DeclarationReference(reference) if names.contains(&reference.identifier)
        )
    };
    match expression {
        Expression::Dot { left, right, .. } => {
            if needs_chain(left) {
                let receiver = std::mem::replace(left.as_mut(), null_literal());
                *left = Box::new(Expression::OptionalChain {
                    expression: Box::new(receiver),
                    origin: Provenance::default(),
                });
            } else {
                mark_optional_uses(left, names);
            }
            mark_optional_uses(right, names);
        }
        Expression::Subscript { subscripted, .. } => {
            if needs_chain(subscripted) {
                let receiver = std::mem::replace(subscripted.as_mut(), null_literal());
                *subscripted = Box::new(Expression::OptionalChain {
                    expression: Box::new(receiver),
                    origin: Provenance::default(),
                });
            } else {
                mark_optional_uses(subscripted, names);
            }
        }
        Expression::Call(call) => {
            mark_optional_uses(&mut call.function, names);
            for pair in &mut call.arguments.pairs {
                mark_optional_uses(&mut pair.expression, names);
            }
        }
        Expression::Parentheses { expression, .. }
        | Expression::ForceUnwrap { expression, .. }
        | Expression::OptionalChain { expression, .. } => mark_optional_uses(expression, names),
        Expression::BinaryOperator { left, right, .. } => {
            mark_optional_uses(left, names);
            mark_optional_uses(right, names);
        }
        Expression::PrefixUnary { operand, .. } | Expression::PostfixUnary { operand, .. } => {
            mark_optional_uses(operand, names);
        }
        _ => {}
    }
}

fn hoist_chain(
    statement: &mut IfStatement,
    hoisted: &mut Vec<VariableDeclaration>,
    seen: &mut HashSet<EcoString>,
) {
    for condition in &mut statement.conditions {
        let IfCondition::Declaration(declaration) = condition else {
            continue;
        };
        let identifier = declaration.identifier.clone();

        // `if let x = x` shadows; the null check alone is enough.
        let self_shadowing = matches!(
            &declaration.expression,
            Some(Expression::DeclarationReference(reference))
                if reference.identifier == identifier
        );

        if !self_shadowing && !seen.contains(&identifier) {
            let mut binding = declaration.clone();
            if let Some(expression) = &mut binding.expression {
                mark_optional_uses(expression, seen);
            }
            if !is_optional(&binding.type_name) && !binding.type_name.is_empty() {
                binding.type_name = eco_format!("{}?", binding.type_name);
            }
            binding.is_let = true;
            hoisted.push(binding);
        }
        seen.insert(identifier.clone());
        *condition = IfCondition::Condition(not_null_check(&identifier));
    }
    if let Some(else_statement) = &mut statement.else_statement {
        hoist_chain(else_statement, hoisted, seen);
    }
}

impl RewritePass for RearrangeIfLets {
    fn name(&self) -> &'static str {
        "rearrange-if-lets"
    }

    fn replace_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        mut statement: IfStatement,
    ) -> Vec<Statement> {
        let mut hoisted = Vec::new();
        let mut seen = HashSet::new();
        hoist_chain(&mut statement, &mut hoisted, &mut seen);
        let statement = walk_if_statement(self, t, statement);

        let mut result: Vec<Statement> =
            hoisted.into_iter().map(Statement::Variable).collect();
        result.push(Statement::If(statement));
        result
    }
}

// ── Double negatives in guards ───────────────────────────────────────────────

/// Converts a single-condition `guard` into a plain `if` on the negated
/// condition, eliminating double negatives: `!x` drops its `!`, `!=` flips to
/// `==` and vice versa; anything else is wrapped in `!(…)`.
#[derive(Default)]
pub struct DoubleNegativesInGuards;

fn negate(expression: Expression) -> Expression {
    match expression {
        Expression::PrefixUnary {
            operand, operator, ..
        } if operator == "!" => *operand,
        Expression::BinaryOperator {
            left,
            right,
            operator,
            type_name,
            origin,
        } if operator == "==" || operator == "!=" => Expression::BinaryOperator {
            left,
            right,
            operator: if operator == "==" { "!=".into() } else { "==".into() },
            type_name,
            origin,
        },
        other => {
            let origin = other.origin().clone();
            Expression::PrefixUnary {
                operand: Box::new(Expression::Parentheses {
                    expression: Box::new(other),
                    origin: Provenance::default(),
                }),
                operator: "!".into(),
                type_name: Some("Bool".into()),
                origin,
            }
        }
    }
}

impl RewritePass for DoubleNegativesInGuards {
    fn name(&self) -> &'static str {
        "double-negatives-in-guards"
    }

    fn process_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        mut statement: IfStatement,
    ) -> IfStatement {
        if statement.is_guard && statement.conditions.len() == 1 {
            if let Some(IfCondition::Condition(expression)) = statement.conditions.pop() {
                statement
                    .conditions
                    .push(IfCondition::Condition(negate(expression)));
                statement.is_guard = false;
            }
        }
        walk_if_statement(self, t, statement)
    }
}

// ── if (x == null) { return } to elvis ───────────────────────────────────────

/// `if (x == null) { return … }` with no else becomes the statement
/// `x ?: return …`.
#[derive(Default)]
pub struct IfNullReturnToElvis;

impl RewritePass for IfNullReturnToElvis {
    fn name(&self) -> &'static str {
        "if-null-return-to-elvis"
    }

    fn replace_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: IfStatement,
    ) -> Vec<Statement> {
        let is_null_check = statement.conditions.len() == 1
            && matches!(
                &statement.conditions[0],
                IfCondition::Condition(Expression::BinaryOperator {
                    operator, right, ..
                }) if operator == "==" && matches!(right.as_ref(), Expression::NilLiteral { .. })
            );
        let body_is_return = matches!(statement.statements.as_slice(), [Statement::Return(_)]);

        if !(is_null_check
            && body_is_return
            && statement.else_statement.is_none()
            && !statement.is_guard)
        {
            return vec![Statement::If(self.process_if_statement(t, statement))];
        }

        let IfStatement {
            mut conditions,
            mut statements,
            origin,
            ..
        } = statement;
        let Some(IfCondition::Condition(Expression::BinaryOperator { left, .. })) =
            conditions.pop()
        else {
            unreachable!("checked above");
        };
        let Some(Statement::Return(ReturnStatement { expression, .. })) = statements.pop() else {
            unreachable!("checked above");
        };

        let elvis = Expression::BinaryOperator {
            left,
            right: Box::new(Expression::ReturnExpression {
                expression: expression.map(Box::new),
                origin: Provenance::default(),
            }),
            operator: "?:".into(),
            type_name: None,
            origin: origin.clone(),
        };
        vec![Statement::Expression {
            expression: elvis,
            origin,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TranspilationContext;
    use crate::diagnostics::Diagnostics;
    use crate::driver::NullTypeOracle;

    fn run_if<P: RewritePass>(pass: &mut P, statement: IfStatement) -> Vec<Statement> {
        let context = TranspilationContext::default();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        pass.replace_statements(&mut t, vec![Statement::If(statement)])
    }

    fn if_let(identifier: &str, expression: Expression) -> IfCondition {
        IfCondition::Declaration(VariableDeclaration {
            identifier: identifier.into(),
            type_name: "Int".into(),
            expression: Some(expression),
            getter: None,
            setter: None,
            access: None,
            is_open: false,
            is_let: true,
            is_static: false,
            extends_type: None,
            annotations: Vec::new(),
            origin: Provenance::default(),
        })
    }

    fn bare_call(function: Expression) -> Expression {
        Expression::Call(crate::ast::CallExpression {
            function: Box::new(function),
            arguments: crate::ast::TupleExpression::default(),
            type_name: None,
            allows_trailing_closure: false,
            is_pure: false,
            origin: Provenance::default(),
        })
    }

    fn empty_if(conditions: Vec<IfCondition>) -> IfStatement {
        IfStatement {
            conditions,
            statements: Vec::new(),
            else_statement: None,
            is_guard: false,
            origin: Provenance::default(),
        }
    }

    #[test]
    fn if_lets_hoist_before_the_if() {
        // if let x = foo(), let y = x.bar() { … }
        let statement = empty_if(vec![
            if_let("x", bare_call(Expression::reference("foo"))),
            if_let(
                "y",
                bare_call(Expression::Dot {
                    left: Box::new(Expression::reference("x")),
                    right: Box::new(Expression::reference("bar")),
                    origin: Provenance::default(),
                }),
            ),
        ]);
        let result = run_if(&mut RearrangeIfLets, statement);
        assert_eq!(result.len(), 3, "two hoisted bindings plus the if");
        let Statement::Variable(x) = &result[0] else {
            panic!("expected hoisted x");
        };
        assert_eq!(x.identifier, "x");
        assert_eq!(x.type_name, "Int?", "hoisted binding becomes optional");
        let Statement::Variable(y) = &result[1] else {
            panic!("expected hoisted y");
        };
        // x was hoisted before y, so x.bar() became x?.bar().
        let Some(Expression::Call(call)) = &y.expression else {
            panic!("expected call initializer");
        };
        let Expression::Dot { left, .. } = call.function.as_ref() else {
            panic!("expected dot function");
        };
        assert!(
            matches!(left.as_ref(), Expression::OptionalChain { .. }),
            "use of x should be optional-chained, got {left:?}"
        );
        let Statement::If(rewritten) = &result[2] else {
            panic!("expected if");
        };
        assert!(rewritten.conditions.iter().all(|condition| matches!(
            condition,
            IfCondition::Condition(Expression::BinaryOperator { operator, .. }) if operator == "!="
        )));
    }

    #[test]
    fn duplicate_identifiers_across_else_ifs_hoist_once() {
        let mut statement = empty_if(vec![if_let(
            "x",
            bare_call(Expression::reference("foo")),
        )]);
        statement.else_statement = Some(Box::new(empty_if(vec![if_let(
            "x",
            bare_call(Expression::reference("foo")),
        )])));
        let result = run_if(&mut RearrangeIfLets, statement);
        let hoisted = result
            .iter()
            .filter(|s| matches!(s, Statement::Variable(_)))
            .count();
        assert_eq!(hoisted, 1, "x deduplicates by identifier: {result:?}");
    }

    #[test]
    fn self_shadowing_if_let_needs_no_hoist() {
        let statement = empty_if(vec![if_let("x", Expression::reference("x"))]);
        let result = run_if(&mut RearrangeIfLets, statement);
        assert_eq!(result.len(), 1, "no hoisted binding: {result:?}");
        assert!(matches!(&result[0], Statement::If(_)));
    }

    #[test]
    fn shadowed_conditional_cast_becomes_is() {
        let cast = Expression::BinaryOperator {
            left: Box::new(Expression::reference("x")),
            right: Box::new(Expression::TypeReference {
                type_name: "Circle".into(),
                origin: Provenance::default(),
            }),
            operator: "as?".into(),
            type_name: None,
            origin: Provenance::default(),
        };
        let statement = empty_if(vec![if_let("x", cast)]);
        let result = run_if(&mut ShadowedIfLetAsIs, statement);
        let Statement::If(statement) = &result[0] else {
            panic!("expected if");
        };
        let IfCondition::Condition(Expression::BinaryOperator { operator, .. }) =
            &statement.conditions[0]
        else {
            panic!("expected binary condition, got {:?}", statement.conditions[0]);
        };
        assert_eq!(operator, "is");
    }

    #[test]
    fn impure_call_in_second_condition_warns() {
        let statement = empty_if(vec![
            if_let("x", bare_call(Expression::reference("pureOne"))),
            if_let("y", bare_call(Expression::reference("sideEffecting"))),
        ]);
        let context = TranspilationContext::default();
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        SideEffectWarningsInIfLets.replace_statements(&mut t, vec![Statement::If(statement)]);
        assert_eq!(diagnostics.warning_count(), 1, "{:?}", diagnostics.entries());
        assert!(diagnostics.entries()[0].message.contains("sideEffecting"));
    }

    #[test]
    fn pure_call_in_second_condition_is_silent() {
        let statement = empty_if(vec![
            if_let("x", bare_call(Expression::reference("first"))),
            if_let("y", bare_call(Expression::reference("area"))),
        ]);
        let mut context = TranspilationContext::default();
        context.record_pure_function("area");
        let oracle = NullTypeOracle;
        let mut diagnostics = Diagnostics::new();
        let mut t = Traversal::new(&context, &oracle, &mut diagnostics);
        SideEffectWarningsInIfLets.replace_statements(&mut t, vec![Statement::If(statement)]);
        assert_eq!(diagnostics.warning_count(), 0, "{:?}", diagnostics.entries());
    }

    #[test]
    fn or_conditions_get_parenthesized_when_joined() {
        let or = Expression::BinaryOperator {
            left: Box::new(Expression::reference("a")),
            right: Box::new(Expression::reference("b")),
            operator: "||".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let statement = empty_if(vec![
            IfCondition::Condition(or),
            IfCondition::Condition(Expression::reference("c")),
        ]);
        let result = run_if(&mut ParenthesizeOrInIf, statement);
        let Statement::If(statement) = &result[0] else {
            panic!("expected if");
        };
        assert!(
            matches!(
                &statement.conditions[0],
                IfCondition::Condition(Expression::Parentheses { .. })
            ),
            "|| should be parenthesized: {:?}",
            statement.conditions[0]
        );
    }

    #[test]
    fn single_or_condition_stays_bare() {
        let or = Expression::BinaryOperator {
            left: Box::new(Expression::reference("a")),
            right: Box::new(Expression::reference("b")),
            operator: "||".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let result = run_if(&mut ParenthesizeOrInIf, empty_if(vec![IfCondition::Condition(or)]));
        let Statement::If(statement) = &result[0] else {
            panic!("expected if");
        };
        assert!(matches!(
            &statement.conditions[0],
            IfCondition::Condition(Expression::BinaryOperator { .. })
        ));
    }

    #[test]
    fn guard_negation_eliminates_double_negatives() {
        let cases = [
            (
                Expression::PrefixUnary {
                    operand: Box::new(Expression::reference("x")),
                    operator: "!".into(),
                    type_name: Some("Bool".into()),
                    origin: Provenance::default(),
                },
                "x",
            ),
        ];
        for (condition, expected) in cases {
            let mut statement = empty_if(vec![IfCondition::Condition(condition)]);
            statement.is_guard = true;
            let result = run_if(&mut DoubleNegativesInGuards, statement);
            let Statement::If(statement) = &result[0] else {
                panic!("expected if");
            };
            assert!(!statement.is_guard, "guard flag cleared");
            let IfCondition::Condition(Expression::DeclarationReference(reference)) =
                &statement.conditions[0]
            else {
                panic!("expected bare reference, got {:?}", statement.conditions[0]);
            };
            assert_eq!(reference.identifier, expected);
        }
    }

    #[test]
    fn guard_inequality_flips_to_equality() {
        let condition = Expression::BinaryOperator {
            left: Box::new(Expression::reference("a")),
            right: Box::new(Expression::reference("b")),
            operator: "!=".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let mut statement = empty_if(vec![IfCondition::Condition(condition)]);
        statement.is_guard = true;
        let result = run_if(&mut DoubleNegativesInGuards, statement);
        let Statement::If(statement) = &result[0] else {
            panic!("expected if");
        };
        let IfCondition::Condition(Expression::BinaryOperator { operator, .. }) =
            &statement.conditions[0]
        else {
            panic!("expected binary condition");
        };
        assert_eq!(operator, "==");
        assert!(!statement.is_guard);
    }

    #[test]
    fn null_check_return_becomes_elvis() {
        let condition = Expression::BinaryOperator {
            left: Box::new(Expression::reference("x")),
            right: Box::new(null_literal()),
            operator: "==".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let mut statement = empty_if(vec![IfCondition::Condition(condition)]);
        statement.statements = vec![Statement::Return(ReturnStatement {
            expression: None,
            label: None,
            origin: Provenance::default(),
        })];
        let result = run_if(&mut IfNullReturnToElvis, statement);
        assert_eq!(result.len(), 1);
        let Statement::Expression {
            expression: Expression::BinaryOperator { operator, right, .. },
            ..
        } = &result[0]
        else {
            panic!("expected elvis expression statement, got {:?}", result[0]);
        };
        assert_eq!(operator, "?:");
        assert!(matches!(
            right.as_ref(),
            Expression::ReturnExpression { expression: None, .. }
        ));
    }

    #[test]
    fn null_check_with_else_is_untouched() {
        let condition = Expression::BinaryOperator {
            left: Box::new(Expression::reference("x")),
            right: Box::new(null_literal()),
            operator: "==".into(),
            type_name: Some("Bool".into()),
            origin: Provenance::default(),
        };
        let mut statement = empty_if(vec![IfCondition::Condition(condition)]);
        statement.statements = vec![Statement::Return(ReturnStatement {
            expression: None,
            label: None,
            origin: Provenance::default(),
        })];
        statement.else_statement = Some(Box::new(empty_if(Vec::new())));
        let result = run_if(&mut IfNullReturnToElvis, statement);
        assert!(matches!(&result[0], Statement::If(_)));
    }
}
