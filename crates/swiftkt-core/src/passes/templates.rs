// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Template replacement.
//!
//! The first semantic-rewrite pass: registered source patterns are matched
//! against every expression and substituted with their Kotlin snippets, so no
//! later pass sees source-only forms.
//!
//! Matching is exact-match-with-holes: a hole is a declaration reference in
//! the pattern whose identifier starts with `_`, and it binds any expression
//! (consistently — the same hole must bind equal expressions). Substitution
//! splices the bound expressions between literal-code fragments with
//! [`Expression::Concatenation`], so hole provenance survives into the
//! line-map.

use crate::ast::{Expression, Provenance};
use crate::context::TemplateRule;
use crate::pass::{RewritePass, Traversal, walk_expression};
use ecow::EcoString;
use std::collections::HashMap;

/// Replaces registered template patterns in expressions.
#[derive(Default)]
pub struct ReplaceTemplates;

impl RewritePass for ReplaceTemplates {
    fn name(&self) -> &'static str {
        "replace-templates"
    }

    fn replace_expression(&mut self, t: &mut Traversal<'_>, expression: Expression) -> Expression {
        for rule in t.context.templates() {
            if let Some(bindings) = match_pattern(&rule.pattern, &expression) {
                let origin = expression.origin().clone();
                let type_name = expression.type_name();
                return self.substitute(t, rule, &bindings, origin, type_name);
            }
        }
        walk_expression(self, t, expression)
    }
}

impl ReplaceTemplates {
    /// Builds the replacement: literal fragments of the snippet interleaved
    /// with the (recursively rewritten) hole bindings.
    fn substitute(
        &mut self,
        t: &mut Traversal<'_>,
        rule: &TemplateRule,
        bindings: &HashMap<EcoString, Expression>,
        origin: Provenance,
        type_name: Option<EcoString>,
    ) -> Expression {
        let mut pieces: Vec<Expression> = Vec::new();
        let mut rest = rule.replacement.as_str();
        while let Some((before, hole, after)) = next_hole(rest, bindings) {
            if !before.is_empty() {
                pieces.push(Expression::literal_code(before));
            }
            let bound = bindings
                .get(hole)
                .cloned()
                .unwrap_or(Expression::Error {
                    origin: Provenance::default(),
                });
            // Templates may apply inside a hole's binding too.
            pieces.push(self.replace_expression(t, bound));
            rest = after;
        }
        if !rest.is_empty() || pieces.is_empty() {
            pieces.push(Expression::LiteralCode {
                string: rest.into(),
                type_name: type_name.clone(),
                origin: Provenance::default(),
            });
        }

        let mut result = pieces
            .pop()
            .unwrap_or_else(|| Expression::literal_code(""));
        while let Some(piece) = pieces.pop() {
            result = Expression::Concatenation {
                left: Box::new(piece),
                right: Box::new(result),
                origin: Provenance::default(),
            };
        }
        attach_origin(result, origin)
    }
}

/// Finds the leftmost hole occurrence in `snippet`, returning
/// `(before, hole_name, after)`.
fn next_hole<'a>(
    snippet: &'a str,
    bindings: &HashMap<EcoString, Expression>,
) -> Option<(&'a str, &'a str, &'a str)> {
    let mut best: Option<(usize, usize)> = None;
    for hole in bindings.keys() {
        let mut search_from = 0;
        while let Some(found) = snippet[search_from..].find(hole.as_str()) {
            let index = search_from + found;
            let end = index + hole.len();
            let followed_by_word = snippet[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if !followed_by_word {
                if best.is_none_or(|(best_index, _)| index < best_index) {
                    best = Some((index, hole.len()));
                }
                break;
            }
            search_from = end;
        }
    }
    best.map(|(index, length)| {
        (
            &snippet[..index],
            &snippet[index..index + length],
            &snippet[index + length..],
        )
    })
}

fn attach_origin(expression: Expression, origin: Provenance) -> Expression {
    match expression {
        Expression::LiteralCode {
            string, type_name, ..
        } => Expression::LiteralCode {
            string,
            type_name,
            origin,
        },
        Expression::Concatenation { left, right, .. } => Expression::Concatenation {
            left,
            right,
            origin,
        },
        other => other,
    }
}

/// Structurally matches `expression` against `pattern`, binding holes.
///
/// Returns the hole bindings on success; a hole seen twice must bind equal
/// expressions.
pub fn match_pattern(
    pattern: &Expression,
    expression: &Expression,
) -> Option<HashMap<EcoString, Expression>> {
    let mut bindings = HashMap::new();
    if match_into(pattern, expression, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn match_into(
    pattern: &Expression,
    expression: &Expression,
    bindings: &mut HashMap<EcoString, Expression>,
) -> bool {
    if let Expression::DeclarationReference(reference) = pattern {
        if reference.identifier.starts_with('_') {
            return match bindings.get(&reference.identifier) {
                Some(existing) => existing == expression,
                None => {
                    bindings.insert(reference.identifier.clone(), expression.clone());
                    true
                }
            };
        }
    }

    match (pattern, expression) {
        (
            Expression::DeclarationReference(p),
            Expression::DeclarationReference(e),
        ) => p.identifier == e.identifier,
        (
            Expression::Dot {
                left: pl,
                right: pr,
                ..
            },
            Expression::Dot {
                left: el,
                right: er,
                ..
            },
        ) => match_into(pl, el, bindings) && match_into(pr, er, bindings),
        (Expression::Call(p), Expression::Call(e)) => {
            if p.arguments.pairs.len() != e.arguments.pairs.len() {
                return false;
            }
            if !match_into(&p.function, &e.function, bindings) {
                return false;
            }
            p.arguments
                .pairs
                .iter()
                .zip(e.arguments.pairs.iter())
                .all(|(pp, ep)| pp.label == ep.label && match_into(&pp.expression, &ep.expression, bindings))
        }
        (
            Expression::BinaryOperator {
                left: pl,
                right: pr,
                operator: po,
                ..
            },
            Expression::BinaryOperator {
                left: el,
                right: er,
                operator: eo,
                ..
            },
        ) => po == eo && match_into(pl, el, bindings) && match_into(pr, er, bindings),
        (
            Expression::PrefixUnary {
                operand: p,
                operator: po,
                ..
            },
            Expression::PrefixUnary {
                operand: e,
                operator: eo,
                ..
            },
        ) => po == eo && match_into(p, e, bindings),
        (
            Expression::Parentheses { expression: p, .. },
            Expression::Parentheses { expression: e, .. },
        )
        | (
            Expression::ForceUnwrap { expression: p, .. },
            Expression::ForceUnwrap { expression: e, .. },
        )
        | (
            Expression::OptionalChain { expression: p, .. },
            Expression::OptionalChain { expression: e, .. },
        ) => match_into(p, e, bindings),
        (
            Expression::Subscript {
                subscripted: ps,
                indices: pi,
                ..
            },
            Expression::Subscript {
                subscripted: es,
                indices: ei,
                ..
            },
        ) => {
            pi.len() == ei.len()
                && match_into(ps, es, bindings)
                && pi
                    .iter()
                    .zip(ei.iter())
                    .all(|(p, e)| p.label == e.label && match_into(&p.expression, &e.expression, bindings))
        }
        (Expression::TypeReference { type_name: p, .. }, Expression::TypeReference { type_name: e, .. }) => {
            p == e
        }
        // Literals and everything else: plain structural equality.
        (pattern, expression) => pattern == expression,
    }
}
