// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression-level rewrites: receivers, optionals, operators, collection
//! initializers, tuples, and string escapes.

use crate::ast::{
    CallExpression, ClosureExpression, DeclarationReference, Expression, FunctionDeclaration,
    LabeledExpression, Provenance, Statement, TupleExpression, VariableDeclaration,
};
use crate::pass::{Ancestor, RewritePass, Traversal, walk_call, walk_tuple};
use crate::type_strings::{is_optional, split_generic_args};
use ecow::{EcoString, eco_format};

// ── self → this ──────────────────────────────────────────────────────────────

/// Renames the implicit receiver. The metatype member `.self` (as in
/// `List<T>.self`) is not a receiver and stays for the cast pass to consume.
#[derive(Default)]
pub struct SelfToThis;

impl RewritePass for SelfToThis {
    fn name(&self) -> &'static str {
        "self-to-this"
    }

    fn process_declaration_reference(
        &mut self,
        _t: &mut Traversal<'_>,
        mut reference: DeclarationReference,
    ) -> DeclarationReference {
        if reference.identifier == "self" {
            reference.identifier = "this".into();
        }
        reference
    }

    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        let left = t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, left));
        let right = match right {
            Expression::DeclarationReference(reference) if reference.identifier == "self" => {
                Expression::DeclarationReference(reference)
            }
            other => t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, other)),
        };
        Expression::Dot {
            left: Box::new(left),
            right: Box::new(right),
            origin,
        }
    }
}

// ── Implicit null in optionals ───────────────────────────────────────────────

/// Optional stored variables without an initializer or accessors receive an
/// explicit `null`.
#[derive(Default)]
pub struct ImplicitNullInOptionals;

impl RewritePass for ImplicitNullInOptionals {
    fn name(&self) -> &'static str {
        "implicit-null-in-optionals"
    }

    fn process_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: VariableDeclaration,
    ) -> VariableDeclaration {
        let mut declaration = crate::pass::walk_variable_declaration(self, t, declaration);
        if is_optional(&declaration.type_name)
            && declaration.expression.is_none()
            && declaration.getter.is_none()
            && declaration.setter.is_none()
        {
            declaration.expression = Some(Expression::NilLiteral {
                origin: Provenance::default(),
            });
        }
        declaration
    }
}

// ── $0 → it ──────────────────────────────────────────────────────────────────

/// The anonymous closure parameter becomes Kotlin's `it`.
#[derive(Default)]
pub struct AnonymousParameterRename;

impl RewritePass for AnonymousParameterRename {
    fn name(&self) -> &'static str {
        "anonymous-parameter-rename"
    }

    fn process_declaration_reference(
        &mut self,
        _t: &mut Traversal<'_>,
        mut reference: DeclarationReference,
    ) -> DeclarationReference {
        if reference.identifier == "$0" {
            reference.identifier = "it".into();
        }
        reference
    }
}

// ── Covariant initializer calls to casts ─────────────────────────────────────

/// `MutableList<T>(seq)` becomes `seq.toMutableList<T>()`; `xs.as(List<T>.self)`
/// and `xs.forceCast(List<T>.self)` become `xs.cast[Mutable][OrNull]<T>()`.
#[derive(Default)]
pub struct CovariantInitAsCast;

const COLLECTION_BASES: &[&str] = &["MutableList", "List", "MutableMap", "Map"];

fn collection_base(name: &str) -> Option<(&'static str, EcoString)> {
    let (base, generics) = match split_generic_args(name) {
        Some((base, arguments)) => (base, eco_format!("<{}>", arguments.join(", "))),
        None => (name.into(), EcoString::new()),
    };
    COLLECTION_BASES
        .iter()
        .copied()
        .find(|candidate| *candidate == base.as_str())
        .map(|candidate| (candidate, generics))
}

fn reference_name(expression: &Expression) -> Option<&EcoString> {
    match expression {
        Expression::DeclarationReference(reference) => Some(&reference.identifier),
        Expression::TypeReference { type_name, .. } => Some(type_name),
        _ => None,
    }
}

impl RewritePass for CovariantInitAsCast {
    fn name(&self) -> &'static str {
        "covariant-init-as-cast"
    }

    fn replace_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> Expression {
        let call = walk_call(self, t, call);

        // MutableList<T>(seq) → seq.toMutableList<T>()
        let converted = reference_name(&call.function)
            .and_then(|name| collection_base(name))
            .filter(|_| {
                call.arguments.pairs.len() == 1
                    && call.arguments.pairs[0].label.is_none()
                    && !matches!(call.arguments.pairs[0].expression, Expression::Closure(_))
            });
        if let Some((base, generics)) = converted {
            let sequence = call.arguments.pairs.into_iter().next().map(|p| p.expression);
            let Some(sequence) = sequence else {
                unreachable!("filtered on exactly one argument");
            };
            return Expression::Dot {
                left: Box::new(sequence),
                right: Box::new(Expression::Call(CallExpression {
                    function: Box::new(Expression::reference(eco_format!("to{base}{generics}"))),
                    arguments: TupleExpression::default(),
                    type_name: call.type_name,
                    allows_trailing_closure: false,
                    is_pure: false,
                    origin: Provenance::default(),
                })),
                origin: call.origin,
            };
        }
        Expression::Call(call)
    }

    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        // xs.as(List<T>.self) / xs.forceCast(List<T>.self)
        if let Expression::Call(call) = &right {
            let method = reference_name(&call.function).map(EcoString::as_str);
            if let Some(method @ ("as" | "forceCast")) = method {
                let target = call.arguments.pairs.first().and_then(|pair| {
                    let Expression::Dot { left, right, .. } = &pair.expression else {
                        return None;
                    };
                    let is_self = matches!(
                        right.as_ref(),
                        Expression::DeclarationReference(r) if r.identifier == "self"
                    );
                    if !is_self {
                        return None;
                    }
                    reference_name(left).and_then(|name| collection_base(name))
                });
                if let Some((base, generics)) = target {
                    let mutable = if base.starts_with("Mutable") { "Mutable" } else { "" };
                    let or_null = if method == "as" { "OrNull" } else { "" };
                    let cast_name = eco_format!("cast{mutable}{or_null}{generics}");
                    let receiver = t.with_ancestor(Ancestor::Dot, |t| {
                        self.replace_expression(t, left)
                    });
                    return Expression::Dot {
                        left: Box::new(receiver),
                        right: Box::new(Expression::Call(CallExpression {
                            function: Box::new(Expression::reference(cast_name)),
                            arguments: TupleExpression::default(),
                            type_name: call.type_name.clone(),
                            allows_trailing_closure: false,
                            is_pure: false,
                            origin: Provenance::default(),
                        })),
                        origin,
                    };
                }
            }
        }
        t.with_ancestor(Ancestor::Dot, |t| Expression::Dot {
            left: Box::new(self.replace_expression(t, left)),
            right: Box::new(self.replace_expression(t, right)),
            origin,
        })
    }
}

// ── Optional function calls ──────────────────────────────────────────────────

/// `f?()` becomes `f?.invoke()`.
#[derive(Default)]
pub struct OptionalFunctionCalls;

impl RewritePass for OptionalFunctionCalls {
    fn name(&self) -> &'static str {
        "optional-function-calls"
    }

    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        let mut call = walk_call(self, t, call);
        if matches!(call.function.as_ref(), Expression::OptionalChain { .. }) {
            let chained = std::mem::replace(
                call.function.as_mut(),
                Expression::NilLiteral {
                    origin: Provenance::default(),
                },
            );
            call.function = Box::new(Expression::Dot {
                left: Box::new(chained),
                right: Box::new(Expression::reference("invoke")),
                origin: Provenance::default(),
            });
        }
        call
    }
}

// ── Data-structure initializers ──────────────────────────────────────────────

/// Empty collection constructors become the Kotlin factory functions:
/// `MutableList<T>()` → `mutableListOf<T>()`, and likewise for `List`,
/// `MutableMap`, and `Map`.
#[derive(Default)]
pub struct DataStructureInitializers;

impl RewritePass for DataStructureInitializers {
    fn name(&self) -> &'static str {
        "data-structure-initializers"
    }

    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        let mut call = walk_call(self, t, call);
        if !call.arguments.pairs.is_empty() {
            return call;
        }
        let Some((base, generics)) =
            reference_name(&call.function).and_then(|name| collection_base(name))
        else {
            return call;
        };
        let factory = match base {
            "MutableList" => "mutableListOf",
            "List" => "listOf",
            "MutableMap" => "mutableMapOf",
            "Map" => "mapOf",
            _ => return call,
        };
        call.function = Box::new(Expression::reference(eco_format!("{factory}{generics}")));
        call
    }
}

// ── Tuples to pairs ──────────────────────────────────────────────────────────

/// 2-tuples outside call arguments and for-each bindings become
/// `Pair(a, b)`; `.0`/`.1` member accesses become `.first`/`.second`, or
/// `.key`/`.value` for dictionary-entry tuples.
#[derive(Default)]
pub struct TuplesToPairs;

fn is_key_value_tuple(type_name: Option<&EcoString>) -> bool {
    type_name.is_some_and(|t| {
        let t = t.trim();
        t.starts_with('(') && t.contains("key:") && t.contains("value:")
    })
}

impl RewritePass for TuplesToPairs {
    fn name(&self) -> &'static str {
        "tuples-to-pairs"
    }

    fn replace_tuple(&mut self, t: &mut Traversal<'_>, tuple: TupleExpression) -> Expression {
        let in_for_each_binding = t.parent() == Some(&Ancestor::ForEachVariable);
        let tuple = walk_tuple(self, t, tuple);
        if tuple.pairs.len() == 2 && !in_for_each_binding {
            let origin = tuple.origin.clone();
            return Expression::Call(CallExpression {
                function: Box::new(Expression::reference("Pair")),
                arguments: TupleExpression {
                    pairs: tuple
                        .pairs
                        .into_iter()
                        .map(|pair| LabeledExpression {
                            label: None,
                            expression: pair.expression,
                        })
                        .collect(),
                    origin: Provenance::default(),
                },
                type_name: None,
                allows_trailing_closure: false,
                is_pure: true,
                origin,
            });
        }
        Expression::Tuple(tuple)
    }

    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        let left = t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, left));
        let right = t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, right));
        let member = match &right {
            Expression::DeclarationReference(reference) => match reference.identifier.as_str() {
                "0" => Some(0),
                "1" => Some(1),
                _ => None,
            },
            _ => None,
        };
        if let Some(index) = member {
            let key_value = is_key_value_tuple(left.type_name().as_ref());
            let name = match (key_value, index) {
                (true, 0) => "key",
                (true, _) => "value",
                (false, 0) => "first",
                (false, _) => "second",
            };
            return Expression::Dot {
                left: Box::new(left),
                right: Box::new(Expression::reference(name)),
                origin,
            };
        }
        Expression::Dot {
            left: Box::new(left),
            right: Box::new(right),
            origin,
        }
    }
}

// ── Autoclosures ─────────────────────────────────────────────────────────────

/// Arguments to `@autoclosure` parameters are wrapped in zero-parameter
/// closures at the call site.
#[derive(Default)]
pub struct Autoclosures;

impl RewritePass for Autoclosures {
    fn name(&self) -> &'static str {
        "autoclosures"
    }

    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        let mut call = walk_call(self, t, call);
        let translation = reference_name(&call.function).and_then(|name| {
            let type_name = call.function.type_name()?;
            t.context.get_function_translation(name, &type_name).cloned()
        });
        let Some(translation) = translation else {
            return call;
        };
        for (parameter, argument) in translation
            .parameters
            .iter()
            .zip(call.arguments.pairs.iter_mut())
        {
            if !parameter.type_name.contains("@autoclosure") {
                continue;
            }
            if matches!(argument.expression, Expression::Closure(_)) {
                continue;
            }
            let body = std::mem::replace(
                &mut argument.expression,
                Expression::NilLiteral {
                    origin: Provenance::default(),
                },
            );
            let result_type = body.type_name().unwrap_or_default();
            argument.expression = Expression::Closure(ClosureExpression {
                parameters: Vec::new(),
                statements: vec![Statement::Expression {
                    expression: body,
                    origin: Provenance::default(),
                }],
                type_name: eco_format!("() -> {result_type}"),
                is_trailing: false,
                origin: Provenance::default(),
            });
        }
        call
    }
}

// ── Optional subscripts ──────────────────────────────────────────────────────

/// `opt?[i]` becomes `opt?.get(i)`.
#[derive(Default)]
pub struct OptionalSubscriptRefactor;

impl RewritePass for OptionalSubscriptRefactor {
    fn name(&self) -> &'static str {
        "optional-subscript-refactor"
    }

    fn replace_subscript(
        &mut self,
        t: &mut Traversal<'_>,
        subscripted: Expression,
        indices: Vec<LabeledExpression>,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        let subscripted = t.with_ancestor(Ancestor::Subscript, |t| {
            self.replace_expression(t, subscripted)
        });
        let indices: Vec<LabeledExpression> = t.with_ancestor(Ancestor::Subscript, |t| {
            indices
                .into_iter()
                .map(|pair| LabeledExpression {
                    label: pair.label,
                    expression: self.replace_expression(t, pair.expression),
                })
                .collect()
        });
        if matches!(subscripted, Expression::OptionalChain { .. }) {
            return Expression::Dot {
                left: Box::new(subscripted),
                right: Box::new(Expression::Call(CallExpression {
                    function: Box::new(Expression::reference("get")),
                    arguments: TupleExpression {
                        pairs: indices,
                        origin: Provenance::default(),
                    },
                    type_name: type_name.clone(),
                    allows_trailing_closure: false,
                    is_pure: false,
                    origin: Provenance::default(),
                })),
                origin,
            };
        }
        Expression::Subscript {
            subscripted: Box::new(subscripted),
            indices,
            type_name,
            origin,
        }
    }
}

// ── Optionals in dot chains ──────────────────────────────────────────────────

/// Within a dot chain, a receiver whose earlier links contain an optional
/// chain must itself be optional-chained: `a?.b.c` becomes `a?.b?.c`.
#[derive(Default)]
pub struct AddOptionalsInDotChains;

fn contains_optional_chain(expression: &Expression) -> bool {
    match expression {
        Expression::OptionalChain { .. } => true,
        Expression::Dot { left, right, .. } => {
            contains_optional_chain(left) || contains_optional_chain(right)
        }
        Expression::Call(call) => contains_optional_chain(&call.function),
        Expression::Subscript { subscripted, .. } => contains_optional_chain(subscripted),
        Expression::Parentheses { expression, .. } => contains_optional_chain(expression),
        _ => false,
    }
}

impl RewritePass for AddOptionalsInDotChains {
    fn name(&self) -> &'static str {
        "add-optionals-in-dot-chains"
    }

    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        let left = t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, left));
        let right = t.with_ancestor(Ancestor::Dot, |t| self.replace_expression(t, right));
        let left = if contains_optional_chain(&left)
            && !matches!(left, Expression::OptionalChain { .. })
        {
            Expression::OptionalChain {
                expression: Box::new(left),
                origin: Provenance::default(),
            }
        } else {
            left
        };
        Expression::Dot {
            left: Box::new(left),
            right: Box::new(right),
            origin,
        }
    }
}

// ── Operator renames ─────────────────────────────────────────────────────────

/// Operator spellings with a different Kotlin name.
#[derive(Default)]
pub struct RenameOperators;

fn renamed_operator(operator: &str) -> Option<&'static str> {
    Some(match operator {
        "??" => "?:",
        "<<" => "shl",
        ">>" => "shr",
        "&" => "and",
        "|" => "or",
        "^" => "xor",
        "__derived_enum_equals" => "==",
        _ => return None,
    })
}

impl RewritePass for RenameOperators {
    fn name(&self) -> &'static str {
        "rename-operators"
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
        let operator: EcoString = match renamed_operator(&operator) {
            Some(renamed) => renamed.into(),
            None => operator,
        };
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

// ── Optionals in conditional casts ───────────────────────────────────────────

/// `opt as? T` drops a redundant outer optional chain on the left.
#[derive(Default)]
pub struct OptionalsInConditionalCasts;

impl RewritePass for OptionalsInConditionalCasts {
    fn name(&self) -> &'static str {
        "optionals-in-conditional-casts"
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
        let left = if operator == "as?" {
            match left {
                Expression::OptionalChain { expression, .. } => *expression,
                Expression::Parentheses { expression, .. }
                    if matches!(*expression, Expression::OptionalChain { .. }) =>
                {
                    match *expression {
                        Expression::OptionalChain { expression, .. } => *expression,
                        other => other,
                    }
                }
                other => other,
            }
        } else {
            left
        };
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

// ── Inner type prefixes ──────────────────────────────────────────────────────

/// Inside a type `A`, references to `A.B` shorten to `B`; nested scopes
/// shorten through every enclosing level.
#[derive(Default)]
pub struct InnerTypePrefixes;

fn strip_enclosing_prefix(type_name: &EcoString, t: &Traversal<'_>) -> EcoString {
    let mut shortened = type_name.clone();
    // Outermost scope first: inside A.B, `A.B.C` strips `A.` then `B.`.
    for scope in t.ancestors().iter().filter_map(Ancestor::type_name) {
        let prefix = eco_format!("{scope}.");
        if let Some(rest) = shortened.strip_prefix(prefix.as_str()) {
            shortened = rest.into();
        }
    }
    shortened
}

impl RewritePass for InnerTypePrefixes {
    fn name(&self) -> &'static str {
        "inner-type-prefixes"
    }

    fn replace_type_reference(
        &mut self,
        t: &mut Traversal<'_>,
        type_name: EcoString,
        origin: Provenance,
    ) -> Expression {
        Expression::TypeReference {
            type_name: strip_enclosing_prefix(&type_name, t),
            origin,
        }
    }

    fn process_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: VariableDeclaration,
    ) -> VariableDeclaration {
        let mut declaration = crate::pass::walk_variable_declaration(self, t, declaration);
        declaration.type_name = strip_enclosing_prefix(&declaration.type_name, t);
        declaration
    }

    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        let mut declaration = crate::pass::walk_function_declaration(self, t, declaration);
        declaration.return_type = strip_enclosing_prefix(&declaration.return_type, t);
        for parameter in &mut declaration.parameters {
            parameter.type_name = strip_enclosing_prefix(&parameter.type_name, t);
        }
        declaration
    }
}

// ── String escapes ───────────────────────────────────────────────────────────

/// Escapes `$` in string literals (Kotlin interpolation marker) and `'` in
/// character literals.
#[derive(Default)]
pub struct EscapeStrings;

impl RewritePass for EscapeStrings {
    fn name(&self) -> &'static str {
        "escape-strings"
    }

    fn replace_string_literal(
        &mut self,
        _t: &mut Traversal<'_>,
        value: EcoString,
        is_multiline: bool,
        origin: Provenance,
    ) -> Expression {
        let value = if value.contains('$') {
            value.replace("$", "\\$").into()
        } else {
            value
        };
        Expression::StringLiteral {
            value,
            is_multiline,
            origin,
        }
    }

    fn replace_character_literal(
        &mut self,
        _t: &mut Traversal<'_>,
        value: EcoString,
        origin: Provenance,
    ) -> Expression {
        let value = if value.contains('\'') {
            value.replace("'", "\\'").into()
        } else {
            value
        };
        Expression::CharacterLiteral { value, origin }
    }
}
