// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the transpiler core.
//!
//! 1. **Position advance is a monoid action** — advancing by `s` then `t`
//!    equals advancing by `s + t`.
//! 2. **Translation length law** — the resolved text length equals the sum
//!    of leaf lengths.
//! 3. **Implicit raw values** — unspecified integer raw values count up from
//!    0, and explicit values reset the sequence.
//! 4. **Matcher completeness** — a successful binding consumes every
//!    argument exactly once.
//! 5. **Pipeline determinism** — rewriting the same statements twice gives
//!    byte-identical output.

use proptest::prelude::*;

use crate::ast::{EnumElement, Expression, Provenance, Radix, Statement, VariableDeclaration};
use crate::context::Configuration;
use crate::driver::{NullTypeOracle, TranspilationUnit, transpile};
use crate::matcher::match_arguments;
use crate::source_range::{SourcePosition, SourceRange};
use crate::translation::Translation;

// ============================================================================
// Generators
// ============================================================================

fn arbitrary_position() -> impl Strategy<Value = SourcePosition> {
    (1u32..500, 1u32..200).prop_map(|(line, column)| SourcePosition::new(line, column))
}

fn arbitrary_leaf() -> impl Strategy<Value = (String, Option<SourceRange>)> {
    (
        "[a-z \\n]{0,12}",
        prop::option::of((1u32..50, 1u32..50).prop_map(|(line, column)| {
            SourceRange::new(line, column, line, column + 1)
        })),
    )
}

fn arbitrary_translation() -> impl Strategy<Value = Translation> {
    prop::collection::vec(arbitrary_leaf(), 0..8).prop_map(|leaves| {
        let mut translation = Translation::new();
        for (text, range) in leaves {
            match range {
                Some(range) => {
                    let mut child = Translation::with_range(Some(range));
                    child.append(text);
                    translation.append_translation(child);
                }
                None => translation.append(text),
            }
        }
        translation
    })
}

fn arbitrary_raw_value_spec() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(0i64..100), 1..10)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property 1: `p.advance(s).advance(t) == p.advance(s + t)`.
    #[test]
    fn position_advance_composes(
        position in arbitrary_position(),
        s in "[a-z\\n]{0,20}",
        u in "[a-z\\n]{0,20}",
    ) {
        let stepwise = position.advanced_by(&s).advanced_by(&u);
        let joined = position.advanced_by(&format!("{s}{u}"));
        prop_assert_eq!(stepwise, joined);
    }

    /// Property 2: resolved text length equals the sum of leaf lengths.
    #[test]
    fn translation_length_law(translation in arbitrary_translation()) {
        let (text, _) = translation.resolve();
        prop_assert_eq!(text.chars().count(), translation.length());
    }

    /// Property 2b: the line map has one entry per ranged node.
    #[test]
    fn translation_line_map_entry_count(leaves in prop::collection::vec(arbitrary_leaf(), 0..8)) {
        let ranged = leaves.iter().filter(|(_, range)| range.is_some()).count();
        let mut translation = Translation::new();
        for (text, range) in leaves {
            match range {
                Some(range) => {
                    let mut child = Translation::with_range(Some(range));
                    child.append(text);
                    translation.append_translation(child);
                }
                None => translation.append(text),
            }
        }
        let (_, line_map) = translation.resolve();
        prop_assert_eq!(line_map.lines().count(), ranged);
    }

    /// Property 3: implicit integer raw values are `[0, 1, 2, …]` except
    /// where an explicit value resets the sequence.
    #[test]
    fn implicit_raw_values_sequence(spec in arbitrary_raw_value_spec()) {
        let elements: Vec<EnumElement> = spec
            .iter()
            .enumerate()
            .map(|(index, value)| EnumElement {
                name: format!("case{index}").into(),
                associated_values: Vec::new(),
                raw_value: value.map(|value| Expression::IntegerLiteral {
                    value,
                    radix: Radix::Decimal,
                    origin: Provenance::default(),
                }),
                annotations: Vec::new(),
            })
            .collect();
        let declaration = crate::ast::EnumDeclaration {
            name: "Generated".into(),
            access: None,
            annotations: Vec::new(),
            inherits: vec!["Int".into()],
            elements,
            members: Vec::new(),
            raw_value_type: None,
            origin: Provenance::default(),
        };
        let mut unit =
            TranspilationUnit::new("generated.swift", vec![Statement::Enum(declaration)]);
        crate::passes::recording::fill_implicit_raw_values(&mut unit);

        let Statement::Enum(filled) = &unit.declarations[0] else {
            panic!("expected enum");
        };
        let mut expected_previous = -1i64;
        for (element, value) in filled.elements.iter().zip(spec.iter()) {
            let Some(Expression::IntegerLiteral { value: actual, .. }) = element.raw_value else {
                panic!("raw value must be filled");
            };
            match value {
                Some(explicit) => {
                    prop_assert_eq!(actual, *explicit);
                    expected_previous = *explicit;
                }
                None => {
                    prop_assert_eq!(actual, expected_previous + 1);
                    expected_previous += 1;
                }
            }
        }
    }

    /// Property 4: a successful match consumes every argument exactly once.
    #[test]
    fn matcher_consumes_each_argument_once(
        labels in prop::collection::vec(prop::option::of("[a-c]"), 0..5),
    ) {
        use crate::ast::{FunctionParameter, LabeledExpression};
        // Parameters mirror the argument labels exactly, so a match must
        // succeed and be a bijection.
        let parameters: Vec<FunctionParameter> = labels
            .iter()
            .enumerate()
            .map(|(index, label)| FunctionParameter {
                label: format!("p{index}").into(),
                api_label: label.clone().map(Into::into),
                type_name: "Int".into(),
                value: None,
                is_variadic: false,
            })
            .collect();
        let arguments: Vec<LabeledExpression> = labels
            .iter()
            .map(|label| LabeledExpression {
                label: label.clone().map(Into::into),
                expression: Expression::reference("x"),
            })
            .collect();
        let matched = match_arguments(&parameters, &arguments);
        prop_assert!(matched.is_ok(), "mirror-shaped call must bind: {matched:?}");
        let mut seen: Vec<usize> = matched
            .unwrap()
            .bindings
            .into_iter()
            .flatten()
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..arguments.len()).collect();
        prop_assert_eq!(seen, expected);
    }

    /// Property 5: the pipeline is deterministic over simple inputs.
    #[test]
    fn pipeline_is_deterministic(values in prop::collection::vec(0i64..1000, 0..5)) {
        let statements: Vec<Statement> = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Statement::Variable(VariableDeclaration::binding(
                    format!("v{index}"),
                    "Int",
                    Expression::IntegerLiteral {
                        value: *value,
                        radix: Radix::Decimal,
                        origin: Provenance::default(),
                    },
                ))
            })
            .collect();
        let unit = || TranspilationUnit {
            source_path: "prop.swift".into(),
            output_path: None,
            declarations: Vec::new(),
            statements: statements.clone(),
        };
        let first = transpile(vec![unit()], Configuration::default(), &NullTypeOracle);
        let second = transpile(vec![unit()], Configuration::default(), &NullTypeOracle);
        prop_assert_eq!(first, second);
    }
}
