// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Call-argument matching.
//!
//! Swift call sites may elide labels, omit defaulted parameters, pass a
//! trailing closure, and bind variadic runs; Kotlin calls need the declared
//! parameter order and labels. This module replays the Swift compiler's
//! greedy forward scan: for each declared parameter in order it consumes zero
//! or more call arguments, and the whole match fails unless every argument is
//! consumed exactly once.
//!
//! On failure the calling pass strips all labels and emits a warning — the
//! pipeline never aborts on a match failure.

use crate::ast::{Expression, FunctionParameter, LabeledExpression};
use crate::type_strings::is_function_type;
use ecow::EcoString;
use thiserror::Error;

/// A successful binding: for each declared parameter, the indices of the call
/// arguments bound to it, in consumption order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMatch {
    /// Bound argument indices, parallel to the declared parameter list.
    pub bindings: Vec<Vec<usize>>,
}

/// Why a call could not be bound to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// A required parameter received no argument.
    #[error("no argument for parameter `{label}`")]
    MissingArgument {
        /// The unfilled parameter's implementation label.
        label: EcoString,
    },
    /// An argument was left over after all parameters were filled.
    #[error("argument {index} does not bind to any parameter")]
    UnconsumedArgument {
        /// The index of the first unconsumed argument.
        index: usize,
    },
    /// The call has a trailing closure but the declaration has no
    /// function-typed parameter to receive it.
    #[error("trailing closure does not bind to any parameter")]
    UnboundTrailingClosure,
}

/// True when the argument is an unlabeled trailing closure.
fn is_trailing_closure(argument: &LabeledExpression) -> bool {
    argument.label.is_none()
        && matches!(&argument.expression, Expression::Closure(closure) if closure.is_trailing)
}

/// The index of the last variadic parameter, if any. Parameters before it
/// lose their labels in the output (the target disallows labels there).
#[must_use]
pub fn last_variadic_index(parameters: &[FunctionParameter]) -> Option<usize> {
    parameters.iter().rposition(|p| p.is_variadic)
}

/// Binds `arguments` to `parameters` with the source compiler's forward scan.
///
/// - An unlabeled trailing closure binds to the last parameter whose type is
///   a function type (forward policy).
/// - A variadic parameter consumes a run of arguments: the first must carry
///   the parameter's call-site label (or none, for an unlabeled parameter),
///   and the run continues through label matches and unlabeled continuations.
/// - A defaulted parameter may consume zero arguments.
/// - Every argument must be consumed.
pub fn match_arguments(
    parameters: &[FunctionParameter],
    arguments: &[LabeledExpression],
) -> Result<ArgumentMatch, MatchError> {
    let mut bindings: Vec<Vec<usize>> = vec![Vec::new(); parameters.len()];

    // Reserve the trailing closure before scanning.
    let trailing = if arguments.last().is_some_and(is_trailing_closure) {
        let parameter_index = parameters
            .iter()
            .rposition(|p| is_function_type(&p.type_name))
            .ok_or(MatchError::UnboundTrailingClosure)?;
        bindings[parameter_index].push(arguments.len() - 1);
        Some(parameter_index)
    } else {
        None
    };

    let scannable = match trailing {
        Some(_) => &arguments[..arguments.len() - 1],
        None => arguments,
    };

    let mut argument_index = 0;
    for (parameter_index, parameter) in parameters.iter().enumerate() {
        if trailing == Some(parameter_index) {
            continue;
        }

        if parameter.is_variadic {
            let mut consumed = 0;
            while let Some(argument) = scannable.get(argument_index) {
                let label_matches = argument.label == parameter.api_label
                    || (consumed > 0 && argument.label.is_none());
                if !label_matches {
                    break;
                }
                bindings[parameter_index].push(argument_index);
                argument_index += 1;
                consumed += 1;
            }
            continue;
        }

        match scannable.get(argument_index) {
            Some(argument) if argument.label == parameter.api_label => {
                bindings[parameter_index].push(argument_index);
                argument_index += 1;
            }
            _ if parameter.value.is_some() => {}
            _ => {
                return Err(MatchError::MissingArgument {
                    label: parameter.label.clone(),
                });
            }
        }
    }

    if argument_index != scannable.len() {
        return Err(MatchError::UnconsumedArgument {
            index: argument_index,
        });
    }

    Ok(ArgumentMatch { bindings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClosureExpression, Provenance};

    fn labeled(label: &str) -> LabeledExpression {
        LabeledExpression {
            label: Some(label.into()),
            expression: Expression::reference(label),
        }
    }

    fn unlabeled() -> LabeledExpression {
        LabeledExpression {
            label: None,
            expression: Expression::reference("value"),
        }
    }

    fn trailing_closure() -> LabeledExpression {
        LabeledExpression {
            label: None,
            expression: Expression::Closure(ClosureExpression {
                parameters: Vec::new(),
                statements: Vec::new(),
                type_name: "() -> ()".into(),
                is_trailing: true,
                origin: Provenance::default(),
            }),
        }
    }

    fn defaulted(parameter: FunctionParameter) -> FunctionParameter {
        FunctionParameter {
            value: Some(Expression::reference("default")),
            ..parameter
        }
    }

    fn variadic(parameter: FunctionParameter) -> FunctionParameter {
        FunctionParameter {
            is_variadic: true,
            ..parameter
        }
    }

    #[test]
    fn plain_labeled_call_binds_one_to_one() {
        let parameters = [
            FunctionParameter::named("a", "Int"),
            FunctionParameter::named("b", "Int"),
        ];
        let arguments = [labeled("a"), labeled("b")];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0], vec![1]]);
    }

    #[test]
    fn positional_parameters_take_unlabeled_arguments() {
        let parameters = [FunctionParameter::positional("value", "Int")];
        let matched = match_arguments(&parameters, &[unlabeled()]).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0]]);
    }

    #[test]
    fn defaulted_parameter_may_be_omitted() {
        let parameters = [
            FunctionParameter::named("a", "Int"),
            defaulted(FunctionParameter::named("b", "Int")),
            FunctionParameter::named("c", "Int"),
        ];
        let arguments = [labeled("a"), labeled("c")];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0], vec![], vec![1]]);
    }

    #[test]
    fn missing_required_parameter_fails() {
        let parameters = [FunctionParameter::named("a", "Int")];
        let error = match_arguments(&parameters, &[]).expect_err("should fail");
        assert_eq!(
            error,
            MatchError::MissingArgument { label: "a".into() }
        );
    }

    #[test]
    fn leftover_argument_fails() {
        let parameters = [FunctionParameter::named("a", "Int")];
        let arguments = [labeled("a"), labeled("extra")];
        let error = match_arguments(&parameters, &arguments).expect_err("should fail");
        assert_eq!(error, MatchError::UnconsumedArgument { index: 1 });
    }

    #[test]
    fn variadic_consumes_label_match_then_unlabeled_run() {
        let parameters = [
            variadic(FunctionParameter::named("xs", "Int")),
            FunctionParameter::named("tail", "Int"),
        ];
        let arguments = [labeled("xs"), unlabeled(), unlabeled(), labeled("tail")];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn unlabeled_variadic_consumes_unlabeled_run() {
        let parameters = [variadic(FunctionParameter::positional("xs", "Int"))];
        let arguments = [unlabeled(), unlabeled()];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0, 1]]);
    }

    #[test]
    fn variadic_may_be_empty() {
        let parameters = [
            variadic(FunctionParameter::named("xs", "Int")),
            FunctionParameter::named("tail", "Int"),
        ];
        let matched = match_arguments(&parameters, &[labeled("tail")]).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![], vec![0]]);
    }

    #[test]
    fn trailing_closure_binds_to_last_function_typed_parameter() {
        let parameters = [
            FunctionParameter::named("transform", "(Int) -> Int"),
            FunctionParameter::named("count", "Int"),
            FunctionParameter::named("body", "() -> ()"),
        ];
        let arguments = [labeled("transform"), labeled("count"), trailing_closure()];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn trailing_closure_with_no_function_parameter_fails() {
        let parameters = [FunctionParameter::named("a", "Int")];
        let arguments = [labeled("a"), trailing_closure()];
        let error = match_arguments(&parameters, &arguments).expect_err("should fail");
        assert_eq!(error, MatchError::UnboundTrailingClosure);
    }

    #[test]
    fn trailing_closure_alone_with_defaulted_rest() {
        let parameters = [
            defaulted(FunctionParameter::named("count", "Int")),
            FunctionParameter::named("body", "() -> ()"),
        ];
        let matched = match_arguments(&parameters, &[trailing_closure()]).expect("should bind");
        assert_eq!(matched.bindings, vec![vec![], vec![0]]);
    }

    #[test]
    fn every_argument_consumed_exactly_once() {
        let parameters = [
            variadic(FunctionParameter::named("xs", "Int")),
            defaulted(FunctionParameter::named("sep", "String")),
            FunctionParameter::named("body", "() -> ()"),
        ];
        let arguments = [labeled("xs"), unlabeled(), labeled("sep"), trailing_closure()];
        let matched = match_arguments(&parameters, &arguments).expect("should bind");
        let mut seen: Vec<usize> = matched.bindings.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn last_variadic_index_finds_rightmost() {
        let parameters = [
            variadic(FunctionParameter::named("a", "Int")),
            FunctionParameter::named("b", "Int"),
            variadic(FunctionParameter::named("c", "Int")),
        ];
        assert_eq!(last_variadic_index(&parameters), Some(2));
        assert_eq!(last_variadic_index(&parameters[1..2]), None);
    }
}
