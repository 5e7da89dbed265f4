// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The rewrite passes.
//!
//! The first round ([`recording`]) populates the context over every file;
//! the second round rewrites each file in the fixed order given by
//! [`second_round_passes`]. Where ordering matters it is noted on the pass:
//! templates run first so nothing downstream sees source-only forms, the
//! if-let machinery runs before expression optionals propagate, access and
//! openness settle before calls are matched, and the switch family runs
//! late, after enum capitalization's inputs are stable.

pub mod conditionals;
pub mod declarations;
pub mod expressions;
pub mod functions;
pub mod recording;
pub mod switches;
pub mod templates;
pub mod warnings;

use crate::pass::RewritePass;

/// The second-round passes, in execution order.
#[must_use]
pub fn second_round_passes() -> Vec<Box<dyn RewritePass>> {
    vec![
        Box::new(templates::ReplaceTemplates),
        Box::new(declarations::EquatableOperators),
        Box::new(declarations::RawValueMembers),
        Box::new(declarations::DescriptionToToString),
        Box::new(declarations::OptionalInits),
        Box::new(declarations::StaticMembers),
        Box::new(declarations::ProtocolContents),
        Box::new(declarations::RemoveExtensions),
        Box::new(conditionals::ShadowedIfLetAsIs),
        Box::new(conditionals::SideEffectWarningsInIfLets),
        Box::new(conditionals::ParenthesizeOrInIf),
        Box::new(conditionals::RearrangeIfLets),
        Box::new(expressions::SelfToThis),
        Box::new(expressions::ImplicitNullInOptionals),
        Box::new(expressions::AnonymousParameterRename),
        Box::new(expressions::CovariantInitAsCast),
        Box::new(expressions::OptionalFunctionCalls),
        Box::new(expressions::DataStructureInitializers),
        Box::new(expressions::TuplesToPairs),
        Box::new(expressions::Autoclosures),
        Box::new(expressions::OptionalSubscriptRefactor),
        Box::new(expressions::AddOptionalsInDotChains),
        Box::new(expressions::RenameOperators),
        Box::new(functions::SuperCallsToHeaders),
        Box::new(expressions::OptionalsInConditionalCasts),
        Box::new(functions::AccessModifiers::default()),
        Box::new(functions::OpenDeclarations),
        Box::new(functions::ProtocolExtensionGenerics),
        Box::new(functions::RemoveOpenOnInitializers),
        Box::new(functions::CatchVariableSynthesis),
        Box::new(functions::MatchCallsToDeclarations),
        Box::new(expressions::EscapeStrings),
        Box::new(functions::RemoveOverrides),
        Box::new(switches::CharactersInSwitches),
        Box::new(switches::AnnotationsForCaseLet),
        Box::new(switches::CapitalizeEnums),
        Box::new(switches::IsInSwitches),
        Box::new(switches::SwitchesToExpressions),
        Box::new(switches::RemoveBreaksInSwitches),
        Box::new(functions::ReturnsInLambdas::default()),
        Box::new(expressions::InnerTypePrefixes),
        Box::new(conditionals::DoubleNegativesInGuards),
        Box::new(conditionals::IfNullReturnToElvis),
        Box::new(warnings::StandardLibraryWarning),
        Box::new(warnings::DoubleOptionalWarning),
        Box::new(warnings::MutableValueTypeWarning),
        Box::new(warnings::StructInitializerWarning),
        Box::new(warnings::NativeCollectionWarning),
        Box::new(warnings::DeferWarning),
        Box::new(warnings::UnexpectedStructure),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_run_first_and_structure_check_last() {
        let passes = second_round_passes();
        assert_eq!(passes[0].name(), "replace-templates");
        assert_eq!(
            passes.last().map(|p| p.name()),
            Some("unexpected-structure")
        );
    }

    #[test]
    fn pass_names_are_unique() {
        let passes = second_round_passes();
        let mut names: Vec<&str> = passes.iter().map(|p| p.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate pass names");
    }
}
