// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tree-structured translation buffer (the emitter's output type).
//!
//! A [`Translation`] is a lazy tree whose leaves are literal strings and
//! whose interior nodes are child translations, each optionally tagged with
//! the source range it was emitted from. Emitter functions build and compose
//! trees; nothing is stringified until [`Translation::resolve`] walks the
//! tree in order, accumulating output text and emitting one line-map entry
//! per ranged child.
//!
//! Line-map entries have the form
//! `out_line:out_col:out_line_end:out_col_end:src_line:src_col:src_line_end:src_col_end`,
//! one per line, outer nodes before the children they contain.

use crate::source_range::{SourcePosition, SourceRange};
use ecow::EcoString;
use std::fmt::Write as _;

/// One node of a translation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TranslationNode {
    /// A literal output fragment.
    Literal(EcoString),
    /// A nested translation.
    Child(Translation),
}

/// A lazy tree of output fragments with per-range provenance.
///
/// # Examples
///
/// ```
/// use swiftkt_core::translation::Translation;
///
/// let mut translation = Translation::new();
/// translation.append("val x = ");
/// translation.append("1");
/// let (text, line_map) = translation.resolve();
/// assert_eq!(text, "val x = 1");
/// assert!(line_map.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    range: Option<SourceRange>,
    children: Vec<TranslationNode>,
}

impl Translation {
    /// An empty translation with no source range.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty translation tagged with the source range it will represent.
    #[must_use]
    pub fn with_range(range: Option<SourceRange>) -> Self {
        Self {
            range,
            children: Vec::new(),
        }
    }

    /// The source range this subtree represents, if any.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    /// Appends a literal fragment.
    pub fn append(&mut self, literal: impl Into<EcoString>) {
        self.children.push(TranslationNode::Literal(literal.into()));
    }

    /// Appends a child translation.
    pub fn append_translation(&mut self, child: Translation) {
        self.children.push(TranslationNode::Child(child));
    }

    /// Appends every translation in `list`, inserting `separator` between
    /// adjacent pairs. An empty list appends nothing.
    pub fn append_translations(&mut self, list: Vec<Translation>, separator: &str) {
        let mut first = true;
        for child in list {
            if !first {
                self.append(separator);
            }
            self.append_translation(child);
            first = false;
        }
    }

    /// Removes `suffix` from the end of the last literal leaf.
    ///
    /// Returns `false` (and leaves the tree unchanged) when the tree does not
    /// end in a literal with that suffix.
    pub fn drop_last(&mut self, suffix: &str) -> bool {
        match self.children.last_mut() {
            Some(TranslationNode::Literal(literal)) => {
                if let Some(shortened) = literal.strip_suffix(suffix) {
                    *literal = EcoString::from(shortened);
                    true
                } else {
                    false
                }
            }
            Some(TranslationNode::Child(child)) => child.drop_last(suffix),
            None => false,
        }
    }

    /// True iff every leaf in the tree is an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|node| match node {
            TranslationNode::Literal(literal) => literal.is_empty(),
            TranslationNode::Child(child) => child.is_empty(),
        })
    }

    /// The total number of characters the tree resolves to.
    #[must_use]
    pub fn length(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                TranslationNode::Literal(literal) => literal.chars().count(),
                TranslationNode::Child(child) => child.length(),
            })
            .sum()
    }

    /// Resolves the tree to `(output_text, line_map)`.
    ///
    /// The line map contains one entry per ranged node, recorded when the
    /// walk enters and leaves it, so an outer node's entry precedes its
    /// children's.
    #[must_use]
    pub fn resolve(&self) -> (String, String) {
        let mut output = String::new();
        let mut line_map = String::new();
        let mut position = SourcePosition::start();
        self.resolve_into(&mut output, &mut line_map, &mut position);
        (output, line_map)
    }

    fn resolve_into(&self, output: &mut String, line_map: &mut String, position: &mut SourcePosition) {
        let entry_position = *position;
        for node in &self.children {
            match node {
                TranslationNode::Literal(literal) => {
                    output.push_str(literal);
                    *position = position.advanced_by(literal);
                }
                TranslationNode::Child(child) => {
                    child.resolve_into(output, line_map, position);
                }
            }
        }
        if let Some(range) = self.range {
            let exit_position = *position;
            // Infallible: writing to a String cannot fail.
            let _ = writeln!(
                line_map,
                "{}:{}:{}:{}:{}:{}:{}:{}",
                entry_position.line,
                entry_position.column,
                exit_position.line,
                exit_position.column,
                range.line_start,
                range.column_start,
                range.line_end,
                range.column_end,
            );
        }
    }
}

impl From<&str> for Translation {
    fn from(literal: &str) -> Self {
        let mut translation = Self::new();
        translation.append(literal);
        translation
    }
}
