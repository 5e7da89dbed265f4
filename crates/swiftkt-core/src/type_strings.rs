// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! String-level Swift→Kotlin type translation.
//!
//! Types are opaque strings to the core: the frontend supplies Swift type
//! names and the emitter prints Kotlin ones. This module is the single place
//! that splits, inspects, and rewrites those strings.

use ecow::{EcoString, eco_format};

/// Returns the index of the first top-level occurrence of `needle` in `s` —
/// an occurrence not nested inside `<>`, `()`, or `[]`.
#[must_use]
pub fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0_i32;
    for index in 0..bytes.len() {
        if depth == 0 && s[index..].starts_with(needle) {
            return Some(index);
        }
        match bytes[index] {
            b'<' | b'(' | b'[' => depth += 1,
            // `->` is an arrow, not a closing angle bracket.
            b'>' if index > 0 && bytes[index - 1] == b'-' => {}
            b'>' | b')' | b']' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits `s` on top-level commas, trimming each piece.
#[must_use]
pub fn split_type_list(s: &str) -> Vec<EcoString> {
    let mut pieces = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    let bytes = s.as_bytes();
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' => {
                if !(index > 0 && bytes[index - 1] == b'-') {
                    depth -= 1;
                }
            }
            b')' | b']' => depth -= 1,
            b',' if depth == 0 => {
                pieces.push(s[start..index].trim().into());
                start = index + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() || !pieces.is_empty() {
        pieces.push(last.into());
    }
    pieces
}

/// Splits a generic application `Base<A, B>` into `(Base, [A, B])`.
/// Returns `None` when `s` is not a generic application.
#[must_use]
pub fn split_generic_args(s: &str) -> Option<(EcoString, Vec<EcoString>)> {
    let open = find_top_level(s, "<")?;
    if !s.ends_with('>') {
        return None;
    }
    let base = s[..open].trim();
    let inner = &s[open + 1..s.len() - 1];
    Some((base.into(), split_type_list(inner)))
}

/// True when `s` is wrapped in one outer pair of parentheses.
#[must_use]
pub fn is_parenthesized(s: &str) -> bool {
    if !s.starts_with('(') || !s.ends_with(')') {
        return false;
    }
    let mut depth = 0_i32;
    for (index, byte) in s.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return index == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// True when `s` is a function type (contains a top-level `->`).
#[must_use]
pub fn is_function_type(s: &str) -> bool {
    find_top_level(s, "->").is_some()
}

/// True when `s` is an optional type.
#[must_use]
pub fn is_optional(s: &str) -> bool {
    s.trim_end().ends_with('?')
}

/// Rewrites a Swift type string as its Kotlin spelling.
///
/// `()`/`Void` → `Unit`; `[T]` → `List<T>`; `[K: V]` → `Map<K, V>`;
/// `Array`/`Dictionary` → `List`/`Map`; 2-tuples → `Pair<A, B>`; function
/// types map componentwise with a trailing ` throws` dropped; optionality and
/// generic applications recurse.
#[must_use]
pub fn map_type(type_name: &str) -> EcoString {
    let trimmed = type_name.trim();

    match trimmed {
        "()" | "Void" => return "Unit".into(),
        "Bool" => return "Boolean".into(),
        "Character" => return "Char".into(),
        "Error" => return "Exception".into(),
        "AnyObject" => return "Any".into(),
        _ => {}
    }

    if let Some(inner) = trimmed.strip_suffix('?') {
        return eco_format!("{}?", map_type(inner));
    }

    // Native collection literal types: [T] and [K: V].
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if let Some(colon) = find_top_level(inner, ":") {
            let key = map_type(&inner[..colon]);
            let value = map_type(&inner[colon + 1..]);
            return eco_format!("Map<{key}, {value}>");
        }
        return eco_format!("List<{}>", map_type(inner));
    }

    // Function types, dropping ` throws` between parameters and arrow.
    if let Some(arrow) = find_top_level(trimmed, "->") {
        let parameters_part = trimmed[..arrow].trim().trim_end_matches("throws").trim();
        let return_part = trimmed[arrow + 2..].trim();
        let parameters = if is_parenthesized(parameters_part) {
            split_type_list(&parameters_part[1..parameters_part.len() - 1])
        } else {
            vec![parameters_part.into()]
        };
        let mapped: Vec<EcoString> = parameters
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| map_type(p))
            .collect();
        let joined = mapped.join(", ");
        return eco_format!("({joined}) -> {}", map_type(return_part));
    }

    // Tuples: 2-tuples become Pair, longer ones stay parenthesized.
    if is_parenthesized(trimmed) {
        let inner = &trimmed[1..trimmed.len() - 1];
        let elements = split_type_list(inner);
        let mapped: Vec<EcoString> = elements
            .iter()
            .map(|element| {
                // Drop tuple labels: `(key: K, value: V)` → element types.
                let element = element.as_str();
                match find_top_level(element, ":") {
                    Some(colon) => map_type(&element[colon + 1..]),
                    None => map_type(element),
                }
            })
            .collect();
        if mapped.len() == 2 {
            return eco_format!("Pair<{}, {}>", mapped[0], mapped[1]);
        }
        if mapped.len() == 1 {
            return mapped.into_iter().next().unwrap_or_default();
        }
        return eco_format!("({})", mapped.join(", "));
    }

    // Generic applications recurse into their arguments.
    if let Some((base, arguments)) = split_generic_args(trimmed) {
        let base: EcoString = match base.as_str() {
            "Array" => "List".into(),
            "Dictionary" => "Map".into(),
            other => other.into(),
        };
        let mapped: Vec<EcoString> = arguments.iter().map(|a| map_type(a)).collect();
        return eco_format!("{base}<{}>", mapped.join(", "));
    }

    match trimmed {
        "Array" => "List".into(),
        "Dictionary" => "Map".into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_becomes_unit() {
        assert_eq!(map_type("()"), "Unit");
        assert_eq!(map_type("Void"), "Unit");
    }

    #[test]
    fn optionals_are_preserved() {
        assert_eq!(map_type("Int?"), "Int?");
        assert_eq!(map_type("[Int]?"), "List<Int>?");
    }

    #[test]
    fn native_array_and_dictionary_types() {
        assert_eq!(map_type("[Int]"), "List<Int>");
        assert_eq!(map_type("[String: Int]"), "Map<String, Int>");
        assert_eq!(map_type("[[Int]]"), "List<List<Int>>");
    }

    #[test]
    fn named_collections() {
        assert_eq!(map_type("Array<Int>"), "List<Int>");
        assert_eq!(map_type("Dictionary<String, Bool>"), "Map<String, Boolean>");
        assert_eq!(map_type("MutableList<Int>"), "MutableList<Int>");
    }

    #[test]
    fn two_tuples_become_pairs() {
        assert_eq!(map_type("(Int, String)"), "Pair<Int, String>");
        assert_eq!(map_type("(key: String, value: Int)"), "Pair<String, Int>");
    }

    #[test]
    fn function_types_map_componentwise() {
        assert_eq!(map_type("(Int, Bool) -> Void"), "(Int, Boolean) -> Unit");
        assert_eq!(map_type("() -> Int"), "() -> Int");
    }

    #[test]
    fn throws_is_dropped() {
        assert_eq!(map_type("(Int) throws -> Bool"), "(Int) -> Boolean");
    }

    #[test]
    fn error_maps_to_exception() {
        assert_eq!(map_type("Error"), "Exception");
    }

    #[test]
    fn find_top_level_skips_nested() {
        assert_eq!(find_top_level("Dictionary<String, Int>", ","), None);
        assert_eq!(find_top_level("(A, B)", ","), None);
        assert_eq!(find_top_level("A, B", ","), Some(1));
    }

    #[test]
    fn find_top_level_ignores_arrow_angle() {
        // The `>` in `->` must not close nesting.
        assert!(is_function_type("(Int) -> Bool"));
        assert!(is_function_type("((Int) -> Bool) -> Int"));
        assert!(!is_function_type("List<Int>"));
    }

    #[test]
    fn split_type_list_respects_nesting() {
        assert_eq!(
            split_type_list("Map<K, V>, Int, (A, B)"),
            vec!["Map<K, V>", "Int", "(A, B)"]
        );
    }

    #[test]
    fn split_generic_args_basics() {
        let (base, arguments) = split_generic_args("Map<String, Int>").expect("generic");
        assert_eq!(base, "Map");
        assert_eq!(arguments, vec!["String", "Int"]);
        assert!(split_generic_args("Int").is_none());
    }

    #[test]
    fn is_parenthesized_requires_one_outer_pair() {
        assert!(is_parenthesized("(Int, Bool)"));
        assert!(!is_parenthesized("(Int) -> (Bool)"));
        assert!(!is_parenthesized("Int"));
    }
}
