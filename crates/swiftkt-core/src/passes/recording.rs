// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! First-round recording passes.
//!
//! These run over every file before any rewriting, populating the
//! [`TranspilationContext`] and normalizing the few AST details the frontend
//! leaves unfilled (initializer return types, implicit raw values). Order
//! matters and is fixed by [`run_first_round`]; in particular inheritance
//! recording must see the declared lists before clean-inheritances strips
//! source-only names from them.

use crate::ast::{
    EnumDeclaration, Expression, FunctionParameter, Provenance, Statement, StructDeclaration,
};
use crate::context::{FunctionTranslation, TemplateRule, TranspilationContext};
use crate::driver::TranspilationUnit;
use ecow::{EcoString, eco_format};
use tracing::debug;

/// Protocol names with no Kotlin counterpart; dropped from inheritance lists.
const SOURCE_ONLY_PROTOCOLS: &[&str] = &[
    "Equatable",
    "Hashable",
    "Comparable",
    "Codable",
    "Decodable",
    "Encodable",
    "CustomStringConvertible",
    "CaseIterable",
    "RawRepresentable",
    "Sendable",
];

/// Raw-value types of the integer family.
const INTEGER_FAMILY: &[&str] = &[
    "Int", "Int8", "Int16", "Int32", "Int64", "UInt", "UInt8", "UInt16", "UInt32", "UInt64",
];

/// Runs the nine recording passes in order, each over every unit, so that
/// every pass sees the whole program before the next one starts.
pub fn run_first_round(units: &mut [TranspilationUnit], context: &mut TranspilationContext) {
    debug!("first round: initializer return types");
    for unit in units.iter_mut() {
        fill_initializer_return_types(unit);
    }
    debug!("first round: templates");
    for unit in units.iter_mut() {
        record_templates(unit, context);
    }
    debug!("first round: protocols");
    for unit in units.iter_mut() {
        record_protocols(unit, context);
    }
    debug!("first round: initializers");
    for unit in units.iter_mut() {
        record_initializers(unit, context);
    }
    debug!("first round: inheritances");
    for unit in units.iter_mut() {
        record_inheritances(unit, context);
    }
    debug!("first round: implicit raw values");
    for unit in units.iter_mut() {
        fill_implicit_raw_values(unit);
    }
    debug!("first round: clean inheritances");
    for unit in units.iter_mut() {
        clean_inheritances(unit);
    }
    debug!("first round: enums");
    for unit in units.iter_mut() {
        record_enums(unit, context);
    }
    debug!("first round: functions");
    for unit in units.iter_mut() {
        record_functions(unit, context);
    }
}

fn top_level_statements(unit: &mut TranspilationUnit) -> impl Iterator<Item = &mut Statement> {
    unit.declarations
        .iter_mut()
        .chain(unit.statements.iter_mut())
}

/// Fills in the enclosing type name as the return type of every initializer
/// (the frontend does not).
pub fn fill_initializer_return_types(unit: &mut TranspilationUnit) {
    fn fill_members(members: &mut [Statement], type_name: &str) {
        for member in members {
            match member {
                Statement::Initializer(initializer) => {
                    initializer.function.return_type = type_name.into();
                    let parameter_types: Vec<EcoString> = initializer
                        .function
                        .parameters
                        .iter()
                        .map(|p| p.type_name.clone())
                        .collect();
                    initializer.function.function_type =
                        eco_format!("({}) -> {type_name}", parameter_types.join(", "));
                }
                Statement::Class(c) => fill_members(&mut c.members, &c.name),
                Statement::Struct(s) => fill_members(&mut s.members, &s.name),
                Statement::Enum(e) => fill_members(&mut e.members, &e.name),
                Statement::Extension(e) => fill_members(&mut e.members, &e.type_name),
                _ => {}
            }
        }
    }

    for statement in top_level_statements(unit) {
        match statement {
            Statement::Class(c) => fill_members(&mut c.members, &c.name.clone()),
            Statement::Struct(s) => fill_members(&mut s.members, &s.name.clone()),
            Statement::Enum(e) => fill_members(&mut e.members, &e.name.clone()),
            Statement::Extension(e) => fill_members(&mut e.members, &e.type_name.clone()),
            _ => {}
        }
    }
}

/// Registers source→target snippet templates and removes their carrier
/// functions from the AST.
///
/// A carrier is a function whose name starts with `templates`; its body is a
/// sequence of pairs: a pattern expression statement followed by a string
/// literal statement holding the replacement snippet.
pub fn record_templates(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    let mut extract = |statements: &mut Vec<Statement>| {
        statements.retain(|statement| {
            let Statement::Function(function) = statement else {
                return true;
            };
            if !function.prefix.starts_with("templates") {
                return true;
            }
            if let Some(body) = &function.statements {
                let mut index = 0;
                while index + 1 < body.len() {
                    let pattern = &body[index];
                    let replacement = &body[index + 1];
                    if let (
                        Statement::Expression {
                            expression: pattern, ..
                        },
                        Statement::Expression {
                            expression: Expression::StringLiteral { value, .. },
                            ..
                        },
                    ) = (pattern, replacement)
                    {
                        context.record_template(TemplateRule {
                            pattern: pattern.clone(),
                            replacement: value.clone(),
                        });
                        index += 2;
                    } else {
                        index += 1;
                    }
                }
            }
            false
        });
    };
    extract(&mut unit.declarations);
    extract(&mut unit.statements);
}

/// Adds every declared protocol name to the context.
pub fn record_protocols(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    for statement in top_level_statements(unit) {
        if let Statement::Protocol(protocol) = statement {
            context.record_protocol(protocol.name.clone());
        }
    }
}

/// Registers the signature of every declared initializer so call sites
/// `T(…)` can be matched against it.
pub fn record_initializers(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    fn record_members(members: &[Statement], type_name: &EcoString, context: &mut TranspilationContext) {
        for member in members {
            match member {
                Statement::Initializer(initializer) => {
                    context.record_function_translation(FunctionTranslation {
                        source_api_name: type_name.clone(),
                        type_name: initializer.function.function_type.clone(),
                        prefix: type_name.clone(),
                        parameters: initializer.function.parameters.clone(),
                    });
                }
                Statement::Class(c) => record_members(&c.members, &c.name, context),
                Statement::Struct(s) => record_members(&s.members, &s.name, context),
                Statement::Enum(e) => record_members(&e.members, &e.name, context),
                Statement::Extension(e) => record_members(&e.members, &e.type_name, context),
                _ => {}
            }
        }
    }

    for statement in top_level_statements(unit) {
        match statement {
            Statement::Class(c) => record_members(&c.members, &c.name.clone(), context),
            Statement::Struct(s) => record_members(&s.members, &s.name.clone(), context),
            Statement::Enum(e) => record_members(&e.members, &e.name.clone(), context),
            Statement::Extension(e) => record_members(&e.members, &e.type_name.clone(), context),
            _ => {}
        }
    }
}

/// Records `{fully_qualified_type → [inherited_names]}` for classes, structs,
/// and enums, before clean-inheritances strips the lists.
pub fn record_inheritances(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    fn qualified(enclosing: &[EcoString], name: &EcoString) -> EcoString {
        if enclosing.is_empty() {
            name.clone()
        } else {
            let mut path: Vec<&str> = enclosing.iter().map(EcoString::as_str).collect();
            path.push(name);
            path.join(".").into()
        }
    }

    fn record(
        statements: &[Statement],
        enclosing: &mut Vec<EcoString>,
        context: &mut TranspilationContext,
    ) {
        for statement in statements {
            let (name, inherits, members) = match statement {
                Statement::Class(c) => (&c.name, &c.inherits, &c.members),
                Statement::Struct(s) => (&s.name, &s.inherits, &s.members),
                Statement::Enum(e) => (&e.name, &e.inherits, &e.members),
                _ => continue,
            };
            let full = qualified(enclosing, name);
            context.record_inheritance(full, inherits.clone());
            enclosing.push(name.clone());
            record(members, enclosing, context);
            enclosing.pop();
        }
    }

    let mut enclosing = Vec::new();
    record(&unit.declarations, &mut enclosing, context);
    record(&unit.statements, &mut enclosing, context);
}

/// Fills the missing raw values of enums inheriting from the integer or
/// string family, and stows the raw-value type on the declaration.
///
/// Strings use the element name; integers are sequential (previous plus one,
/// seeded at −1 so the first unspecified case is 0), and every explicit
/// integer raw value resets the sequence.
pub fn fill_implicit_raw_values(unit: &mut TranspilationUnit) {
    fn fill(declaration: &mut EnumDeclaration) {
        let raw_type = declaration.inherits.iter().find(|name| {
            INTEGER_FAMILY.contains(&name.as_str()) || name.as_str() == "String"
        });
        let Some(raw_type) = raw_type.cloned() else {
            return;
        };
        declaration.raw_value_type = Some(raw_type.clone());

        if raw_type == "String" {
            for element in &mut declaration.elements {
                if element.raw_value.is_none() {
                    element.raw_value = Some(Expression::StringLiteral {
                        value: element.name.clone(),
                        is_multiline: false,
                        origin: Provenance::default(),
                    });
                }
            }
        } else {
            let mut previous: i64 = -1;
            for element in &mut declaration.elements {
                match &element.raw_value {
                    Some(Expression::IntegerLiteral { value, .. }) => previous = *value,
                    Some(_) => {}
                    None => {
                        previous += 1;
                        element.raw_value = Some(Expression::IntegerLiteral {
                            value: previous,
                            radix: crate::ast::Radix::Decimal,
                            origin: Provenance::default(),
                        });
                    }
                }
            }
        }
    }

    fn walk(statements: &mut [Statement]) {
        for statement in statements {
            match statement {
                Statement::Enum(declaration) => {
                    fill(declaration);
                    walk(&mut declaration.members);
                }
                Statement::Class(c) => walk(&mut c.members),
                Statement::Struct(s) => walk(&mut s.members),
                Statement::Extension(e) => walk(&mut e.members),
                _ => {}
            }
        }
    }

    walk(&mut unit.declarations);
    walk(&mut unit.statements);
}

/// Removes source-only protocol names and raw-representable types from
/// inheritance lists. Must run after inheritance recording and before enum
/// recording.
pub fn clean_inheritances(unit: &mut TranspilationUnit) {
    fn keep(name: &EcoString) -> bool {
        !SOURCE_ONLY_PROTOCOLS.contains(&name.as_str())
            && !INTEGER_FAMILY.contains(&name.as_str())
            && name.as_str() != "String"
    }

    fn walk(statements: &mut [Statement]) {
        for statement in statements {
            match statement {
                Statement::Class(c) => {
                    c.inherits.retain(keep);
                    walk(&mut c.members);
                }
                Statement::Struct(s) => {
                    s.inherits.retain(keep);
                    walk(&mut s.members);
                }
                Statement::Enum(e) => {
                    e.inherits.retain(keep);
                    walk(&mut e.members);
                }
                Statement::Extension(e) => walk(&mut e.members),
                _ => {}
            }
        }
    }

    walk(&mut unit.declarations);
    walk(&mut unit.statements);
}

/// Classifies each enum as enum-class (all elements nullary, no superclass)
/// or sealed-class (anything else), keyed by fully qualified name.
pub fn record_enums(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    fn walk(
        statements: &[Statement],
        enclosing: &mut Vec<EcoString>,
        context: &mut TranspilationContext,
    ) {
        for statement in statements {
            match statement {
                Statement::Enum(declaration) => {
                    let full: EcoString = if enclosing.is_empty() {
                        declaration.name.clone()
                    } else {
                        let mut path: Vec<&str> =
                            enclosing.iter().map(EcoString::as_str).collect();
                        path.push(&declaration.name);
                        path.join(".").into()
                    };
                    let all_nullary = declaration
                        .elements
                        .iter()
                        .all(|element| element.associated_values.is_empty());
                    let has_superclass = declaration
                        .inherits
                        .iter()
                        .any(|name| !context.is_protocol(name));
                    if all_nullary && !has_superclass {
                        context.record_enum_class(full);
                    } else {
                        context.record_sealed_class(full, declaration.clone());
                    }
                    enclosing.push(declaration.name.clone());
                    walk(&declaration.members, enclosing, context);
                    enclosing.pop();
                }
                Statement::Class(c) => {
                    enclosing.push(c.name.clone());
                    walk(&c.members, enclosing, context);
                    enclosing.pop();
                }
                Statement::Struct(s) => {
                    enclosing.push(s.name.clone());
                    walk(&s.members, enclosing, context);
                    enclosing.pop();
                }
                Statement::Extension(e) => {
                    enclosing.push(e.type_name.clone());
                    walk(&e.members, enclosing, context);
                    enclosing.pop();
                }
                _ => {}
            }
        }
    }

    let mut enclosing = Vec::new();
    walk(&unit.declarations, &mut enclosing, context);
    walk(&unit.statements, &mut enclosing, context);
}

/// Registers every function's signature; synthesizes the memberwise
/// initializer for structs without explicit ones and a constructor-like
/// function per sealed-enum element. Functions annotated `pure` also land in
/// the pure set.
pub fn record_functions(unit: &mut TranspilationUnit, context: &mut TranspilationContext) {
    fn record_function(
        function: &mut crate::ast::FunctionDeclaration,
        context: &mut TranspilationContext,
    ) {
        if function.annotations.iter().any(|a| a == "pure") {
            function.is_pure = true;
            context.record_pure_function(function.prefix.clone());
        }
        context.record_function_translation(FunctionTranslation {
            source_api_name: function.prefix.clone(),
            type_name: function.function_type.clone(),
            prefix: function.prefix.clone(),
            parameters: function.parameters.clone(),
        });
    }

    fn memberwise_initializer(declaration: &StructDeclaration) -> Option<FunctionTranslation> {
        let has_explicit = declaration
            .members
            .iter()
            .any(|member| matches!(member, Statement::Initializer(_)));
        if has_explicit {
            return None;
        }
        let parameters: Vec<FunctionParameter> = declaration
            .members
            .iter()
            .filter_map(|member| match member {
                Statement::Variable(variable)
                    if variable.getter.is_none() && variable.setter.is_none()
                        && !variable.is_static =>
                {
                    Some(FunctionParameter {
                        label: variable.identifier.clone(),
                        api_label: Some(variable.identifier.clone()),
                        type_name: variable.type_name.clone(),
                        value: variable.expression.clone(),
                        is_variadic: false,
                    })
                }
                _ => None,
            })
            .collect();
        let parameter_types: Vec<EcoString> =
            parameters.iter().map(|p| p.type_name.clone()).collect();
        Some(FunctionTranslation {
            source_api_name: declaration.name.clone(),
            type_name: eco_format!("({}) -> {}", parameter_types.join(", "), declaration.name),
            prefix: declaration.name.clone(),
            parameters,
        })
    }

    fn element_constructors(declaration: &EnumDeclaration, context: &mut TranspilationContext) {
        let is_sealed = declaration
            .elements
            .iter()
            .any(|element| !element.associated_values.is_empty());
        if !is_sealed {
            return;
        }
        for element in &declaration.elements {
            let parameters: Vec<FunctionParameter> = element
                .associated_values
                .iter()
                .map(|value| FunctionParameter {
                    label: value.label.clone().unwrap_or_else(|| "value".into()),
                    api_label: value.label.clone(),
                    type_name: value.type_name.clone(),
                    value: None,
                    is_variadic: false,
                })
                .collect();
            let parameter_types: Vec<EcoString> =
                parameters.iter().map(|p| p.type_name.clone()).collect();
            context.record_function_translation(FunctionTranslation {
                source_api_name: element.name.clone(),
                type_name: eco_format!(
                    "({}) -> {}",
                    parameter_types.join(", "),
                    declaration.name
                ),
                prefix: element.name.clone(),
                parameters,
            });
        }
    }

    fn walk(statements: &mut [Statement], context: &mut TranspilationContext) {
        for statement in statements {
            match statement {
                Statement::Function(function) => record_function(function, context),
                Statement::Class(c) => walk(&mut c.members, context),
                Statement::Struct(s) => {
                    if let Some(translation) = memberwise_initializer(s) {
                        context.record_function_translation(translation);
                    }
                    walk(&mut s.members, context);
                }
                Statement::Enum(e) => {
                    element_constructors(e, context);
                    walk(&mut e.members, context);
                }
                Statement::Extension(e) => walk(&mut e.members, context),
                _ => {}
            }
        }
    }

    walk(&mut unit.declarations, context);
    walk(&mut unit.statements, context);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumElement, InitializerDeclaration, VariableDeclaration};
    use crate::test_helpers::{empty_unit, enum_declaration, function, struct_declaration};

    fn unit_with(declarations: Vec<Statement>) -> TranspilationUnit {
        TranspilationUnit {
            declarations,
            ..empty_unit()
        }
    }

    fn element(name: &str) -> EnumElement {
        EnumElement {
            name: name.into(),
            associated_values: Vec::new(),
            raw_value: None,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn initializer_return_types_take_the_enclosing_type() {
        let initializer = InitializerDeclaration {
            function: function("init", "()", Vec::new()),
            super_call: None,
            is_optional: false,
        };
        let mut unit = unit_with(vec![Statement::Class(crate::ast::ClassDeclaration {
            name: "Foo".into(),
            annotations: Vec::new(),
            access: None,
            is_open: false,
            inherits: Vec::new(),
            members: vec![Statement::Initializer(initializer)],
            origin: Provenance::default(),
        })]);
        fill_initializer_return_types(&mut unit);
        let Statement::Class(class) = &unit.declarations[0] else {
            panic!("expected class");
        };
        let Statement::Initializer(initializer) = &class.members[0] else {
            panic!("expected initializer");
        };
        assert_eq!(initializer.function.return_type, "Foo");
        assert_eq!(initializer.function.function_type, "() -> Foo");
    }

    #[test]
    fn implicit_integer_raw_values_are_sequential_with_resets() {
        let mut declaration = enum_declaration("Level", vec![
            element("low"),
            element("mid"),
            EnumElement {
                raw_value: Some(Expression::IntegerLiteral {
                    value: 10,
                    radix: crate::ast::Radix::Decimal,
                    origin: Provenance::default(),
                }),
                ..element("high")
            },
            element("extreme"),
        ]);
        declaration.inherits = vec!["Int".into()];
        let mut unit = unit_with(vec![Statement::Enum(declaration)]);
        fill_implicit_raw_values(&mut unit);
        let Statement::Enum(declaration) = &unit.declarations[0] else {
            panic!("expected enum");
        };
        let values: Vec<i64> = declaration
            .elements
            .iter()
            .map(|element| match element.raw_value {
                Some(Expression::IntegerLiteral { value, .. }) => value,
                ref other => panic!("expected integer raw value, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec![0, 1, 10, 11]);
        assert_eq!(declaration.raw_value_type.as_deref(), Some("Int"));
    }

    #[test]
    fn implicit_string_raw_values_use_element_names() {
        let mut declaration = enum_declaration("Suit", vec![element("hearts"), element("spades")]);
        declaration.inherits = vec!["String".into()];
        let mut unit = unit_with(vec![Statement::Enum(declaration)]);
        fill_implicit_raw_values(&mut unit);
        let Statement::Enum(declaration) = &unit.declarations[0] else {
            panic!("expected enum");
        };
        let Some(Expression::StringLiteral { value, .. }) = &declaration.elements[0].raw_value
        else {
            panic!("expected string raw value");
        };
        assert_eq!(value, "hearts");
    }

    #[test]
    fn clean_inheritances_strips_source_only_names() {
        let mut declaration = enum_declaration("Suit", vec![element("hearts")]);
        declaration.inherits = vec!["String".into(), "Equatable".into(), "Shape".into()];
        let mut unit = unit_with(vec![Statement::Enum(declaration)]);
        clean_inheritances(&mut unit);
        let Statement::Enum(declaration) = &unit.declarations[0] else {
            panic!("expected enum");
        };
        assert_eq!(declaration.inherits, vec![EcoString::from("Shape")]);
    }

    #[test]
    fn enums_classify_into_enum_class_and_sealed_class() {
        let nullary = enum_declaration("Compass", vec![element("north"), element("south")]);
        let sealed = enum_declaration(
            "Shape",
            vec![
                element("point"),
                EnumElement {
                    associated_values: vec![crate::ast::LabeledType {
                        label: Some("radius".into()),
                        type_name: "Double".into(),
                    }],
                    ..element("circle")
                },
            ],
        );
        let mut unit = unit_with(vec![Statement::Enum(nullary), Statement::Enum(sealed)]);
        let mut context = TranspilationContext::default();
        record_enums(&mut unit, &mut context);
        assert!(context.is_enum_class("Compass"));
        assert!(context.is_sealed_class("Shape"));
        let declaration = context
            .sealed_class_declaration("Shape")
            .expect("sealed declaration recorded");
        assert_eq!(declaration.elements.len(), 2);
    }

    #[test]
    fn struct_without_initializer_gets_memberwise_translation() {
        let declaration = struct_declaration(
            "Point",
            vec![
                Statement::Variable(VariableDeclaration::binding(
                    "x",
                    "Double",
                    Expression::DoubleLiteral {
                        value: 0.0,
                        origin: Provenance::default(),
                    },
                )),
                Statement::Variable(VariableDeclaration::binding(
                    "y",
                    "Double",
                    Expression::DoubleLiteral {
                        value: 0.0,
                        origin: Provenance::default(),
                    },
                )),
            ],
        );
        let mut unit = unit_with(vec![Statement::Struct(declaration)]);
        let mut context = TranspilationContext::default();
        record_functions(&mut unit, &mut context);
        let translation = context
            .get_function_translation("Point", "(Double, Double) -> Point")
            .expect("memberwise initializer recorded");
        assert_eq!(translation.parameters.len(), 2);
        assert_eq!(translation.parameters[0].label, "x");
    }

    #[test]
    fn pure_annotation_lands_in_the_pure_set() {
        let mut declaration = function("area", "Double", Vec::new());
        declaration.annotations = vec!["pure".into()];
        let mut unit = unit_with(vec![Statement::Function(declaration)]);
        let mut context = TranspilationContext::default();
        record_functions(&mut unit, &mut context);
        assert!(context.is_pure_function("area"));
    }

    #[test]
    fn templates_are_extracted_and_carrier_removed() {
        let pattern = Expression::reference("_string");
        let body = vec![
            Statement::Expression {
                expression: pattern.clone(),
                origin: Provenance::default(),
            },
            Statement::Expression {
                expression: Expression::StringLiteral {
                    value: "_string.length".into(),
                    is_multiline: false,
                    origin: Provenance::default(),
                },
                origin: Provenance::default(),
            },
        ];
        let mut carrier = function("templates", "()", Vec::new());
        carrier.statements = Some(body);
        let mut unit = unit_with(vec![Statement::Function(carrier)]);
        let mut context = TranspilationContext::default();
        record_templates(&mut unit, &mut context);
        assert!(unit.declarations.is_empty(), "carrier should be removed");
        assert_eq!(context.templates().len(), 1);
        assert_eq!(context.templates()[0].replacement, "_string.length");
    }
}
