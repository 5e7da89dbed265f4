// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared AST builders for tests. Test-only.

use crate::ast::{
    EnumDeclaration, EnumElement, FunctionDeclaration, FunctionParameter, Provenance, Statement,
    StructDeclaration,
};
use crate::driver::TranspilationUnit;
use ecow::{EcoString, eco_format};

/// An empty unit with a placeholder path.
pub(crate) fn empty_unit() -> TranspilationUnit {
    TranspilationUnit {
        source_path: "test.swift".into(),
        output_path: None,
        declarations: Vec::new(),
        statements: Vec::new(),
    }
}

/// A bare function with an empty body.
pub(crate) fn function(
    prefix: impl Into<EcoString>,
    return_type: impl Into<EcoString>,
    parameters: Vec<FunctionParameter>,
) -> FunctionDeclaration {
    let return_type = return_type.into();
    let parameter_types: Vec<EcoString> =
        parameters.iter().map(|p| p.type_name.clone()).collect();
    FunctionDeclaration {
        prefix: prefix.into(),
        function_type: eco_format!("({}) -> {return_type}", parameter_types.join(", ")),
        parameters,
        return_type,
        generic_types: Vec::new(),
        is_open: false,
        is_implicit: false,
        is_static: false,
        is_mutating: false,
        is_pure: false,
        is_just_protocol_interface: false,
        extends_type: None,
        statements: Some(Vec::new()),
        access: None,
        annotations: Vec::new(),
        origin: Provenance::default(),
    }
}

/// An enum with the given elements and nothing else.
pub(crate) fn enum_declaration(
    name: impl Into<EcoString>,
    elements: Vec<EnumElement>,
) -> EnumDeclaration {
    EnumDeclaration {
        name: name.into(),
        access: None,
        annotations: Vec::new(),
        inherits: Vec::new(),
        elements,
        members: Vec::new(),
        raw_value_type: None,
        origin: Provenance::default(),
    }
}

/// A struct with the given members.
pub(crate) fn struct_declaration(
    name: impl Into<EcoString>,
    members: Vec<Statement>,
) -> StructDeclaration {
    StructDeclaration {
        name: name.into(),
        annotations: Vec::new(),
        access: None,
        inherits: Vec::new(),
        members,
        origin: Provenance::default(),
    }
}
