// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for the transpiler core.
//!
//! The AST is a canonical typed representation wide enough to express both
//! the Swift input and the Kotlin output: the frontend produces it, the
//! rewrite passes transform it in place of Swift semantics, and the emitter
//! serializes it as Kotlin.
//!
//! # Design
//!
//! - **Tagged sums, not a class hierarchy.** Statements and expressions are
//!   each a single enum; pass dispatch is exhaustive pattern matching the
//!   compiler checks.
//! - **No parent pointers.** The pass framework's ancestor stack is the only
//!   authority on "where am I"; see [`crate::pass`].
//! - **Provenance is not identity.** Every node carries a [`Provenance`]
//!   (optional frontend syntax handle + optional source range) that compares
//!   equal to any other provenance, so structural equality ignores where a
//!   node came from. Synthesized nodes simply carry an empty provenance.
//!
//! # Example
//!
//! ```
//! use swiftkt_core::ast::{Expression, Provenance};
//!
//! // Source: a ?? b — right-associated by the frontend.
//! let fallback = Expression::BinaryOperator {
//!     left: Box::new(Expression::reference("a")),
//!     right: Box::new(Expression::reference("b")),
//!     operator: "??".into(),
//!     type_name: Some("Int".into()),
//!     origin: Provenance::default(),
//! };
//! assert_eq!(fallback, fallback.clone());
//! ```

use crate::source_range::SourceRange;
use ecow::EcoString;

/// Opaque handle into the frontend's syntax tree.
///
/// The core never inspects it; it exists so the index oracle can be asked
/// about a node (e.g. [`crate::driver::TypeOracle::parent_type`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxHandle(pub u32);

/// Where a node came from: an optional frontend syntax handle and an optional
/// source range.
///
/// Compares equal to every other provenance. Two nodes that differ only in
/// source position are the same node — this is what makes structural
/// deduplication (if-let hoisting) and the run-twice-is-a-no-op property
/// behave.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Handle for index-oracle queries, if the frontend supplied one.
    pub handle: Option<SyntaxHandle>,
    /// Source range for diagnostics and the output line-map.
    pub range: Option<SourceRange>,
}

impl Provenance {
    /// Provenance consisting of a source range only.
    #[must_use]
    pub const fn from_range(range: SourceRange) -> Self {
        Self {
            handle: None,
            range: Some(range),
        }
    }
}

impl PartialEq for Provenance {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Provenance {}

/// The radix an integer literal was written in. Preserved in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    /// Plain decimal.
    #[default]
    Decimal,
    /// `0x` prefixed.
    Hexadecimal,
    /// `0b` prefixed.
    Binary,
}

impl Radix {
    /// The literal prefix for this radix (empty for decimal).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Decimal => "",
            Self::Hexadecimal => "0x",
            Self::Binary => "0b",
        }
    }
}

// ── Statements ────────────────────────────────────────────────────────────────

/// A statement (including declarations).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A comment carried through to the output.
    Comment {
        /// Comment text without delimiters.
        content: EcoString,
        /// Node provenance.
        origin: Provenance,
    },
    /// An expression in statement position.
    Expression {
        /// The expression.
        expression: Expression,
        /// Node provenance.
        origin: Provenance,
    },
    /// `typealias Name = Existing`.
    TypeAlias {
        /// The new name.
        identifier: EcoString,
        /// The aliased type.
        type_name: EcoString,
        /// Declared access level, if any.
        access: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// An extension of an existing type. Eliminated by the remove-extensions
    /// pass; reaching the emitter is an error.
    Extension(ExtensionDeclaration),
    /// A module import. Has no Kotlin counterpart; emits nothing.
    Import {
        /// The imported module.
        module_name: EcoString,
        /// Node provenance.
        origin: Provenance,
    },
    /// A class declaration.
    Class(ClassDeclaration),
    /// A companion object gathering the static members of a type.
    CompanionObject(CompanionObject),
    /// An enum declaration (either kind, see [`EnumDeclaration`]).
    Enum(EnumDeclaration),
    /// A protocol declaration; emitted as a Kotlin interface.
    Protocol(ProtocolDeclaration),
    /// A struct declaration; emitted as a Kotlin data class.
    Struct(StructDeclaration),
    /// A function declaration.
    Function(FunctionDeclaration),
    /// An initializer declaration.
    Initializer(InitializerDeclaration),
    /// A variable declaration (stored or computed).
    Variable(VariableDeclaration),
    /// A `do` block; emitted as `try`.
    Do(DoStatement),
    /// A `catch` clause following a `do`.
    Catch(CatchStatement),
    /// `for x in xs { … }`.
    ForEach(ForEachStatement),
    /// `while c { … }`.
    While(WhileStatement),
    /// `if`/`guard` with a condition list and optional else chain.
    If(IfStatement),
    /// `switch`; emitted as `when`.
    Switch(SwitchStatement),
    /// `defer { … }`. No Kotlin equivalent; see the warning passes.
    Defer {
        /// The deferred body.
        statements: Vec<Statement>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `throw e`.
    Throw {
        /// The thrown expression.
        expression: Expression,
        /// Node provenance.
        origin: Provenance,
    },
    /// `return`, with an optional value and an optional Kotlin label.
    Return(ReturnStatement),
    /// `break`.
    Break {
        /// Node provenance.
        origin: Provenance,
    },
    /// `continue`.
    Continue {
        /// Node provenance.
        origin: Provenance,
    },
    /// `lhs = rhs`.
    Assignment(AssignmentStatement),
    /// Sentinel for a recoverable failure; rendered as `<<Error>>`.
    Error {
        /// Node provenance (the original node's range).
        origin: Provenance,
    },
}

impl Statement {
    /// The provenance of this statement.
    #[must_use]
    pub fn origin(&self) -> &Provenance {
        match self {
            Self::Comment { origin, .. }
            | Self::Expression { origin, .. }
            | Self::TypeAlias { origin, .. }
            | Self::Import { origin, .. }
            | Self::Defer { origin, .. }
            | Self::Throw { origin, .. }
            | Self::Break { origin }
            | Self::Continue { origin }
            | Self::Error { origin } => origin,
            Self::Extension(d) => &d.origin,
            Self::Class(d) => &d.origin,
            Self::CompanionObject(d) => &d.origin,
            Self::Enum(d) => &d.origin,
            Self::Protocol(d) => &d.origin,
            Self::Struct(d) => &d.origin,
            Self::Function(d) => &d.origin,
            Self::Initializer(d) => &d.function.origin,
            Self::Variable(d) => &d.origin,
            Self::Do(d) => &d.origin,
            Self::Catch(d) => &d.origin,
            Self::ForEach(d) => &d.origin,
            Self::While(d) => &d.origin,
            Self::If(d) => &d.origin,
            Self::Switch(d) => &d.origin,
            Self::Return(d) => &d.origin,
            Self::Assignment(d) => &d.origin,
        }
    }

    /// The source range of this statement, if it has one.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.origin().range
    }
}

/// An `extension T { … }` wrapper around members to be inlined into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDeclaration {
    /// The extended type, possibly generic (`Box<T>`).
    pub type_name: EcoString,
    /// The extension's members.
    pub members: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    /// The class name.
    pub name: EcoString,
    /// Source annotations (`open`, `final`, explicit access, …).
    pub annotations: Vec<EcoString>,
    /// Access level after the access-modifiers pass; `None` means unstated.
    pub access: Option<EcoString>,
    /// Whether the class is open. Populated by the open-declarations pass and
    /// meaningless before it runs.
    pub is_open: bool,
    /// Declared inheritances (superclass and protocols), in source order.
    pub inherits: Vec<EcoString>,
    /// Member declarations.
    pub members: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A companion object synthesized by the static-members pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionObject {
    /// The gathered static members.
    pub members: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// An enum declaration.
///
/// Classified by the enum-recording pass into one of two target shapes:
/// an *enum class* (all elements nullary, no superclass) or a *sealed class*
/// (any element carries associated values).
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    /// The enum name.
    pub name: EcoString,
    /// Access level.
    pub access: Option<EcoString>,
    /// Source annotations.
    pub annotations: Vec<EcoString>,
    /// Declared inheritances. Raw-representable types are removed by the
    /// clean-inheritances pass.
    pub inherits: Vec<EcoString>,
    /// The enum's elements (cases).
    pub elements: Vec<EnumElement>,
    /// Non-element members (methods, computed properties, …).
    pub members: Vec<Statement>,
    /// The raw-value type (`Int`, `String`, …) when the enum is
    /// raw-representable. Recorded by the implicit-raw-values pass before the
    /// superclass is cleaned away.
    pub raw_value_type: Option<EcoString>,
    /// Node provenance.
    pub origin: Provenance,
}

/// One enum case.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumElement {
    /// The case name as written in source (lower camel case).
    pub name: EcoString,
    /// Associated values; non-empty makes the whole enum a sealed class.
    pub associated_values: Vec<LabeledType>,
    /// The raw value, explicit or filled in by the implicit-raw-values pass.
    pub raw_value: Option<Expression>,
    /// Source annotations on the case.
    pub annotations: Vec<EcoString>,
}

/// A protocol declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDeclaration {
    /// The protocol name.
    pub name: EcoString,
    /// Access level.
    pub access: Option<EcoString>,
    /// Source annotations.
    pub annotations: Vec<EcoString>,
    /// Member requirements.
    pub members: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclaration {
    /// The struct name.
    pub name: EcoString,
    /// Source annotations.
    pub annotations: Vec<EcoString>,
    /// Access level.
    pub access: Option<EcoString>,
    /// Declared inheritances (protocols only; structs have no superclass).
    pub inherits: Vec<EcoString>,
    /// Member declarations.
    pub members: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    /// The function name without its parameter list.
    pub prefix: EcoString,
    /// Declared parameters.
    pub parameters: Vec<FunctionParameter>,
    /// The declared return type.
    pub return_type: EcoString,
    /// The full function type, e.g. `(Int, String) -> Bool`.
    pub function_type: EcoString,
    /// Generic parameter names, including any constraints as written.
    pub generic_types: Vec<EcoString>,
    /// Whether the function is open. See [`ClassDeclaration::is_open`].
    pub is_open: bool,
    /// Whether the frontend synthesized this declaration.
    pub is_implicit: bool,
    /// Whether the function is static.
    pub is_static: bool,
    /// Whether the function is a mutating value-type method.
    pub is_mutating: bool,
    /// Whether the function is known side-effect free.
    pub is_pure: bool,
    /// Set by the protocol-contents pass: the declaration is a bodyless
    /// interface requirement.
    pub is_just_protocol_interface: bool,
    /// When the function came from an extension: the extended type, so the
    /// emitter prints `fun T.name(…)`.
    pub extends_type: Option<EcoString>,
    /// The body; `None` for requirements without one.
    pub statements: Option<Vec<Statement>>,
    /// Access level.
    pub access: Option<EcoString>,
    /// Source annotations (`override`, `operator`, `pure`, …).
    pub annotations: Vec<EcoString>,
    /// Node provenance.
    pub origin: Provenance,
}

impl FunctionDeclaration {
    /// Structural equality ignoring the name prefix.
    ///
    /// Initializers conventionally carry the prefix `init`, which is not part
    /// of their identity.
    #[must_use]
    pub fn eq_ignoring_prefix(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && self.return_type == other.return_type
            && self.function_type == other.function_type
            && self.generic_types == other.generic_types
            && self.is_open == other.is_open
            && self.is_implicit == other.is_implicit
            && self.is_static == other.is_static
            && self.is_mutating == other.is_mutating
            && self.is_pure == other.is_pure
            && self.is_just_protocol_interface == other.is_just_protocol_interface
            && self.extends_type == other.extends_type
            && self.statements == other.statements
            && self.access == other.access
            && self.annotations == other.annotations
    }
}

/// An initializer: a refinement of [`FunctionDeclaration`] carrying the
/// extracted super-call and the failability flag.
#[derive(Debug, Clone)]
pub struct InitializerDeclaration {
    /// The underlying function. Its `prefix` is conventionally `init`.
    pub function: FunctionDeclaration,
    /// The `super.init(…)` call extracted by the super-calls-to-headers pass,
    /// emitted as a `: super(…)` constructor header.
    pub super_call: Option<Expression>,
    /// Whether the initializer is failable (`init?`).
    pub is_optional: bool,
}

impl PartialEq for InitializerDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.function.eq_ignoring_prefix(&other.function)
            && self.super_call == other.super_call
            && self.is_optional == other.is_optional
    }
}

/// A parameter of a declared function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    /// The implementation (internal) name; what the Kotlin output uses.
    pub label: EcoString,
    /// The call-site label, when the parameter is labeled at call sites.
    /// `None` means the argument is passed positionally.
    pub api_label: Option<EcoString>,
    /// The parameter type as a Swift type string.
    pub type_name: EcoString,
    /// The default value, when the parameter may be omitted.
    pub value: Option<Expression>,
    /// Whether the parameter is variadic.
    pub is_variadic: bool,
}

impl FunctionParameter {
    /// A plain labeled parameter with no default.
    #[must_use]
    pub fn named(label: impl Into<EcoString>, type_name: impl Into<EcoString>) -> Self {
        let label = label.into();
        Self {
            api_label: Some(label.clone()),
            label,
            type_name: type_name.into(),
            value: None,
            is_variadic: false,
        }
    }

    /// A positional (unlabeled at call sites) parameter.
    #[must_use]
    pub fn positional(label: impl Into<EcoString>, type_name: impl Into<EcoString>) -> Self {
        Self {
            label: label.into(),
            api_label: None,
            type_name: type_name.into(),
            value: None,
            is_variadic: false,
        }
    }
}

/// A variable declaration, stored or computed.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The variable name.
    pub identifier: EcoString,
    /// The declared type as a Swift type string.
    pub type_name: EcoString,
    /// The initializer expression, if any.
    pub expression: Option<Expression>,
    /// Custom getter, for computed properties.
    pub getter: Option<FunctionDeclaration>,
    /// Custom setter.
    pub setter: Option<FunctionDeclaration>,
    /// Access level.
    pub access: Option<EcoString>,
    /// Whether the variable is open. See [`ClassDeclaration::is_open`].
    pub is_open: bool,
    /// `let` vs `var`; decides `val` vs `var` in the output.
    pub is_let: bool,
    /// Whether the variable is static.
    pub is_static: bool,
    /// When the variable came from an extension: the extended type.
    pub extends_type: Option<EcoString>,
    /// Source annotations.
    pub annotations: Vec<EcoString>,
    /// Node provenance.
    pub origin: Provenance,
}

impl VariableDeclaration {
    /// A `let` binding with an initializer and no accessors.
    #[must_use]
    pub fn binding(
        identifier: impl Into<EcoString>,
        type_name: impl Into<EcoString>,
        expression: Expression,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            type_name: type_name.into(),
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
        }
    }
}

/// A `do` block.
#[derive(Debug, Clone, PartialEq)]
pub struct DoStatement {
    /// The block body.
    pub statements: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A `catch` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchStatement {
    /// The caught-error binding. `None` until the catch-variable-synthesis
    /// pass supplies `_error: Error`.
    pub variable: Option<VariableDeclaration>,
    /// The clause body.
    pub statements: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A `for x in xs` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    /// The loop binding (an identifier or a tuple of identifiers).
    pub variable: Expression,
    /// The iterated collection.
    pub collection: Expression,
    /// The loop body.
    pub statements: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A `while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The loop condition.
    pub condition: Expression,
    /// The loop body.
    pub statements: Vec<Statement>,
    /// Node provenance.
    pub origin: Provenance,
}

/// One condition of an `if`/`guard`: either a boolean expression or an
/// optional-binding declaration (`let x = …`).
#[derive(Debug, Clone, PartialEq)]
pub enum IfCondition {
    /// A boolean condition.
    Condition(Expression),
    /// An `if let` binding. Eliminated by the rearrange-if-lets pass.
    Declaration(VariableDeclaration),
}

/// An `if` or `guard` statement.
///
/// The else chain is modeled as a nested `IfStatement`: an `else if` carries
/// conditions, a plain `else` carries none.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The conditions, combined with `&&` in the output. Evaluated left to
    /// right with short-circuit; only the first may have side effects without
    /// a warning.
    pub conditions: Vec<IfCondition>,
    /// The then-branch body.
    pub statements: Vec<Statement>,
    /// The else branch, possibly itself carrying conditions (`else if`).
    pub else_statement: Option<Box<IfStatement>>,
    /// Whether this was a `guard`. Cleared by the double-negatives pass.
    pub is_guard: bool,
    /// Node provenance.
    pub origin: Provenance,
}

/// One case of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// The case expressions; empty for `default`.
    pub expressions: Vec<Expression>,
    /// The case body. The source language requires it to be non-empty.
    pub statements: Vec<Statement>,
}

/// A `switch` statement, emitted as `when`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The switched-over subject.
    pub expression: Expression,
    /// When the switches-to-expressions pass decides the whole switch is a
    /// single expression, the statement shape it converts to: a `Return`, an
    /// `Assignment`, a `Variable` declaration, or a bare `Expression`
    /// statement (inside single-expression lambdas).
    pub converts_to_expression: Option<Box<Statement>>,
    /// The cases.
    pub cases: Vec<SwitchCase>,
    /// Node provenance.
    pub origin: Provenance,
}

/// A `return` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned value, if any.
    pub expression: Option<Expression>,
    /// A Kotlin return label (`return@map`), added by the returns-in-lambdas
    /// pass.
    pub label: Option<EcoString>,
    /// Node provenance.
    pub origin: Provenance,
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    /// The assignment target.
    pub left: Expression,
    /// The assigned value.
    pub right: Expression,
    /// Node provenance.
    pub origin: Provenance,
}

// ── Expressions ───────────────────────────────────────────────────────────────

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An opaque Kotlin snippet, produced by template substitution.
    LiteralCode {
        /// The snippet text, emitted verbatim.
        string: EcoString,
        /// The snippet's type, when known.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// Two expressions joined in the output with no separator.
    Concatenation {
        /// Left part.
        left: Box<Expression>,
        /// Right part.
        right: Box<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `(e)`.
    Parentheses {
        /// The wrapped expression.
        expression: Box<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `e!`, emitted as `e!!`.
    ForceUnwrap {
        /// The unwrapped expression.
        expression: Box<Expression>,
        /// The resulting (unwrapped) type.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `e?` in a chain; the emitter renders the `?` and the enclosing dot
    /// supplies the `.`.
    OptionalChain {
        /// The chained expression.
        expression: Box<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A reference to a declared name.
    DeclarationReference(DeclarationReference),
    /// A reference to a type, e.g. in `as`/`is` right-hand sides.
    TypeReference {
        /// The referenced type as a Swift type string.
        type_name: EcoString,
        /// Node provenance.
        origin: Provenance,
    },
    /// `e[i, …]`.
    Subscript {
        /// The subscripted expression.
        subscripted: Box<Expression>,
        /// The index tuple.
        indices: Vec<LabeledExpression>,
        /// The element type.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// An array literal.
    Array {
        /// The elements.
        elements: Vec<Expression>,
        /// The array type as a Swift type string.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A dictionary literal; `keys` and `values` are parallel.
    Dictionary {
        /// The keys.
        keys: Vec<Expression>,
        /// The values, parallel to `keys`.
        values: Vec<Expression>,
        /// The dictionary type as a Swift type string.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `return` in expression position (`x ?: return`).
    ReturnExpression {
        /// The returned value, if any.
        expression: Option<Box<Expression>>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `left.right`.
    Dot {
        /// The receiver.
        left: Box<Expression>,
        /// The member.
        right: Box<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A binary operation. Associativity is not encoded; the frontend
    /// right-associates recursively.
    BinaryOperator {
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
        /// The operator symbol.
        operator: EcoString,
        /// The result type.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A prefix unary operation.
    PrefixUnary {
        /// The operand.
        operand: Box<Expression>,
        /// The operator symbol.
        operator: EcoString,
        /// The result type.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A postfix unary operation.
    PostfixUnary {
        /// The operand.
        operand: Box<Expression>,
        /// The operator symbol.
        operator: EcoString,
        /// The result type.
        type_name: Option<EcoString>,
        /// Node provenance.
        origin: Provenance,
    },
    /// `c ? a : b`, emitted as `if (c) a else b`.
    IfTernary {
        /// The condition.
        condition: Box<Expression>,
        /// Value when true.
        then_expression: Box<Expression>,
        /// Value when false.
        else_expression: Box<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A call.
    Call(CallExpression),
    /// A closure.
    Closure(ClosureExpression),
    /// An integer literal.
    IntegerLiteral {
        /// The value.
        value: i64,
        /// The radix it was written in.
        radix: Radix,
        /// Node provenance.
        origin: Provenance,
    },
    /// An unsigned integer literal; emitted with the `u` suffix.
    UIntegerLiteral {
        /// The value.
        value: u64,
        /// The radix it was written in.
        radix: Radix,
        /// Node provenance.
        origin: Provenance,
    },
    /// A double literal.
    DoubleLiteral {
        /// The value.
        value: f64,
        /// Node provenance.
        origin: Provenance,
    },
    /// A float literal; emitted with the `f` suffix.
    FloatLiteral {
        /// The value.
        value: f32,
        /// Node provenance.
        origin: Provenance,
    },
    /// A boolean literal.
    BoolLiteral {
        /// The value.
        value: bool,
        /// Node provenance.
        origin: Provenance,
    },
    /// A string literal.
    StringLiteral {
        /// The text, unescaped.
        value: EcoString,
        /// Whether the source used a multiline (`"""`) literal.
        is_multiline: bool,
        /// Node provenance.
        origin: Provenance,
    },
    /// A character literal.
    CharacterLiteral {
        /// The character text, unescaped.
        value: EcoString,
        /// Node provenance.
        origin: Provenance,
    },
    /// `nil`, emitted as `null`.
    NilLiteral {
        /// Node provenance.
        origin: Provenance,
    },
    /// An interpolated string. String-literal segments are emitted raw;
    /// other segments are wrapped in `${…}`.
    InterpolatedString {
        /// The segments, in order.
        segments: Vec<Expression>,
        /// Node provenance.
        origin: Provenance,
    },
    /// A tuple of optionally labeled expressions.
    Tuple(TupleExpression),
    /// Sentinel for a recoverable failure; rendered as `<<Error>>`.
    Error {
        /// Node provenance (the original node's range).
        origin: Provenance,
    },
}

/// A reference to a declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationReference {
    /// The referenced identifier.
    pub identifier: EcoString,
    /// The reference's type, when the frontend knows it.
    pub type_name: Option<EcoString>,
    /// Whether the declaration lives in the source standard library.
    /// References still flagged after template replacement draw a warning.
    pub is_standard_library: bool,
    /// Whether the reference is an implicit member (`.north`), to be
    /// qualified against the expected enum type.
    pub is_implicit: bool,
    /// Node provenance.
    pub origin: Provenance,
}

/// A call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The called function expression.
    pub function: Box<Expression>,
    /// The argument tuple.
    pub arguments: TupleExpression,
    /// The call's result type.
    pub type_name: Option<EcoString>,
    /// Whether the call site may take a trailing closure.
    pub allows_trailing_closure: bool,
    /// Whether the called function is known side-effect free.
    pub is_pure: bool,
    /// Node provenance.
    pub origin: Provenance,
}

/// A closure expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureExpression {
    /// The closure parameters.
    pub parameters: Vec<LabeledType>,
    /// The body.
    pub statements: Vec<Statement>,
    /// The closure's function type.
    pub type_name: EcoString,
    /// Whether the closure appeared as a trailing closure at its call site.
    pub is_trailing: bool,
    /// Node provenance.
    pub origin: Provenance,
}

/// A tuple expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleExpression {
    /// The elements, each optionally labeled.
    pub pairs: Vec<LabeledExpression>,
    /// Node provenance.
    pub origin: Provenance,
}

impl TupleExpression {
    /// A tuple from bare (unlabeled) expressions.
    #[must_use]
    pub fn unlabeled(expressions: Vec<Expression>) -> Self {
        Self {
            pairs: expressions
                .into_iter()
                .map(|expression| LabeledExpression {
                    label: None,
                    expression,
                })
                .collect(),
            origin: Provenance::default(),
        }
    }
}

/// An optionally labeled expression (a call argument or tuple element).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExpression {
    /// The label, if present.
    pub label: Option<EcoString>,
    /// The expression.
    pub expression: Expression,
}

/// An optionally labeled type (a closure parameter or associated value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledType {
    /// The label, if present.
    pub label: Option<EcoString>,
    /// The type as a Swift type string.
    pub type_name: EcoString,
}

impl Expression {
    /// A plain reference to `identifier` with no known type.
    #[must_use]
    pub fn reference(identifier: impl Into<EcoString>) -> Self {
        Self::DeclarationReference(DeclarationReference {
            identifier: identifier.into(),
            type_name: None,
            is_standard_library: false,
            is_implicit: false,
            origin: Provenance::default(),
        })
    }

    /// A typed reference to `identifier`.
    #[must_use]
    pub fn typed_reference(
        identifier: impl Into<EcoString>,
        type_name: impl Into<EcoString>,
    ) -> Self {
        Self::DeclarationReference(DeclarationReference {
            identifier: identifier.into(),
            type_name: Some(type_name.into()),
            is_standard_library: false,
            is_implicit: false,
            origin: Provenance::default(),
        })
    }

    /// An opaque Kotlin snippet with no known type.
    #[must_use]
    pub fn literal_code(string: impl Into<EcoString>) -> Self {
        Self::LiteralCode {
            string: string.into(),
            type_name: None,
            origin: Provenance::default(),
        }
    }

    /// The provenance of this expression.
    #[must_use]
    pub fn origin(&self) -> &Provenance {
        match self {
            Self::LiteralCode { origin, .. }
            | Self::Concatenation { origin, .. }
            | Self::Parentheses { origin, .. }
            | Self::ForceUnwrap { origin, .. }
            | Self::OptionalChain { origin, .. }
            | Self::TypeReference { origin, .. }
            | Self::Subscript { origin, .. }
            | Self::Array { origin, .. }
            | Self::Dictionary { origin, .. }
            | Self::ReturnExpression { origin, .. }
            | Self::Dot { origin, .. }
            | Self::BinaryOperator { origin, .. }
            | Self::PrefixUnary { origin, .. }
            | Self::PostfixUnary { origin, .. }
            | Self::IfTernary { origin, .. }
            | Self::IntegerLiteral { origin, .. }
            | Self::UIntegerLiteral { origin, .. }
            | Self::DoubleLiteral { origin, .. }
            | Self::FloatLiteral { origin, .. }
            | Self::BoolLiteral { origin, .. }
            | Self::StringLiteral { origin, .. }
            | Self::CharacterLiteral { origin, .. }
            | Self::NilLiteral { origin }
            | Self::InterpolatedString { origin, .. }
            | Self::Error { origin } => origin,
            Self::DeclarationReference(d) => &d.origin,
            Self::Call(d) => &d.origin,
            Self::Closure(d) => &d.origin,
            Self::Tuple(d) => &d.origin,
        }
    }

    /// The source range of this expression, if it has one.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.origin().range
    }

    /// The expression's Swift type, as far as the tree knows it.
    ///
    /// Literals report their intrinsic types; wrappers delegate to their
    /// payload; everything else reports the type the frontend attached, or
    /// `None`.
    #[must_use]
    pub fn type_name(&self) -> Option<EcoString> {
        match self {
            Self::LiteralCode { type_name, .. }
            | Self::ForceUnwrap { type_name, .. }
            | Self::Subscript { type_name, .. }
            | Self::Array { type_name, .. }
            | Self::Dictionary { type_name, .. }
            | Self::BinaryOperator { type_name, .. }
            | Self::PrefixUnary { type_name, .. }
            | Self::PostfixUnary { type_name, .. } => type_name.clone(),
            Self::DeclarationReference(d) => d.type_name.clone(),
            Self::Call(d) => d.type_name.clone(),
            Self::Closure(d) => Some(d.type_name.clone()),
            Self::TypeReference { type_name, .. } => Some(type_name.clone()),
            Self::Parentheses { expression, .. } | Self::OptionalChain { expression, .. } => {
                expression.type_name()
            }
            Self::Dot { right, .. } => right.type_name(),
            Self::IfTernary {
                then_expression, ..
            } => then_expression.type_name(),
            Self::ReturnExpression { expression, .. } => {
                expression.as_ref().and_then(|e| e.type_name())
            }
            Self::IntegerLiteral { .. } => Some("Int".into()),
            Self::UIntegerLiteral { .. } => Some("UInt".into()),
            Self::DoubleLiteral { .. } => Some("Double".into()),
            Self::FloatLiteral { .. } => Some("Float".into()),
            Self::BoolLiteral { .. } => Some("Bool".into()),
            Self::StringLiteral { .. } | Self::InterpolatedString { .. } => Some("String".into()),
            Self::CharacterLiteral { .. } => Some("Character".into()),
            Self::Concatenation { .. }
            | Self::NilLiteral { .. }
            | Self::Tuple(_)
            | Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_range::SourceRange;

    #[test]
    fn provenance_is_not_identity() {
        let with_range = Expression::DeclarationReference(DeclarationReference {
            identifier: "x".into(),
            type_name: None,
            is_standard_library: false,
            is_implicit: false,
            origin: Provenance::from_range(SourceRange::new(1, 1, 1, 2)),
        });
        let synthesized = Expression::reference("x");
        assert_eq!(with_range, synthesized);
    }

    #[test]
    fn equality_is_reflexive_and_symmetric() {
        let call = Expression::Call(CallExpression {
            function: Box::new(Expression::reference("print")),
            arguments: TupleExpression::unlabeled(vec![Expression::StringLiteral {
                value: "hi".into(),
                is_multiline: false,
                origin: Provenance::default(),
            }]),
            type_name: Some("()".into()),
            allows_trailing_closure: false,
            is_pure: false,
            origin: Provenance::default(),
        });
        let copy = call.clone();
        assert_eq!(call, call);
        assert_eq!(call, copy);
        assert_eq!(copy, call);
    }

    #[test]
    fn differing_identifiers_are_unequal() {
        assert_ne!(Expression::reference("a"), Expression::reference("b"));
    }

    #[test]
    fn initializer_prefix_is_ignored_by_equality() {
        let function = FunctionDeclaration {
            prefix: "init".into(),
            parameters: Vec::new(),
            return_type: "Foo".into(),
            function_type: "() -> Foo".into(),
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
        };
        let mut renamed = function.clone();
        renamed.prefix = "somethingElse".into();
        let a = InitializerDeclaration {
            function,
            super_call: None,
            is_optional: false,
        };
        let b = InitializerDeclaration {
            function: renamed,
            super_call: None,
            is_optional: false,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn literal_types_are_intrinsic() {
        let literal = Expression::IntegerLiteral {
            value: 3,
            radix: Radix::Decimal,
            origin: Provenance::default(),
        };
        assert_eq!(literal.type_name().as_deref(), Some("Int"));

        let string = Expression::StringLiteral {
            value: "s".into(),
            is_multiline: false,
            origin: Provenance::default(),
        };
        assert_eq!(string.type_name().as_deref(), Some("String"));
    }

    #[test]
    fn dot_type_comes_from_member() {
        let dot = Expression::Dot {
            left: Box::new(Expression::reference("point")),
            right: Box::new(Expression::typed_reference("x", "Double")),
            origin: Provenance::default(),
        };
        assert_eq!(dot.type_name().as_deref(), Some("Double"));
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(Radix::Decimal.prefix(), "");
        assert_eq!(Radix::Hexadecimal.prefix(), "0x");
        assert_eq!(Radix::Binary.prefix(), "0b");
    }
}
