// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The compositional tree-rewrite framework.
//!
//! A pass is a stateful traversal bound to one AST plus the frozen context.
//! Each node variant has two hook families:
//!
//! - `replace_*` — returns zero, one, or more replacement statements (or a
//!   replacement expression). Overriding this replaces the node wholesale.
//! - `process_*` — receives the variant's payload and returns a rewritten
//!   payload. Overriding this keeps the node's identity but changes fields.
//!
//! Every hook has a default that continues recursion by delegating to the
//! matching `walk_*` free function, so an override can rewrite what it cares
//! about and call `walk_*` to recurse into children — the standard Rust
//! visitor idiom.
//!
//! # The ancestor stack
//!
//! The AST carries no parent pointers. Instead the [`Traversal`] maintains a
//! stack of [`Ancestor`] descriptors pushed on entry to every composite node
//! and popped on all exit paths (the scoping is closure-based, so a hook
//! cannot forget the pop). Passes query [`Traversal::parent`],
//! [`Traversal::ancestors`], [`Traversal::is_top_level_node`], and
//! [`Traversal::enclosing_type_name`].
//!
//! # Unexpected structure
//!
//! Dispatch is an exhaustive `match`, so the "variant missing from the
//! dispatch table" failure class of the original design cannot occur. A pass
//! that encounters a variant it was specified to have eliminated converts it
//! with [`Traversal::unexpected_statement`] /
//! [`Traversal::unexpected_expression`]: an `Error` sentinel plus an error
//! diagnostic, and the pipeline continues.

use crate::ast::{
    AssignmentStatement, CallExpression, CatchStatement, ClassDeclaration, ClosureExpression,
    CompanionObject, DeclarationReference, DoStatement, EnumDeclaration, Expression,
    ExtensionDeclaration, ForEachStatement, FunctionDeclaration, IfCondition, IfStatement,
    InitializerDeclaration, LabeledExpression, ProtocolDeclaration, Provenance, ReturnStatement,
    Statement, StructDeclaration, SwitchCase, SwitchStatement, TupleExpression,
    VariableDeclaration, WhileStatement,
};
use crate::context::TranspilationContext;
use crate::diagnostics::Diagnostics;
use crate::driver::TypeOracle;
use ecow::EcoString;

/// A lightweight descriptor of an enclosing node, pushed while its children
/// are being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ancestor {
    /// Enclosing class, with its name.
    Class(EcoString),
    /// Enclosing struct, with its name.
    Struct(EcoString),
    /// Enclosing enum, with its name.
    Enum(EcoString),
    /// Enclosing protocol, with its name.
    Protocol(EcoString),
    /// Enclosing extension, with the extended type.
    Extension(EcoString),
    /// Enclosing companion object.
    CompanionObject,
    /// Enclosing function, with its name.
    Function(EcoString),
    /// Enclosing initializer.
    Initializer,
    /// Enclosing variable declaration, with its identifier.
    Variable(EcoString),
    /// Enclosing expression statement.
    ExpressionStatement,
    /// Enclosing `do` block.
    Do,
    /// Enclosing `catch` clause.
    Catch,
    /// Enclosing for-each body or collection.
    ForEach,
    /// The binding position of a for-each loop.
    ForEachVariable,
    /// Enclosing while loop.
    While,
    /// Enclosing if statement.
    If,
    /// Enclosing switch statement.
    Switch,
    /// Enclosing defer block.
    Defer,
    /// Enclosing throw statement.
    Throw,
    /// Enclosing return statement.
    Return,
    /// Enclosing assignment statement.
    Assignment,
    /// Enclosing concatenation expression.
    Concatenation,
    /// Enclosing parentheses.
    Parentheses,
    /// Enclosing force unwrap.
    ForceUnwrap,
    /// Enclosing optional chain.
    OptionalChain,
    /// Enclosing subscript.
    Subscript,
    /// Enclosing array literal.
    Array,
    /// Enclosing dictionary literal.
    Dictionary,
    /// Enclosing return-expression.
    ReturnExpression,
    /// Enclosing dot expression.
    Dot,
    /// Enclosing binary operator, with its symbol.
    BinaryOperator(EcoString),
    /// Enclosing prefix unary operator.
    PrefixUnary,
    /// Enclosing postfix unary operator.
    PostfixUnary,
    /// Enclosing ternary.
    IfTernary,
    /// Enclosing call (both its function and its argument list).
    Call,
    /// Enclosing closure body.
    Closure,
    /// Enclosing interpolated string.
    InterpolatedString,
    /// Enclosing free-standing tuple.
    Tuple,
}

impl Ancestor {
    /// The type name this ancestor contributes to the fully qualified
    /// enclosing type, if it is a type declaration.
    #[must_use]
    pub fn type_name(&self) -> Option<&EcoString> {
        match self {
            Self::Class(name) | Self::Struct(name) | Self::Enum(name) | Self::Extension(name) => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// Shared traversal state threaded through every hook.
pub struct Traversal<'a> {
    /// The frozen cross-file context.
    pub context: &'a TranspilationContext,
    /// The index oracle supplied by the frontend.
    pub oracle: &'a dyn TypeOracle,
    /// Diagnostic sink for this file.
    pub diagnostics: &'a mut Diagnostics,
    ancestors: Vec<Ancestor>,
    replacing_statements: bool,
}

impl<'a> Traversal<'a> {
    /// Creates traversal state over a frozen context.
    #[must_use]
    pub fn new(
        context: &'a TranspilationContext,
        oracle: &'a dyn TypeOracle,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            context,
            oracle,
            diagnostics,
            ancestors: Vec::new(),
            replacing_statements: false,
        }
    }

    /// The immediate parent of the node currently being rewritten.
    #[must_use]
    pub fn parent(&self) -> Option<&Ancestor> {
        self.ancestors.last()
    }

    /// All enclosing nodes, outermost first.
    #[must_use]
    pub fn ancestors(&self) -> &[Ancestor] {
        &self.ancestors
    }

    /// Whether the pass is in the statement phase of [`run_pass`] (as opposed
    /// to the declarations phase).
    #[must_use]
    pub fn is_replacing_statements(&self) -> bool {
        self.replacing_statements
    }

    /// Whether the current node is a top-level node of the file.
    #[must_use]
    pub fn is_top_level_node(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// The dot-joined names of the enclosing class/struct/enum/extension
    /// declarations, outermost first; `None` outside any type.
    #[must_use]
    pub fn enclosing_type_name(&self) -> Option<EcoString> {
        let names: Vec<&str> = self
            .ancestors
            .iter()
            .filter_map(|a| a.type_name().map(EcoString::as_str))
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(".").into())
        }
    }

    /// Runs `body` with `ancestor` pushed; the pop happens on every exit
    /// path.
    pub fn with_ancestor<T>(
        &mut self,
        ancestor: Ancestor,
        body: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.ancestors.push(ancestor);
        let result = body(self);
        self.ancestors.pop();
        result
    }

    /// Reports an unexpected statement variant and returns the error
    /// sentinel carrying the original provenance.
    pub fn unexpected_statement(
        &mut self,
        message: impl Into<EcoString>,
        origin: Provenance,
    ) -> Statement {
        self.diagnostics.error(message, origin.range);
        Statement::Error { origin }
    }

    /// Reports an unexpected expression variant and returns the error
    /// sentinel carrying the original provenance.
    pub fn unexpected_expression(
        &mut self,
        message: impl Into<EcoString>,
        origin: Provenance,
    ) -> Expression {
        self.diagnostics.error(message, origin.range);
        Expression::Error { origin }
    }
}

/// A second-round rewrite pass.
///
/// Every hook defaults to continuing recursion; override only what the pass
/// rewrites. Overrides may call the matching `walk_*` function to recurse.
#[allow(unused_variables)]
pub trait RewritePass {
    /// The pass name, for tracing.
    fn name(&self) -> &'static str;

    // ── Statement hooks ──────────────────────────────────────────────────────

    /// Rewrites a statement list. Override for sibling-aware rewrites.
    fn replace_statements(
        &mut self,
        t: &mut Traversal<'_>,
        statements: Vec<Statement>,
    ) -> Vec<Statement> {
        walk_statements(self, t, statements)
    }

    /// Dispatches one statement to its variant hook.
    fn replace_statement(&mut self, t: &mut Traversal<'_>, statement: Statement) -> Vec<Statement> {
        walk_statement(self, t, statement)
    }

    /// Rewrites a comment.
    fn replace_comment(
        &mut self,
        t: &mut Traversal<'_>,
        content: EcoString,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::Comment { content, origin }]
    }

    /// Rewrites an expression statement.
    fn replace_expression_statement(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Expression,
        origin: Provenance,
    ) -> Vec<Statement> {
        let expression = t.with_ancestor(Ancestor::ExpressionStatement, |t| {
            self.replace_expression(t, expression)
        });
        vec![Statement::Expression { expression, origin }]
    }

    /// Rewrites a typealias.
    fn replace_type_alias(
        &mut self,
        t: &mut Traversal<'_>,
        identifier: EcoString,
        type_name: EcoString,
        access: Option<EcoString>,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::TypeAlias {
            identifier,
            type_name,
            access,
            origin,
        }]
    }

    /// Rewrites an extension.
    fn replace_extension(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ExtensionDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Extension(self.process_extension(t, declaration))]
    }

    /// Rewrites an extension's payload.
    fn process_extension(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ExtensionDeclaration,
    ) -> ExtensionDeclaration {
        walk_extension(self, t, declaration)
    }

    /// Rewrites an import.
    fn replace_import(
        &mut self,
        t: &mut Traversal<'_>,
        module_name: EcoString,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::Import {
            module_name,
            origin,
        }]
    }

    /// Rewrites a class declaration.
    fn replace_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ClassDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Class(
            self.process_class_declaration(t, declaration),
        )]
    }

    /// Rewrites a class declaration's payload.
    fn process_class_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ClassDeclaration,
    ) -> ClassDeclaration {
        walk_class_declaration(self, t, declaration)
    }

    /// Rewrites a companion object.
    fn replace_companion_object(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: CompanionObject,
    ) -> Vec<Statement> {
        vec![Statement::CompanionObject(
            self.process_companion_object(t, declaration),
        )]
    }

    /// Rewrites a companion object's payload.
    fn process_companion_object(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: CompanionObject,
    ) -> CompanionObject {
        walk_companion_object(self, t, declaration)
    }

    /// Rewrites an enum declaration.
    fn replace_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: EnumDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Enum(
            self.process_enum_declaration(t, declaration),
        )]
    }

    /// Rewrites an enum declaration's payload.
    fn process_enum_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: EnumDeclaration,
    ) -> EnumDeclaration {
        walk_enum_declaration(self, t, declaration)
    }

    /// Rewrites a protocol declaration.
    fn replace_protocol_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ProtocolDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Protocol(
            self.process_protocol_declaration(t, declaration),
        )]
    }

    /// Rewrites a protocol declaration's payload.
    fn process_protocol_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: ProtocolDeclaration,
    ) -> ProtocolDeclaration {
        walk_protocol_declaration(self, t, declaration)
    }

    /// Rewrites a struct declaration.
    fn replace_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: StructDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Struct(
            self.process_struct_declaration(t, declaration),
        )]
    }

    /// Rewrites a struct declaration's payload.
    fn process_struct_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: StructDeclaration,
    ) -> StructDeclaration {
        walk_struct_declaration(self, t, declaration)
    }

    /// Rewrites a function declaration.
    fn replace_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: FunctionDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Function(
            self.process_function_declaration(t, declaration),
        )]
    }

    /// Rewrites a function declaration's payload.
    fn process_function_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: FunctionDeclaration,
    ) -> FunctionDeclaration {
        walk_function_declaration(self, t, declaration)
    }

    /// Rewrites an initializer declaration.
    fn replace_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: InitializerDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Initializer(
            self.process_initializer_declaration(t, declaration),
        )]
    }

    /// Rewrites an initializer declaration's payload.
    fn process_initializer_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: InitializerDeclaration,
    ) -> InitializerDeclaration {
        walk_initializer_declaration(self, t, declaration)
    }

    /// Rewrites a variable declaration.
    fn replace_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: VariableDeclaration,
    ) -> Vec<Statement> {
        vec![Statement::Variable(
            self.process_variable_declaration(t, declaration),
        )]
    }

    /// Rewrites a variable declaration's payload.
    fn process_variable_declaration(
        &mut self,
        t: &mut Traversal<'_>,
        declaration: VariableDeclaration,
    ) -> VariableDeclaration {
        walk_variable_declaration(self, t, declaration)
    }

    /// Rewrites a `do` block.
    fn replace_do_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: DoStatement,
    ) -> Vec<Statement> {
        vec![Statement::Do(self.process_do_statement(t, statement))]
    }

    /// Rewrites a `do` block's payload.
    fn process_do_statement(&mut self, t: &mut Traversal<'_>, statement: DoStatement) -> DoStatement {
        walk_do_statement(self, t, statement)
    }

    /// Rewrites a `catch` clause.
    fn replace_catch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: CatchStatement,
    ) -> Vec<Statement> {
        vec![Statement::Catch(self.process_catch_statement(t, statement))]
    }

    /// Rewrites a `catch` clause's payload.
    fn process_catch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: CatchStatement,
    ) -> CatchStatement {
        walk_catch_statement(self, t, statement)
    }

    /// Rewrites a for-each loop.
    fn replace_for_each_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: ForEachStatement,
    ) -> Vec<Statement> {
        vec![Statement::ForEach(
            self.process_for_each_statement(t, statement),
        )]
    }

    /// Rewrites a for-each loop's payload.
    fn process_for_each_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: ForEachStatement,
    ) -> ForEachStatement {
        walk_for_each_statement(self, t, statement)
    }

    /// Rewrites a while loop.
    fn replace_while_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: WhileStatement,
    ) -> Vec<Statement> {
        vec![Statement::While(
            self.process_while_statement(t, statement),
        )]
    }

    /// Rewrites a while loop's payload.
    fn process_while_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: WhileStatement,
    ) -> WhileStatement {
        walk_while_statement(self, t, statement)
    }

    /// Rewrites an if/guard statement.
    fn replace_if_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: IfStatement,
    ) -> Vec<Statement> {
        vec![Statement::If(self.process_if_statement(t, statement))]
    }

    /// Rewrites an if/guard statement's payload.
    fn process_if_statement(&mut self, t: &mut Traversal<'_>, statement: IfStatement) -> IfStatement {
        walk_if_statement(self, t, statement)
    }

    /// Rewrites a switch statement.
    fn replace_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> Vec<Statement> {
        vec![Statement::Switch(
            self.process_switch_statement(t, statement),
        )]
    }

    /// Rewrites a switch statement's payload.
    fn process_switch_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: SwitchStatement,
    ) -> SwitchStatement {
        walk_switch_statement(self, t, statement)
    }

    /// Rewrites a defer block.
    fn replace_defer_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statements: Vec<Statement>,
        origin: Provenance,
    ) -> Vec<Statement> {
        let statements =
            t.with_ancestor(Ancestor::Defer, |t| self.replace_statements(t, statements));
        vec![Statement::Defer { statements, origin }]
    }

    /// Rewrites a throw statement.
    fn replace_throw_statement(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Expression,
        origin: Provenance,
    ) -> Vec<Statement> {
        let expression =
            t.with_ancestor(Ancestor::Throw, |t| self.replace_expression(t, expression));
        vec![Statement::Throw { expression, origin }]
    }

    /// Rewrites a return statement.
    fn replace_return_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: ReturnStatement,
    ) -> Vec<Statement> {
        let ReturnStatement {
            expression,
            label,
            origin,
        } = statement;
        let expression = t.with_ancestor(Ancestor::Return, |t| {
            expression.map(|e| self.replace_expression(t, e))
        });
        vec![Statement::Return(ReturnStatement {
            expression,
            label,
            origin,
        })]
    }

    /// Rewrites a break statement.
    fn replace_break_statement(
        &mut self,
        t: &mut Traversal<'_>,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::Break { origin }]
    }

    /// Rewrites a continue statement.
    fn replace_continue_statement(
        &mut self,
        t: &mut Traversal<'_>,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::Continue { origin }]
    }

    /// Rewrites an assignment statement.
    fn replace_assignment_statement(
        &mut self,
        t: &mut Traversal<'_>,
        statement: AssignmentStatement,
    ) -> Vec<Statement> {
        let statement = t.with_ancestor(Ancestor::Assignment, |t| AssignmentStatement {
            left: self.replace_expression(t, statement.left),
            right: self.replace_expression(t, statement.right),
            origin: statement.origin,
        });
        vec![Statement::Assignment(statement)]
    }

    /// Rewrites an error sentinel statement.
    fn replace_error_statement(
        &mut self,
        t: &mut Traversal<'_>,
        origin: Provenance,
    ) -> Vec<Statement> {
        vec![Statement::Error { origin }]
    }

    // ── Expression hooks ─────────────────────────────────────────────────────

    /// Dispatches one expression to its variant hook.
    fn replace_expression(&mut self, t: &mut Traversal<'_>, expression: Expression) -> Expression {
        walk_expression(self, t, expression)
    }

    /// Rewrites a literal-code snippet.
    fn replace_literal_code(
        &mut self,
        t: &mut Traversal<'_>,
        string: EcoString,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        Expression::LiteralCode {
            string,
            type_name,
            origin,
        }
    }

    /// Rewrites a concatenation.
    fn replace_concatenation(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Concatenation, |t| Expression::Concatenation {
            left: Box::new(self.replace_expression(t, left)),
            right: Box::new(self.replace_expression(t, right)),
            origin,
        })
    }

    /// Rewrites parentheses.
    fn replace_parentheses(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Expression,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Parentheses, |t| Expression::Parentheses {
            expression: Box::new(self.replace_expression(t, expression)),
            origin,
        })
    }

    /// Rewrites a force unwrap.
    fn replace_force_unwrap(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Expression,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::ForceUnwrap, |t| Expression::ForceUnwrap {
            expression: Box::new(self.replace_expression(t, expression)),
            type_name,
            origin,
        })
    }

    /// Rewrites an optional chain.
    fn replace_optional_chain(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Expression,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::OptionalChain, |t| Expression::OptionalChain {
            expression: Box::new(self.replace_expression(t, expression)),
            origin,
        })
    }

    /// Rewrites a declaration reference.
    fn replace_declaration_reference(
        &mut self,
        t: &mut Traversal<'_>,
        reference: DeclarationReference,
    ) -> Expression {
        Expression::DeclarationReference(self.process_declaration_reference(t, reference))
    }

    /// Rewrites a declaration reference's payload.
    fn process_declaration_reference(
        &mut self,
        t: &mut Traversal<'_>,
        reference: DeclarationReference,
    ) -> DeclarationReference {
        reference
    }

    /// Rewrites a type reference.
    fn replace_type_reference(
        &mut self,
        t: &mut Traversal<'_>,
        type_name: EcoString,
        origin: Provenance,
    ) -> Expression {
        Expression::TypeReference { type_name, origin }
    }

    /// Rewrites a subscript.
    fn replace_subscript(
        &mut self,
        t: &mut Traversal<'_>,
        subscripted: Expression,
        indices: Vec<LabeledExpression>,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Subscript, |t| Expression::Subscript {
            subscripted: Box::new(self.replace_expression(t, subscripted)),
            indices: indices
                .into_iter()
                .map(|pair| LabeledExpression {
                    label: pair.label,
                    expression: self.replace_expression(t, pair.expression),
                })
                .collect(),
            type_name,
            origin,
        })
    }

    /// Rewrites an array literal.
    fn replace_array(
        &mut self,
        t: &mut Traversal<'_>,
        elements: Vec<Expression>,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Array, |t| Expression::Array {
            elements: elements
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            type_name,
            origin,
        })
    }

    /// Rewrites a dictionary literal.
    fn replace_dictionary(
        &mut self,
        t: &mut Traversal<'_>,
        keys: Vec<Expression>,
        values: Vec<Expression>,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Dictionary, |t| Expression::Dictionary {
            keys: keys
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            values: values
                .into_iter()
                .map(|e| self.replace_expression(t, e))
                .collect(),
            type_name,
            origin,
        })
    }

    /// Rewrites a return-expression.
    fn replace_return_expression(
        &mut self,
        t: &mut Traversal<'_>,
        expression: Option<Expression>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::ReturnExpression, |t| Expression::ReturnExpression {
            expression: expression.map(|e| Box::new(self.replace_expression(t, e))),
            origin,
        })
    }

    /// Rewrites a dot expression.
    fn replace_dot(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::Dot, |t| Expression::Dot {
            left: Box::new(self.replace_expression(t, left)),
            right: Box::new(self.replace_expression(t, right)),
            origin,
        })
    }

    /// Rewrites a binary operation.
    fn replace_binary_operator(
        &mut self,
        t: &mut Traversal<'_>,
        left: Expression,
        right: Expression,
        operator: EcoString,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
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

    /// Rewrites a prefix unary operation.
    fn replace_prefix_unary(
        &mut self,
        t: &mut Traversal<'_>,
        operand: Expression,
        operator: EcoString,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::PrefixUnary, |t| Expression::PrefixUnary {
            operand: Box::new(self.replace_expression(t, operand)),
            operator,
            type_name,
            origin,
        })
    }

    /// Rewrites a postfix unary operation.
    fn replace_postfix_unary(
        &mut self,
        t: &mut Traversal<'_>,
        operand: Expression,
        operator: EcoString,
        type_name: Option<EcoString>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::PostfixUnary, |t| Expression::PostfixUnary {
            operand: Box::new(self.replace_expression(t, operand)),
            operator,
            type_name,
            origin,
        })
    }

    /// Rewrites a ternary.
    fn replace_if_ternary(
        &mut self,
        t: &mut Traversal<'_>,
        condition: Expression,
        then_expression: Expression,
        else_expression: Expression,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::IfTernary, |t| Expression::IfTernary {
            condition: Box::new(self.replace_expression(t, condition)),
            then_expression: Box::new(self.replace_expression(t, then_expression)),
            else_expression: Box::new(self.replace_expression(t, else_expression)),
            origin,
        })
    }

    /// Rewrites a call.
    fn replace_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> Expression {
        Expression::Call(self.process_call(t, call))
    }

    /// Rewrites a call's payload.
    fn process_call(&mut self, t: &mut Traversal<'_>, call: CallExpression) -> CallExpression {
        walk_call(self, t, call)
    }

    /// Rewrites a closure.
    fn replace_closure(&mut self, t: &mut Traversal<'_>, closure: ClosureExpression) -> Expression {
        Expression::Closure(self.process_closure(t, closure))
    }

    /// Rewrites a closure's payload.
    fn process_closure(
        &mut self,
        t: &mut Traversal<'_>,
        closure: ClosureExpression,
    ) -> ClosureExpression {
        walk_closure(self, t, closure)
    }

    /// Rewrites a string literal.
    fn replace_string_literal(
        &mut self,
        t: &mut Traversal<'_>,
        value: EcoString,
        is_multiline: bool,
        origin: Provenance,
    ) -> Expression {
        Expression::StringLiteral {
            value,
            is_multiline,
            origin,
        }
    }

    /// Rewrites a character literal.
    fn replace_character_literal(
        &mut self,
        t: &mut Traversal<'_>,
        value: EcoString,
        origin: Provenance,
    ) -> Expression {
        Expression::CharacterLiteral { value, origin }
    }

    /// Rewrites an interpolated string.
    fn replace_interpolated_string(
        &mut self,
        t: &mut Traversal<'_>,
        segments: Vec<Expression>,
        origin: Provenance,
    ) -> Expression {
        t.with_ancestor(Ancestor::InterpolatedString, |t| {
            Expression::InterpolatedString {
                segments: segments
                    .into_iter()
                    .map(|e| self.replace_expression(t, e))
                    .collect(),
                origin,
            }
        })
    }

    /// Rewrites a free-standing tuple.
    fn replace_tuple(&mut self, t: &mut Traversal<'_>, tuple: TupleExpression) -> Expression {
        Expression::Tuple(self.process_tuple(t, tuple))
    }

    /// Rewrites a tuple's payload.
    fn process_tuple(&mut self, t: &mut Traversal<'_>, tuple: TupleExpression) -> TupleExpression {
        walk_tuple(self, t, tuple)
    }
}

// ── Walk functions (default recursion) ───────────────────────────────────────

/// Rewrites each statement of a list, splicing the replacements in order.
pub fn walk_statements<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    statements: Vec<Statement>,
) -> Vec<Statement> {
    statements
        .into_iter()
        .flat_map(|statement| pass.replace_statement(t, statement))
        .collect()
}

/// Dispatches one statement to the matching variant hook.
pub fn walk_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    statement: Statement,
) -> Vec<Statement> {
    match statement {
        Statement::Comment { content, origin } => pass.replace_comment(t, content, origin),
        Statement::Expression { expression, origin } => {
            pass.replace_expression_statement(t, expression, origin)
        }
        Statement::TypeAlias {
            identifier,
            type_name,
            access,
            origin,
        } => pass.replace_type_alias(t, identifier, type_name, access, origin),
        Statement::Extension(declaration) => pass.replace_extension(t, declaration),
        Statement::Import {
            module_name,
            origin,
        } => pass.replace_import(t, module_name, origin),
        Statement::Class(declaration) => pass.replace_class_declaration(t, declaration),
        Statement::CompanionObject(declaration) => pass.replace_companion_object(t, declaration),
        Statement::Enum(declaration) => pass.replace_enum_declaration(t, declaration),
        Statement::Protocol(declaration) => pass.replace_protocol_declaration(t, declaration),
        Statement::Struct(declaration) => pass.replace_struct_declaration(t, declaration),
        Statement::Function(declaration) => pass.replace_function_declaration(t, declaration),
        Statement::Initializer(declaration) => pass.replace_initializer_declaration(t, declaration),
        Statement::Variable(declaration) => pass.replace_variable_declaration(t, declaration),
        Statement::Do(statement) => pass.replace_do_statement(t, statement),
        Statement::Catch(statement) => pass.replace_catch_statement(t, statement),
        Statement::ForEach(statement) => pass.replace_for_each_statement(t, statement),
        Statement::While(statement) => pass.replace_while_statement(t, statement),
        Statement::If(statement) => pass.replace_if_statement(t, statement),
        Statement::Switch(statement) => pass.replace_switch_statement(t, statement),
        Statement::Defer { statements, origin } => {
            pass.replace_defer_statement(t, statements, origin)
        }
        Statement::Throw { expression, origin } => {
            pass.replace_throw_statement(t, expression, origin)
        }
        Statement::Return(statement) => pass.replace_return_statement(t, statement),
        Statement::Break { origin } => pass.replace_break_statement(t, origin),
        Statement::Continue { origin } => pass.replace_continue_statement(t, origin),
        Statement::Assignment(statement) => pass.replace_assignment_statement(t, statement),
        Statement::Error { origin } => pass.replace_error_statement(t, origin),
    }
}

/// Dispatches one expression to the matching variant hook.
pub fn walk_expression<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    expression: Expression,
) -> Expression {
    match expression {
        Expression::LiteralCode {
            string,
            type_name,
            origin,
        } => pass.replace_literal_code(t, string, type_name, origin),
        Expression::Concatenation {
            left,
            right,
            origin,
        } => pass.replace_concatenation(t, *left, *right, origin),
        Expression::Parentheses { expression, origin } => {
            pass.replace_parentheses(t, *expression, origin)
        }
        Expression::ForceUnwrap {
            expression,
            type_name,
            origin,
        } => pass.replace_force_unwrap(t, *expression, type_name, origin),
        Expression::OptionalChain { expression, origin } => {
            pass.replace_optional_chain(t, *expression, origin)
        }
        Expression::DeclarationReference(reference) => {
            pass.replace_declaration_reference(t, reference)
        }
        Expression::TypeReference { type_name, origin } => {
            pass.replace_type_reference(t, type_name, origin)
        }
        Expression::Subscript {
            subscripted,
            indices,
            type_name,
            origin,
        } => pass.replace_subscript(t, *subscripted, indices, type_name, origin),
        Expression::Array {
            elements,
            type_name,
            origin,
        } => pass.replace_array(t, elements, type_name, origin),
        Expression::Dictionary {
            keys,
            values,
            type_name,
            origin,
        } => pass.replace_dictionary(t, keys, values, type_name, origin),
        Expression::ReturnExpression { expression, origin } => {
            pass.replace_return_expression(t, expression.map(|e| *e), origin)
        }
        Expression::Dot {
            left,
            right,
            origin,
        } => pass.replace_dot(t, *left, *right, origin),
        Expression::BinaryOperator {
            left,
            right,
            operator,
            type_name,
            origin,
        } => pass.replace_binary_operator(t, *left, *right, operator, type_name, origin),
        Expression::PrefixUnary {
            operand,
            operator,
            type_name,
            origin,
        } => pass.replace_prefix_unary(t, *operand, operator, type_name, origin),
        Expression::PostfixUnary {
            operand,
            operator,
            type_name,
            origin,
        } => pass.replace_postfix_unary(t, *operand, operator, type_name, origin),
        Expression::IfTernary {
            condition,
            then_expression,
            else_expression,
            origin,
        } => pass.replace_if_ternary(t, *condition, *then_expression, *else_expression, origin),
        Expression::Call(call) => pass.replace_call(t, call),
        Expression::Closure(closure) => pass.replace_closure(t, closure),
        Expression::StringLiteral {
            value,
            is_multiline,
            origin,
        } => pass.replace_string_literal(t, value, is_multiline, origin),
        Expression::CharacterLiteral { value, origin } => {
            pass.replace_character_literal(t, value, origin)
        }
        Expression::InterpolatedString { segments, origin } => {
            pass.replace_interpolated_string(t, segments, origin)
        }
        Expression::Tuple(tuple) => pass.replace_tuple(t, tuple),
        leaf @ (Expression::IntegerLiteral { .. }
        | Expression::UIntegerLiteral { .. }
        | Expression::DoubleLiteral { .. }
        | Expression::FloatLiteral { .. }
        | Expression::BoolLiteral { .. }
        | Expression::NilLiteral { .. }
        | Expression::Error { .. }) => leaf,
    }
}

/// Default recursion for extensions.
pub fn walk_extension<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: ExtensionDeclaration,
) -> ExtensionDeclaration {
    t.with_ancestor(Ancestor::Extension(declaration.type_name.clone()), |t| {
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for classes.
pub fn walk_class_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: ClassDeclaration,
) -> ClassDeclaration {
    t.with_ancestor(Ancestor::Class(declaration.name.clone()), |t| {
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for companion objects.
pub fn walk_companion_object<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: CompanionObject,
) -> CompanionObject {
    t.with_ancestor(Ancestor::CompanionObject, |t| {
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for enums: raw values, then members.
pub fn walk_enum_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: EnumDeclaration,
) -> EnumDeclaration {
    t.with_ancestor(Ancestor::Enum(declaration.name.clone()), |t| {
        for element in &mut declaration.elements {
            if let Some(raw_value) = element.raw_value.take() {
                element.raw_value = Some(pass.replace_expression(t, raw_value));
            }
        }
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for protocols.
pub fn walk_protocol_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: ProtocolDeclaration,
) -> ProtocolDeclaration {
    t.with_ancestor(Ancestor::Protocol(declaration.name.clone()), |t| {
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for structs.
pub fn walk_struct_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: StructDeclaration,
) -> StructDeclaration {
    t.with_ancestor(Ancestor::Struct(declaration.name.clone()), |t| {
        declaration.members = pass.replace_statements(t, declaration.members);
        declaration
    })
}

/// Default recursion for functions: parameter defaults, then the body.
pub fn walk_function_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: FunctionDeclaration,
) -> FunctionDeclaration {
    t.with_ancestor(Ancestor::Function(declaration.prefix.clone()), |t| {
        for parameter in &mut declaration.parameters {
            if let Some(value) = parameter.value.take() {
                parameter.value = Some(pass.replace_expression(t, value));
            }
        }
        declaration.statements = declaration
            .statements
            .map(|statements| pass.replace_statements(t, statements));
        declaration
    })
}

/// Default recursion for initializers.
pub fn walk_initializer_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: InitializerDeclaration,
) -> InitializerDeclaration {
    t.with_ancestor(Ancestor::Initializer, |t| {
        for parameter in &mut declaration.function.parameters {
            if let Some(value) = parameter.value.take() {
                parameter.value = Some(pass.replace_expression(t, value));
            }
        }
        declaration.function.statements = declaration
            .function
            .statements
            .map(|statements| pass.replace_statements(t, statements));
        declaration.super_call = declaration
            .super_call
            .map(|call| pass.replace_expression(t, call));
        declaration
    })
}

/// Default recursion for variable declarations: initializer and accessors.
pub fn walk_variable_declaration<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut declaration: VariableDeclaration,
) -> VariableDeclaration {
    t.with_ancestor(Ancestor::Variable(declaration.identifier.clone()), |t| {
        declaration.expression = declaration
            .expression
            .map(|e| pass.replace_expression(t, e));
        declaration.getter = declaration
            .getter
            .map(|getter| pass.process_function_declaration(t, getter));
        declaration.setter = declaration
            .setter
            .map(|setter| pass.process_function_declaration(t, setter));
        declaration
    })
}

/// Default recursion for `do` blocks.
pub fn walk_do_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: DoStatement,
) -> DoStatement {
    t.with_ancestor(Ancestor::Do, |t| {
        statement.statements = pass.replace_statements(t, statement.statements);
        statement
    })
}

/// Default recursion for `catch` clauses.
pub fn walk_catch_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: CatchStatement,
) -> CatchStatement {
    t.with_ancestor(Ancestor::Catch, |t| {
        statement.variable = statement
            .variable
            .map(|variable| pass.process_variable_declaration(t, variable));
        statement.statements = pass.replace_statements(t, statement.statements);
        statement
    })
}

/// Default recursion for for-each loops.
pub fn walk_for_each_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: ForEachStatement,
) -> ForEachStatement {
    statement.variable = t.with_ancestor(Ancestor::ForEachVariable, |t| {
        pass.replace_expression(t, statement.variable)
    });
    t.with_ancestor(Ancestor::ForEach, |t| {
        statement.collection = pass.replace_expression(t, statement.collection);
        statement.statements = pass.replace_statements(t, statement.statements);
        statement
    })
}

/// Default recursion for while loops.
pub fn walk_while_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: WhileStatement,
) -> WhileStatement {
    t.with_ancestor(Ancestor::While, |t| {
        statement.condition = pass.replace_expression(t, statement.condition);
        statement.statements = pass.replace_statements(t, statement.statements);
        statement
    })
}

/// Default recursion for if/guard statements, including the else chain.
pub fn walk_if_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: IfStatement,
) -> IfStatement {
    t.with_ancestor(Ancestor::If, |t| {
        statement.conditions = statement
            .conditions
            .into_iter()
            .map(|condition| match condition {
                IfCondition::Condition(expression) => {
                    IfCondition::Condition(pass.replace_expression(t, expression))
                }
                IfCondition::Declaration(declaration) => {
                    IfCondition::Declaration(pass.process_variable_declaration(t, declaration))
                }
            })
            .collect();
        statement.statements = pass.replace_statements(t, statement.statements);
        statement.else_statement = statement
            .else_statement
            .map(|else_statement| Box::new(pass.process_if_statement(t, *else_statement)));
        statement
    })
}

/// Default recursion for switch statements.
pub fn walk_switch_statement<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut statement: SwitchStatement,
) -> SwitchStatement {
    t.with_ancestor(Ancestor::Switch, |t| {
        statement.expression = pass.replace_expression(t, statement.expression);
        statement.cases = statement
            .cases
            .into_iter()
            .map(|case| SwitchCase {
                expressions: case
                    .expressions
                    .into_iter()
                    .map(|e| pass.replace_expression(t, e))
                    .collect(),
                statements: pass.replace_statements(t, case.statements),
            })
            .collect();
        statement
    })
}

/// Default recursion for calls: the function, then each argument.
pub fn walk_call<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut call: CallExpression,
) -> CallExpression {
    t.with_ancestor(Ancestor::Call, |t| {
        call.function = Box::new(pass.replace_expression(t, *call.function));
        call.arguments.pairs = call
            .arguments
            .pairs
            .into_iter()
            .map(|pair| LabeledExpression {
                label: pair.label,
                expression: pass.replace_expression(t, pair.expression),
            })
            .collect();
        call
    })
}

/// Default recursion for closures.
pub fn walk_closure<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut closure: ClosureExpression,
) -> ClosureExpression {
    t.with_ancestor(Ancestor::Closure, |t| {
        closure.statements = pass.replace_statements(t, closure.statements);
        closure
    })
}

/// Default recursion for free-standing tuples.
pub fn walk_tuple<P: RewritePass + ?Sized>(
    pass: &mut P,
    t: &mut Traversal<'_>,
    mut tuple: TupleExpression,
) -> TupleExpression {
    t.with_ancestor(Ancestor::Tuple, |t| {
        tuple.pairs = tuple
            .pairs
            .into_iter()
            .map(|pair| LabeledExpression {
                label: pair.label,
                expression: pass.replace_expression(t, pair.expression),
            })
            .collect();
        tuple
    })
}

/// Runs a pass over one translation unit: declarations first, then (with
/// [`Traversal::is_replacing_statements`] set) the top-level statements.
pub fn run_pass<P: RewritePass + ?Sized>(
    pass: &mut P,
    unit: crate::driver::TranspilationUnit,
    context: &TranspilationContext,
    oracle: &dyn TypeOracle,
    diagnostics: &mut Diagnostics,
) -> crate::driver::TranspilationUnit {
    let crate::driver::TranspilationUnit {
        source_path,
        output_path,
        declarations,
        statements,
    } = unit;
    let mut t = Traversal::new(context, oracle, diagnostics);
    let declarations = pass.replace_statements(&mut t, declarations);
    t.replacing_statements = true;
    let statements = pass.replace_statements(&mut t, statements);
    crate::driver::TranspilationUnit {
        source_path,
        output_path,
        declarations,
        statements,
    }
}
