//! Static purity check for embeddable configuration functions.
//!
//! A function is pure here iff its body references no identifiers outside its
//! own parameters, its variable declarators, and a fixed allow-list of
//! globals, and never references `this`. The check is a flat walk over the
//! function body, not scope analysis: the local set is exactly the outer
//! parameters plus every variable-declarator identifier anywhere in the body,
//! and every other identifier counts as used. A nested function's parameters,
//! a nested function declaration's name, and a named function expression's
//! own name are therefore all "used but not local" and make the function
//! impure. That is deliberately conservative and must stay that way.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, BindingPatternKind, Expression, FormalParameters, FunctionBody,
    IdentifierReference, Statement, ThisExpression, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::warn;

/// Globals a pure function may reference.
const ALLOWED_IDENTIFIER_REFERENCES: &[&str] = &[
    "console",
    "Math",
    "Error",
    "AssertionError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "SystemError",
    "TypeError",
    "Date",
    "JSON",
    "Number",
    "String",
    "Boolean",
    "parseInt",
    "parseFloat",
];

/// Outcome of checking one function's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purity {
    /// Used identifiers outside the local set and the allow-list, sorted.
    pub closed_over: Vec<String>,
    /// Whether any `this` expression appears anywhere in the function body.
    pub references_this: bool,
}

impl Purity {
    pub fn is_pure(&self) -> bool {
        self.closed_over.is_empty() && !self.references_this
    }
}

/// Convenience wrapper around [`check_function_source`].
pub fn is_pure_function(source: &str) -> Result<bool> {
    Ok(check_function_source(source)?.is_pure())
}

/// Check the source text of exactly one function: a declaration, a
/// (possibly named or async) function expression, or an arrow expression.
///
/// An anonymous `function` expression is not valid as a standalone statement,
/// so when the direct parse fails the source is retried wrapped in
/// parentheses. Fails when the source does not parse either way, or when the
/// program contains anything other than a single function.
pub fn check_function_source(source: &str) -> Result<Purity> {
    if let Some(purity) = analyze_program(source)? {
        return Ok(purity);
    }

    let wrapped = format!("({source})");
    match analyze_program(&wrapped)? {
        Some(purity) => Ok(purity),
        None => bail!("failed to parse function source: {source}"),
    }
}

/// Parse and analyze one candidate program. `Ok(None)` means the parse
/// failed (caller may retry a wrapped form); shape violations are hard
/// errors.
fn analyze_program(source_text: &str) -> Result<Option<Purity>> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source_text, SourceType::mjs()).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Ok(None);
    }
    let program = parsed.program;

    if program.body.len() != 1 {
        bail!("function source must contain exactly one top-level statement");
    }
    let Some((params, body)) = lone_function(&program.body[0]) else {
        bail!("function source must define a single function");
    };

    let mut walker = BodyWalker::default();
    for param in &params.items {
        if let BindingPatternKind::BindingIdentifier(id) = &param.pattern.kind {
            walker.locals.insert(id.name.to_string());
        }
    }
    if let Some(body) = body {
        walker.visit_function_body(body);
    }

    let closed_over: Vec<String> = walker.used.difference(&walker.locals).cloned().collect();
    for name in &closed_over {
        warn!(
            identifier = name.as_str(),
            "function references disallowed identifier; allowed globals are {:?}",
            ALLOWED_IDENTIFIER_REFERENCES
        );
    }
    if walker.references_this {
        warn!("function references `this`, which is disallowed in pure functions");
    }

    Ok(Some(Purity {
        closed_over,
        references_this: walker.references_this,
    }))
}

fn lone_function<'a, 'b>(
    statement: &'b Statement<'a>,
) -> Option<(&'b FormalParameters<'a>, Option<&'b FunctionBody<'a>>)> {
    match statement {
        Statement::FunctionDeclaration(function) => {
            Some((&*function.params, function.body.as_deref()))
        }
        Statement::ExpressionStatement(expression_statement) => {
            match expression_statement.expression.get_inner_expression() {
                Expression::FunctionExpression(function) => {
                    Some((&*function.params, function.body.as_deref()))
                }
                Expression::ArrowFunctionExpression(arrow) => {
                    Some((&*arrow.params, Some(&*arrow.body)))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Flat identifier walk over a function body. Binding identifiers and
/// identifier references both count as used; only plain variable-declarator
/// identifiers also count as local. Property names and object keys are not
/// identifier references and are never visited as such.
#[derive(Default)]
struct BodyWalker {
    locals: BTreeSet<String>,
    used: BTreeSet<String>,
    references_this: bool,
}

impl BodyWalker {
    fn record(&mut self, name: &str) {
        if !ALLOWED_IDENTIFIER_REFERENCES.contains(&name) {
            self.used.insert(name.to_string());
        }
    }
}

impl<'a> Visit<'a> for BodyWalker {
    fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
        if let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind {
            self.locals.insert(id.name.to_string());
        }
        walk::walk_variable_declarator(self, declarator);
    }

    fn visit_binding_identifier(&mut self, identifier: &BindingIdentifier<'a>) {
        self.record(identifier.name.as_str());
    }

    fn visit_identifier_reference(&mut self, identifier: &IdentifierReference<'a>) {
        self.record(identifier.name.as_str());
    }

    fn visit_this_expression(&mut self, _expression: &ThisExpression) {
        self.references_this = true;
    }
}
