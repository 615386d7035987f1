//! Import specifier scanning for plain scripts.
//!
//! Recognized forms:
//!
//! ```js
//! import x from 'a';          import { y } from "b";
//! import 'c';                 export * from 'd';
//! export { z } from 'e';      import('f');
//! require('g');
//! ```
//!
//! The script is parsed, so text inside comments, strings and template
//! literals is never an import. Only literal specifiers count, and `require`
//! only as a plain function call (`loader.require('x')` is not one).

use super::error::{BuildError, BuildResult};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression, StringLiteral,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::{ops::Range, path::Path};

/// One import specifier found in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    /// Byte range of the specifier text, without quotes
    pub span: Range<usize>,
}

#[derive(Default)]
struct ImportCollector {
    imports: Vec<ImportRef>,
}

impl ImportCollector {
    fn push(&mut self, literal: &StringLiteral<'_>) {
        let (start, end) = (literal.span.start as usize, literal.span.end as usize);
        if end < start + 2 {
            return;
        }
        self.imports.push(ImportRef {
            specifier: literal.value.to_string(),
            span: start + 1..end - 1,
        });
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.push(&decl.source);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.push(&decl.source);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            self.push(source);
        }
        // `export const x = require('a')`
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(source) = &expr.source {
            self.push(source);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee
            && callee.name == "require"
            && call.arguments.len() == 1
            && let Some(Argument::StringLiteral(source)) = call.arguments.first()
        {
            self.push(source);
        }
        walk::walk_call_expression(self, call);
    }
}

/// Every import occurrence, in source order.
///
/// # Errors
/// `BuildError::Compile` when `source` is not a parsable module.
pub fn find_imports(source: &str, path: &Path) -> BuildResult<Vec<ImportRef>> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true).with_jsx(true);
    let ret = Parser::new(&allocator, source, source_type).parse();

    if let Some(error) = ret.errors.first() {
        return Err(BuildError::compile(path, format!("cannot parse script: {error}")));
    }

    let mut collector = ImportCollector::default();
    collector.visit_program(&ret.program);

    let mut imports = collector.imports;
    imports.sort_by_key(|import| import.span.start);
    Ok(imports)
}

/// Unique import specifiers, in order of first appearance.
pub fn scan_imports(source: &str, path: &Path) -> BuildResult<Vec<String>> {
    let mut seen = Vec::new();
    for import in find_imports(source, path)? {
        if !seen.contains(&import.specifier) {
            seen.push(import.specifier);
        }
    }
    Ok(seen)
}
