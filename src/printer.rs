//! TypeScript rendering of a generated module.
//!
//! Layout follows what the TypeScript printer produces for the same tree:
//! one entry per line inside object literals, four-space indentation, double
//! quoted strings, no trailing commas.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::assemble::{GeneratedModule, Import, ModuleItem};
use crate::emit::EmittedDeclaration;
use crate::expr::{Literal, ValidatorExpr};

const INDENT: &str = "    ";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

pub fn render_module(module: &GeneratedModule) -> String {
    let printer = Printer { namespace: module.namespace() };
    let mut out = String::new();
    for item in &module.items {
        match item {
            ModuleItem::Import(import) => out.push_str(&render_import(import)),
            ModuleItem::Blank => {}
            ModuleItem::Declaration(decl) => out.push_str(&printer.declaration(decl)),
        }
        out.push('\n');
    }
    out
}

/// Render one expression. `namespace` qualifies every builtin when set.
pub fn render_expr(expr: &ValidatorExpr, namespace: Option<&str>) -> String {
    Printer { namespace }.expr(expr, 0)
}

fn render_import(import: &Import) -> String {
    match import {
        Import::Types { names, from } => format!("import type {{ {} }} from {};", names.join(", "), quote(from)),
        Import::Namespace { alias, from } => format!("import * as {alias} from {};", quote(from)),
        Import::Named { names, from } => format!("import {{ {} }} from {};", names.join(", "), quote(from)),
    }
}

struct Printer<'m> {
    namespace: Option<&'m str>,
}

impl Printer<'_> {
    fn declaration(&self, decl: &EmittedDeclaration) -> String {
        let Some(expr) = &decl.expr else {
            // `const` requires an initializer
            return format!("let {};", decl.binding_name);
        };
        let annotation = match &decl.result_type {
            Some(ty) => format!(": {ty}"),
            None => String::new(),
        };
        format!("const {}{annotation} = {};", decl.binding_name, self.expr(expr, 0))
    }

    fn expr(&self, expr: &ValidatorExpr, depth: usize) -> String {
        match expr {
            ValidatorExpr::BuiltinCall { builtin, args } => {
                let callee = match self.namespace {
                    Some(ns) => format!("{ns}.{}", builtin.name()),
                    None => builtin.name().to_string(),
                };
                if builtin.is_value() && args.is_empty() {
                    return callee;
                }
                let args: Vec<String> = args.iter().map(|arg| self.expr(arg, depth)).collect();
                format!("{callee}({})", args.join(", "))
            }
            ValidatorExpr::Identifier { name } => name.clone(),
            ValidatorExpr::Literal { value } => literal(value),
            ValidatorExpr::ObjectLiteral { entries } => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let inner = INDENT.repeat(depth + 1);
                let lines: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{inner}{}: {}", property_key(key), self.expr(value, depth + 1)))
                    .collect();
                format!("{{\n{}\n{}}}", lines.join(",\n"), INDENT.repeat(depth))
            }
        }
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::String(s) => quote(s),
        Literal::Number(n) => n.to_string(),
    }
}

fn property_key(key: &str) -> String {
    if IDENTIFIER.is_match(key) { key.to_string() } else { quote(key) }
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
