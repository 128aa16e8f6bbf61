//! Module assembly: symbol-table pass, one compiled binding per declaration,
//! then the imports the compiled bindings actually need.

use serde::{Deserialize, Serialize};

use crate::compile::{Compiler, SymbolUsage};
use crate::config::CompileConfig;
use crate::descriptor::SourceModule;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::emit::{emit_declaration, EmittedDeclaration, DECODER_TYPE};
use crate::symbols::SymbolTable;

/// Module specifier of the runtime validation library.
pub const LIBRARY_MODULE: &str = "decoders";
/// Local alias for the namespaced import style.
pub const NAMESPACE_ALIAS: &str = "decoders";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "camelCase")]
pub enum ModuleItem {
    Import(Import),
    /// Separator line.
    Blank,
    Declaration(EmittedDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "import", rename_all = "camelCase")]
pub enum Import {
    /// Type-only import for annotations.
    Types { names: Vec<String>, from: String },
    Namespace { alias: String, from: String },
    Named { names: Vec<String>, from: String },
}

/// The emission tree handed to a printer, plus what was lost on the way.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedModule {
    pub items: Vec<ModuleItem>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub usage: SymbolUsage,
}

impl GeneratedModule {
    /// Alias every builtin is qualified with, under the namespaced style.
    pub fn namespace(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            ModuleItem::Import(Import::Namespace { alias, .. }) => Some(alias.as_str()),
            _ => None,
        })
    }

    pub fn declarations(&self) -> impl Iterator<Item = &EmittedDeclaration> {
        self.items.iter().filter_map(|item| match item {
            ModuleItem::Declaration(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.items.iter().filter_map(|item| match item {
            ModuleItem::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn skipped_nodes(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }
}

pub fn assemble(module: &SourceModule, config: &CompileConfig) -> GeneratedModule {
    let symbols = SymbolTable::collect(&module.declarations);
    let mut compiler = Compiler::new(config, &symbols);

    let declarations: Vec<EmittedDeclaration> = module
        .declarations
        .iter()
        .map(|decl| emit_declaration(&mut compiler, decl))
        .collect();
    let run = compiler.finish();

    let mut diagnostics: Vec<Diagnostic> = symbols
        .duplicates()
        .iter()
        .map(|name| Diagnostic {
            path: name.clone(),
            kind: DiagnosticKind::DuplicateDeclaration { name: name.clone() },
        })
        .collect();
    diagnostics.extend(run.diagnostics);
    let initialized: Vec<bool> = declarations.iter().map(EmittedDeclaration::is_initialized).collect();
    diagnostics.extend(symbols.check_references(&run.references, &initialized));

    let mut items = Vec::with_capacity(declarations.len() * 2 + 3);
    if initialized.contains(&true) {
        items.push(ModuleItem::Import(Import::Types {
            names: vec![DECODER_TYPE.to_string()],
            from: LIBRARY_MODULE.to_string(),
        }));
    }
    if config.named_import_style {
        if !run.usage.is_empty() {
            items.push(ModuleItem::Import(Import::Named {
                names: run.usage.names().into_iter().map(String::from).collect(),
                from: LIBRARY_MODULE.to_string(),
            }));
        }
    } else {
        items.push(ModuleItem::Import(Import::Namespace {
            alias: NAMESPACE_ALIAS.to_string(),
            from: LIBRARY_MODULE.to_string(),
        }));
    }

    for decl in declarations {
        if !items.is_empty() {
            items.push(ModuleItem::Blank);
        }
        items.push(ModuleItem::Declaration(decl));
    }

    tracing::debug!(
        declarations = module.declarations.len(),
        builtins = run.usage.len(),
        diagnostics = diagnostics.len(),
        "assembled module"
    );

    GeneratedModule { items, diagnostics, usage: run.usage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Field, TypeDeclaration, TypeDescriptor};

    fn module(decls: Vec<TypeDeclaration>) -> SourceModule {
        SourceModule { declarations: decls }
    }

    #[test]
    fn namespaced_layout() {
        let src = module(vec![
            TypeDeclaration::new("Foo", TypeDescriptor::string()),
            TypeDeclaration::new("Bar", TypeDescriptor::record([Field::required("foo", TypeDescriptor::reference("Foo"))])),
        ]);
        let out = assemble(&src, &CompileConfig::default());
        let kinds: Vec<&str> = out
            .items
            .iter()
            .map(|item| match item {
                ModuleItem::Import(Import::Types { .. }) => "types",
                ModuleItem::Import(Import::Namespace { .. }) => "namespace",
                ModuleItem::Import(Import::Named { .. }) => "named",
                ModuleItem::Blank => "blank",
                ModuleItem::Declaration(_) => "decl",
            })
            .collect();
        assert_eq!(kinds, vec!["types", "namespace", "blank", "decl", "blank", "decl"]);
        assert_eq!(out.namespace(), Some("decoders"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn named_imports_list_exactly_the_used_builtins() {
        let src = module(vec![TypeDeclaration::new(
            "Bar",
            TypeDescriptor::record([
                Field::required("a", TypeDescriptor::string()),
                Field::optional("b", TypeDescriptor::number()),
            ]),
        )]);
        let config = CompileConfig { named_import_style: true, ..CompileConfig::default() };
        let out = assemble(&src, &config);
        let named: Vec<&Import> = out.imports().filter(|i| matches!(i, Import::Named { .. })).collect();
        assert_eq!(
            named,
            vec![&Import::Named {
                names: vec!["number".into(), "object".into(), "optional".into(), "string".into()],
                from: "decoders".into(),
            }],
        );
        assert_eq!(out.namespace(), None);
    }

    #[test]
    fn uninitialized_only_module_has_no_type_import() {
        let src = module(vec![TypeDeclaration::new("Token", TypeDescriptor::unsupported("intersection"))]);
        let out = assemble(&src, &CompileConfig { named_import_style: true, ..CompileConfig::default() });
        assert_eq!(out.imports().count(), 0);
        assert_eq!(out.declarations().count(), 1);
        assert_eq!(out.skipped_nodes(), 1);
    }

    #[test]
    fn duplicate_declarations_are_flagged_but_kept() {
        let src = module(vec![
            TypeDeclaration::new("Foo", TypeDescriptor::string()),
            TypeDeclaration::new("Foo", TypeDescriptor::number()),
        ]);
        let out = assemble(&src, &CompileConfig::default());
        assert_eq!(out.declarations().count(), 2);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::DuplicateDeclaration { name: "Foo".into() });
    }

    #[test]
    fn backward_references_are_clean() {
        let src = module(vec![
            TypeDeclaration::new("Employee", TypeDescriptor::string()),
            TypeDeclaration::new("Payroll", TypeDescriptor::array(TypeDescriptor::reference("Employee"))),
        ]);
        let out = assemble(&src, &CompileConfig::default());
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    }

    #[test]
    fn load_order_hazards_are_flagged_without_reordering() {
        let src = module(vec![
            TypeDeclaration::new("Payroll", TypeDescriptor::array(TypeDescriptor::reference("Employee"))),
            TypeDeclaration::new("Employee", TypeDescriptor::string()),
            TypeDeclaration::new("Id", TypeDescriptor::unsupported("intersection")),
            TypeDeclaration::new("Wrap", TypeDescriptor::array(TypeDescriptor::reference("Id"))),
        ]);
        let out = assemble(&src, &CompileConfig::default());
        let bindings: Vec<&str> = out.declarations().map(|d| d.binding_name.as_str()).collect();
        assert_eq!(bindings, vec!["payrollDecoder", "employeeDecoder", "idDecoder", "wrapDecoder"]);
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic {
                    path: "Id".into(),
                    kind: DiagnosticKind::DeclarationUninitialized {
                        reason: crate::diagnostics::SkipReason::UnsupportedSyntax("intersection".into()),
                    },
                },
                Diagnostic { path: "Payroll[]".into(), kind: DiagnosticKind::ForwardReference { name: "Employee".into() } },
                Diagnostic { path: "Wrap[]".into(), kind: DiagnosticKind::UninitializedReference { name: "Id".into() } },
            ],
        );
        assert_eq!(out.skipped_nodes(), 1);
    }

    #[test]
    fn items_round_trip_through_json() {
        let src = module(vec![TypeDeclaration::new("Foo", TypeDescriptor::number_literal(83))]);
        let out = assemble(&src, &CompileConfig::default());
        let json = serde_json::to_string(&out.items).unwrap();
        let back: Vec<ModuleItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out.items);
    }
}
