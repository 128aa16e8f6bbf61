//! Binding names for generated decoders, and the table of declared types
//! collected before any body is compiled.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::descriptor::TypeDeclaration;
use crate::diagnostics::{Diagnostic, DiagnosticKind};

const DECODER_SUFFIX: &str = "Decoder";

/// `Employee` → `employeeDecoder`.
///
/// Used both to name a binding and to resolve a reference to it.
pub fn decoder_name_of(type_name: &str) -> String {
    let mut chars = type_name.chars();
    let mut out = String::with_capacity(type_name.len() + DECODER_SUFFIX.len());
    if let Some(first) = chars.next() {
        out.extend(first.to_lowercase());
        out.push_str(chars.as_str());
    }
    out.push_str(DECODER_SUFFIX);
    out
}

/// Declared type name → binding name and position, plus names declared
/// more than once.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    duplicates: Vec<String>,
}

#[derive(Debug, Clone)]
struct Symbol {
    binding: String,
    /// Index of the first declaration with this name.
    position: usize,
}

/// A resolved reference met while compiling the declaration at `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub name: String,
    pub path: String,
    pub from: usize,
}

impl SymbolTable {
    pub fn collect<'a, I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = &'a TypeDeclaration>,
    {
        let mut table = SymbolTable::default();
        for (position, decl) in declarations.into_iter().enumerate() {
            match table.symbols.entry(decl.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Symbol { binding: decoder_name_of(&decl.name), position });
                }
                Entry::Occupied(_) => {
                    if !table.duplicates.contains(&decl.name) {
                        table.duplicates.push(decl.name.clone());
                    }
                }
            }
        }
        table
    }

    pub fn binding_of(&self, type_name: &str) -> Option<&str> {
        self.symbols.get(type_name).map(|symbol| symbol.binding.as_str())
    }

    pub fn position_of(&self, type_name: &str) -> Option<usize> {
        self.symbols.get(type_name).map(|symbol| symbol.position)
    }

    /// Names declared more than once, in order of first repeat.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Bindings are emitted in declaration order, so a reference only works
    /// at load time if its target is initialized and declared earlier.
    /// `initialized[i]` tells whether declaration `i` got a decoder.
    pub fn check_references(&self, sites: &[ReferenceSite], initialized: &[bool]) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for site in sites {
            let Some(target) = self.position_of(&site.name) else {
                continue;
            };
            let name = site.name.clone();
            let kind = if target >= site.from {
                DiagnosticKind::ForwardReference { name }
            } else if !initialized.get(target).copied().unwrap_or(false) {
                DiagnosticKind::UninitializedReference { name }
            } else {
                continue;
            };
            out.push(Diagnostic { path: site.path.clone(), kind });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;

    #[test]
    fn lowercases_only_the_first_character() {
        assert_eq!(decoder_name_of("Foo"), "fooDecoder");
        assert_eq!(decoder_name_of("HTML"), "hTMLDecoder");
        assert_eq!(decoder_name_of("already"), "alreadyDecoder");
        assert_eq!(decoder_name_of("Ünicode"), "ünicodeDecoder");
        assert_eq!(decoder_name_of(""), "Decoder");
    }

    #[test]
    fn collects_every_declaration_up_front() {
        let decls = vec![
            TypeDeclaration::new("Payroll", TypeDescriptor::reference("Employee")),
            TypeDeclaration::new("Employee", TypeDescriptor::string()),
            TypeDeclaration::new("Employee", TypeDescriptor::number()),
        ];
        let table = SymbolTable::collect(&decls);
        assert_eq!(table.binding_of("Employee"), Some("employeeDecoder"));
        assert_eq!(table.position_of("Payroll"), Some(0));
        assert_eq!(table.position_of("Employee"), Some(1));
        assert_eq!(table.binding_of("Date"), None);
        assert_eq!(table.duplicates(), ["Employee".to_string()]);
    }

    fn site(name: &str, path: &str, from: usize) -> ReferenceSite {
        ReferenceSite { name: name.into(), path: path.into(), from }
    }

    #[test]
    fn later_and_self_references_are_forward() {
        let decls = vec![
            TypeDeclaration::new("Payroll", TypeDescriptor::array(TypeDescriptor::reference("Employee"))),
            TypeDeclaration::new("Employee", TypeDescriptor::string()),
            TypeDeclaration::new("Node", TypeDescriptor::reference("Node")),
            TypeDeclaration::new("Team", TypeDescriptor::reference("Employee")),
        ];
        let table = SymbolTable::collect(&decls);
        let sites = [site("Employee", "Payroll[]", 0), site("Node", "Node", 2), site("Employee", "Team", 3)];
        let found = table.check_references(&sites, &[true, true, true, true]);
        assert_eq!(
            found,
            vec![
                Diagnostic { path: "Payroll[]".into(), kind: DiagnosticKind::ForwardReference { name: "Employee".into() } },
                Diagnostic { path: "Node".into(), kind: DiagnosticKind::ForwardReference { name: "Node".into() } },
            ],
        );
    }

    #[test]
    fn references_to_uninitialized_bindings_are_flagged() {
        let decls = vec![
            TypeDeclaration::new("Id", TypeDescriptor::unsupported("intersection")),
            TypeDeclaration::new("Wrap", TypeDescriptor::array(TypeDescriptor::reference("Id"))),
        ];
        let table = SymbolTable::collect(&decls);
        let found = table.check_references(&[site("Id", "Wrap[]", 1)], &[false, true]);
        assert_eq!(
            found,
            vec![Diagnostic { path: "Wrap[]".into(), kind: DiagnosticKind::UninitializedReference { name: "Id".into() } }],
        );
        assert!(!found[0].is_skip());
    }
}
