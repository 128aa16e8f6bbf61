//! Union compilation: a discriminated union becomes one `taggedUnion`
//! dispatch, everything else an `either` over the members.

use indexmap::IndexMap;

use super::Compiler;
use crate::descriptor::{Field, TypeDescriptor};
use crate::diagnostics::{DiagnosticKind, Segment};
use crate::expr::{Builtin, ValidatorExpr};

/// How a union will be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionShape<'t> {
    /// Every member is a record whose `tag_field` holds a string literal.
    /// One entry per member, in member order.
    Tagged { tag_field: &'t str, tags: Vec<&'t str> },
    Plain,
}

/// Classify `members`. Tagging needs a configured tag field and unanimity.
pub fn classify<'t>(members: &'t [TypeDescriptor], tag_field: Option<&'t str>) -> UnionShape<'t> {
    let Some(tag_field) = tag_field else {
        return UnionShape::Plain;
    };
    let tags: Option<Vec<&str>> = members
        .iter()
        .map(|member| member.record_field(tag_field).and_then(string_literal_tag))
        .collect();
    match tags {
        Some(tags) => UnionShape::Tagged { tag_field, tags },
        None => UnionShape::Plain,
    }
}

fn string_literal_tag(field: &Field) -> Option<&str> {
    match &field.ty {
        TypeDescriptor::Literal { value } => value.as_str(),
        _ => None,
    }
}

impl Compiler<'_> {
    pub(super) fn compile_union(&mut self, members: &[TypeDescriptor]) -> ValidatorExpr {
        let config = self.config;
        match classify(members, config.tag_field.as_deref()) {
            UnionShape::Tagged { tag_field, tags } => self.compile_tagged(members, tag_field, &tags),
            UnionShape::Plain => self.compile_either(members),
        }
    }

    fn compile_either(&mut self, members: &[TypeDescriptor]) -> ValidatorExpr {
        let mut args = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            self.path.push(Segment::UnionMember(index));
            match self.compile(member) {
                Ok(expr) => args.push(expr),
                Err(reason) => self.report(DiagnosticKind::UnionMemberDropped { index, reason }),
            }
            self.path.pop();
        }
        if args.is_empty() && !members.is_empty() {
            self.report(DiagnosticKind::EmptyUnion);
        }
        self.call(Builtin::Either, args)
    }

    /// Duplicate tags: the last member wins, at the position the tag first
    /// appeared. Overwritten members are never compiled.
    fn compile_tagged(&mut self, members: &[TypeDescriptor], tag_field: &str, tags: &[&str]) -> ValidatorExpr {
        let mut winners: IndexMap<&str, usize> = IndexMap::with_capacity(tags.len());
        for (index, tag) in tags.iter().enumerate() {
            if winners.insert(*tag, index).is_some() {
                self.path.push(Segment::UnionMember(index));
                self.report(DiagnosticKind::DuplicateTag { tag: tag.to_string() });
                self.path.pop();
            }
        }

        let mut entries = IndexMap::with_capacity(winners.len());
        for (tag, index) in winners {
            let TypeDescriptor::Record { fields } = &members[index] else {
                continue;
            };
            self.path.push(Segment::UnionMember(index));
            let expr = self.compile_record(fields);
            self.path.pop();
            entries.insert(tag.to_string(), expr);
        }

        self.call(
            Builtin::TaggedUnion,
            vec![ValidatorExpr::string_literal(tag_field), ValidatorExpr::ObjectLiteral { entries }],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{compile, SymbolUsage};
    use crate::config::CompileConfig;
    use crate::descriptor::{Field, LiteralValue, TypeDeclaration};
    use crate::symbols::SymbolTable;

    fn shape(kind: &str, extra: &str) -> TypeDescriptor {
        TypeDescriptor::record([
            Field::required("kind", TypeDescriptor::string_literal(kind)),
            Field::required(extra, TypeDescriptor::number()),
        ])
    }

    fn tagged_config() -> CompileConfig {
        CompileConfig { tag_field: Some("kind".into()), ..CompileConfig::default() }
    }

    fn entry_keys(expr: &ValidatorExpr) -> Vec<String> {
        match &expr.args()[1] {
            ValidatorExpr::ObjectLiteral { entries } => entries.keys().cloned().collect(),
            other => panic!("expected object literal, got {other:?}"),
        }
    }

    #[test]
    fn no_tag_field_means_plain() {
        let members = vec![shape("circle", "r"), shape("square", "s")];
        assert_eq!(classify(&members, None), UnionShape::Plain);
    }

    #[test]
    fn unanimous_string_tags_are_tagged() {
        let members = vec![shape("circle", "r"), shape("square", "s")];
        assert_eq!(
            classify(&members, Some("kind")),
            UnionShape::Tagged { tag_field: "kind", tags: vec!["circle", "square"] },
        );
    }

    #[test]
    fn one_dissenting_member_falls_back_to_plain() {
        let numeric_tag = TypeDescriptor::record([Field::required("kind", TypeDescriptor::number_literal(1))]);
        let not_a_record = TypeDescriptor::string();
        let missing_tag = TypeDescriptor::record([Field::required("r", TypeDescriptor::number())]);
        for odd in [numeric_tag, not_a_record, missing_tag] {
            let members = vec![shape("circle", "r"), odd];
            assert_eq!(classify(&members, Some("kind")), UnionShape::Plain);
        }
    }

    #[test]
    fn tagged_union_keeps_the_tag_field_in_each_member() {
        let ty = TypeDescriptor::Union { members: vec![shape("circle", "r"), shape("square", "s")] };
        let mut usage = SymbolUsage::new();
        let expr = compile(&ty, &tagged_config(), &mut usage).unwrap();
        assert_eq!(expr.builtin(), Some(Builtin::TaggedUnion));
        assert_eq!(expr.args()[0], ValidatorExpr::string_literal("kind"));
        assert_eq!(entry_keys(&expr), vec!["circle", "square"]);
        assert_eq!(usage.names(), vec!["constant", "number", "object", "taggedUnion"]);
    }

    #[test]
    fn plain_union_drops_uncompilable_members() {
        let ty = TypeDescriptor::Union {
            members: vec![
                TypeDescriptor::reference("BranchCode"),
                TypeDescriptor::Literal { value: LiteralValue::Null },
            ],
        };
        let decl = TypeDeclaration::new("Beneficiary", ty);
        let decls = vec![TypeDeclaration::new("BranchCode", TypeDescriptor::string())];
        let symbols = SymbolTable::collect(&decls);
        let config = tagged_config();
        let mut compiler = Compiler::new(&config, &symbols);
        let expr = compiler.compile_declaration(&decl).unwrap();
        assert_eq!(
            expr,
            ValidatorExpr::BuiltinCall {
                builtin: Builtin::Either,
                args: vec![ValidatorExpr::identifier("branchCodeDecoder")],
            },
        );
        let run = compiler.finish();
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].path, "Beneficiary|1");
    }

    #[test]
    fn duplicate_tags_last_member_wins_in_first_position() {
        let ty = TypeDescriptor::Union {
            members: vec![shape("a", "first"), shape("b", "middle"), shape("a", "last")],
        };
        let decl = TypeDeclaration::new("Dup", ty);
        let config = tagged_config();
        let symbols = SymbolTable::collect(std::slice::from_ref(&decl));
        let mut compiler = Compiler::new(&config, &symbols);
        let expr = compiler.compile_declaration(&decl).unwrap();
        assert_eq!(entry_keys(&expr), vec!["a", "b"]);

        let ValidatorExpr::ObjectLiteral { entries } = &expr.args()[1] else { unreachable!() };
        let ValidatorExpr::ObjectLiteral { entries: winner } = &entries["a"].args()[0] else { unreachable!() };
        assert!(winner.contains_key("last"));
        assert!(!winner.contains_key("first"));

        let run = compiler.finish();
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(
            run.diagnostics[0].kind,
            DiagnosticKind::DuplicateTag { tag: "a".into() },
        );
    }

    #[test]
    fn empty_either_is_reported() {
        let ty = TypeDescriptor::Union { members: vec![TypeDescriptor::Unrecognized] };
        let decl = TypeDeclaration::new("Nothing", ty);
        let config = CompileConfig::default();
        let symbols = SymbolTable::default();
        let mut compiler = Compiler::new(&config, &symbols);
        let expr = compiler.compile_declaration(&decl).unwrap();
        assert!(expr.args().is_empty());
        let run = compiler.finish();
        assert_eq!(run.diagnostics.last().map(|d| &d.kind), Some(&DiagnosticKind::EmptyUnion));
    }
}
