//! Structured record of every node the compiler could not translate, and of
//! other lossy decisions taken without failing the run.

use std::fmt;

use colored::Colorize;
use serde::Serialize;

/// Why a node produced no validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
    /// Only string and number literals have a `constant` form.
    UnsupportedLiteral(&'static str),
    UnsupportedSyntax(String),
    UnrecognizedDescriptor,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedLiteral(kind) => write!(f, "{kind} literal types have no validator"),
            SkipReason::UnsupportedSyntax(syntax) => write!(f, "unsupported type syntax `{syntax}`"),
            SkipReason::UnrecognizedDescriptor => f.write_str("unrecognized type descriptor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// The field is missing from the emitted object validator.
    FieldDropped { field: String, reason: SkipReason },
    /// The slot was replaced with the `json` passthrough.
    TupleSlotPassthrough { index: usize, reason: SkipReason },
    UnionMemberDropped { index: usize, reason: SkipReason },
    /// Every member of a plain union was dropped.
    EmptyUnion,
    DeclarationUninitialized { reason: SkipReason },
    /// A later member replaced an earlier one with the same tag value.
    DuplicateTag { tag: String },
    UnresolvedReference { name: String },
    DuplicateDeclaration { name: String },
    /// The referenced `const` is declared at or after this point, so reading
    /// it while the module loads throws.
    ForwardReference { name: String },
    /// The referenced binding is emitted without an initializer.
    UninitializedReference { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Location inside the declaration, e.g. `Bar.a[1]`.
    pub path: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Skipped nodes narrow the accepted shape; the rest are advisory.
    pub fn is_skip(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::FieldDropped { .. }
                | DiagnosticKind::TupleSlotPassthrough { .. }
                | DiagnosticKind::UnionMemberDropped { .. }
                | DiagnosticKind::DeclarationUninitialized { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.path;
        match &self.kind {
            DiagnosticKind::FieldDropped { field, reason } => {
                write!(f, "{path}: field `{field}` dropped ({reason})")
            }
            DiagnosticKind::TupleSlotPassthrough { index, reason } => {
                write!(f, "{path}: tuple slot {index} accepts any JSON ({reason})")
            }
            DiagnosticKind::UnionMemberDropped { index, reason } => {
                write!(f, "{path}: union member {index} dropped ({reason})")
            }
            DiagnosticKind::EmptyUnion => write!(f, "{path}: every union member was dropped"),
            DiagnosticKind::DeclarationUninitialized { reason } => {
                write!(f, "{path}: declared without a decoder ({reason})")
            }
            DiagnosticKind::DuplicateTag { tag } => {
                write!(f, "{path}: tag value {tag:?} appears more than once, last member wins")
            }
            DiagnosticKind::UnresolvedReference { name } => {
                write!(f, "{path}: reference to undeclared type `{name}`")
            }
            DiagnosticKind::DuplicateDeclaration { name } => {
                write!(f, "{path}: type `{name}` is declared more than once")
            }
            DiagnosticKind::ForwardReference { name } => {
                write!(f, "{path}: `{name}` is referenced before its decoder is declared")
            }
            DiagnosticKind::UninitializedReference { name } => {
                write!(f, "{path}: `{name}` has no decoder, the reference is undefined at runtime")
            }
        }
    }
}

// ------------------------------ Paths ------------------------------------- //

/// Location of the node being compiled, rendered as `Decl.field[0]|1[]`.
#[derive(Debug, Clone, Default)]
pub struct NodePath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Declaration(String),
    Field(String),
    TupleSlot(usize),
    UnionMember(usize),
    ArrayElement,
}

impl NodePath {
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
    pub fn pop(&mut self) {
        self.segments.pop();
    }
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Declaration(name) => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::TupleSlot(index) => write!(f, "[{index}]")?,
                Segment::UnionMember(index) => write!(f, "|{index}")?,
                Segment::ArrayElement => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

// ------------------------------ Reporting --------------------------------- //

/// One-line colored summary for terminals.
pub fn summary_line(diagnostics: &[Diagnostic]) -> String {
    let skips = diagnostics.iter().filter(|d| d.is_skip()).count();
    let advisories = diagnostics.len() - skips;
    if diagnostics.is_empty() {
        return format!("{} every node compiled", "ok:".green().bold());
    }
    format!(
        "{} {skips} skipped node(s), {advisories} advisory note(s)",
        "warning:".yellow().bold(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_each_segment_kind() {
        let mut path = NodePath::default();
        path.push(Segment::Declaration("Api".into()));
        path.push(Segment::Field("items".into()));
        path.push(Segment::ArrayElement);
        path.push(Segment::UnionMember(1));
        path.push(Segment::TupleSlot(0));
        assert_eq!(path.to_string(), "Api.items[]|1[0]");
        path.pop();
        path.pop();
        assert_eq!(path.to_string(), "Api.items[]");
    }

    #[test]
    fn only_narrowing_kinds_count_as_skips() {
        let dropped = Diagnostic {
            path: "Bar".into(),
            kind: DiagnosticKind::FieldDropped {
                field: "a".into(),
                reason: SkipReason::UnsupportedLiteral("null"),
            },
        };
        let unresolved = Diagnostic {
            path: "Bar.b".into(),
            kind: DiagnosticKind::UnresolvedReference { name: "Date".into() },
        };
        assert!(dropped.is_skip());
        assert!(!unresolved.is_skip());
        assert_eq!(dropped.to_string(), "Bar: field `a` dropped (null literal types have no validator)");
    }

    #[test]
    fn serializes_flat_for_inspection() {
        let d = Diagnostic {
            path: "Pair".into(),
            kind: DiagnosticKind::TupleSlotPassthrough {
                index: 1,
                reason: SkipReason::UnsupportedSyntax("intersection".into()),
            },
        };
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["path"], "Pair");
        assert_eq!(value["kind"], "tupleSlotPassthrough");
        assert_eq!(value["index"], 1);
        assert_eq!(value["reason"]["reason"], "unsupportedSyntax");
        assert_eq!(value["reason"]["detail"], "intersection");
    }
}
