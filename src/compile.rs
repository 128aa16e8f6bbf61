//! Recursive compiler from type descriptors to validator expressions.
//!
//! Every node compiles to `Result<ValidatorExpr, SkipReason>`. A skip is not a
//! failure: the nearest record, tuple, union or declaration swallows it and
//! degrades locally (drop the field, pass the slot through as `json`, drop the
//! member, leave the binding uninitialized), recording one diagnostic at the
//! point where it was swallowed.
//!
//! Invariant: a subtree that returns `Err` never constructed a builtin call, so
//! the usage set only ever names builtins that appear in the output.
pub mod union;
pub mod usage;

use indexmap::IndexMap;

use crate::config::CompileConfig;
use crate::descriptor::{Field, LiteralValue, PrimitiveKind, TypeDeclaration, TypeDescriptor};
use crate::diagnostics::{Diagnostic, DiagnosticKind, NodePath, Segment, SkipReason};
use crate::expr::{Builtin, Literal, ValidatorExpr};
use crate::symbols::{decoder_name_of, ReferenceSite, SymbolTable};

pub use usage::SymbolUsage;

pub type Compiled = Result<ValidatorExpr, SkipReason>;

/// Per-run compilation state. Owns the usage set and the diagnostics; both
/// are handed back by [`Compiler::finish`] once the walk is over.
pub struct Compiler<'a> {
    config: &'a CompileConfig,
    symbols: Option<&'a SymbolTable>,
    usage: SymbolUsage,
    diagnostics: Vec<Diagnostic>,
    references: Vec<ReferenceSite>,
    path: NodePath,
    /// Declarations compiled so far; the current one sits at `declared - 1`.
    declared: usize,
}

/// What a finished run leaves behind besides the expressions themselves.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub usage: SymbolUsage,
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved references, for the load-order check.
    pub references: Vec<ReferenceSite>,
}

impl<'a> Compiler<'a> {
    /// References are checked against `symbols`; unknown names still compile.
    pub fn new(config: &'a CompileConfig, symbols: &'a SymbolTable) -> Self {
        Compiler {
            config,
            symbols: Some(symbols),
            usage: SymbolUsage::new(),
            diagnostics: Vec::new(),
            references: Vec::new(),
            path: NodePath::default(),
            declared: 0,
        }
    }

    /// A compiler that resolves references by name only, without a table.
    pub fn unchecked(config: &'a CompileConfig) -> Self {
        Compiler {
            config,
            symbols: None,
            usage: SymbolUsage::new(),
            diagnostics: Vec::new(),
            references: Vec::new(),
            path: NodePath::default(),
            declared: 0,
        }
    }

    pub fn finish(self) -> RunState {
        RunState { usage: self.usage, diagnostics: self.diagnostics, references: self.references }
    }

    /// Compile one top-level declaration's body. A skip here means the
    /// binding is emitted without an initializer.
    /// Declarations must be passed in module order.
    pub fn compile_declaration(&mut self, decl: &TypeDeclaration) -> Compiled {
        self.declared += 1;
        self.path.clear();
        self.path.push(Segment::Declaration(decl.name.clone()));
        let result = self.compile(&decl.ty);
        if let Err(reason) = &result {
            self.report(DiagnosticKind::DeclarationUninitialized { reason: reason.clone() });
        }
        self.path.clear();
        result
    }

    /// Record a diagnostic at the current node.
    pub fn report(&mut self, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic { path: self.path.to_string(), kind });
    }

    pub fn compile(&mut self, ty: &TypeDescriptor) -> Compiled {
        match ty {
            TypeDescriptor::Primitive { kind } => Ok(self.call(primitive_builtin(*kind), Vec::new())),
            TypeDescriptor::OpaqueObject => Ok(self.call(Builtin::JsonObject, Vec::new())),
            TypeDescriptor::Literal { value } => self.compile_literal(value),
            TypeDescriptor::Array { element } => {
                self.path.push(Segment::ArrayElement);
                let element = self.compile(element);
                self.path.pop();
                Ok(self.call(Builtin::Array, vec![element?]))
            }
            TypeDescriptor::Tuple { elements } => Ok(self.compile_tuple(elements)),
            TypeDescriptor::Reference { name } => Ok(self.compile_reference(name)),
            TypeDescriptor::Record { fields } => Ok(self.compile_record(fields)),
            TypeDescriptor::Union { members } => Ok(self.compile_union(members)),
            TypeDescriptor::Unsupported { syntax } => Err(SkipReason::UnsupportedSyntax(syntax.clone())),
            TypeDescriptor::Unrecognized => Err(SkipReason::UnrecognizedDescriptor),
        }
    }

    /// Build a builtin call, noting the name for import emission.
    fn call(&mut self, builtin: Builtin, args: Vec<ValidatorExpr>) -> ValidatorExpr {
        self.usage.record(builtin);
        ValidatorExpr::BuiltinCall { builtin, args }
    }

    fn compile_literal(&mut self, value: &LiteralValue) -> Compiled {
        let literal = match value {
            LiteralValue::String(s) => Literal::String(s.clone()),
            LiteralValue::Number(n) => Literal::Number(n.clone()),
            other => return Err(SkipReason::UnsupportedLiteral(other.kind_name())),
        };
        Ok(self.call(Builtin::Constant, vec![ValidatorExpr::Literal { value: literal }]))
    }

    /// Arity is preserved: a slot that cannot compile accepts any JSON.
    fn compile_tuple(&mut self, elements: &[TypeDescriptor]) -> ValidatorExpr {
        let mut args = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            self.path.push(Segment::TupleSlot(index));
            let slot = match self.compile(element) {
                Ok(expr) => expr,
                Err(reason) => {
                    self.report(DiagnosticKind::TupleSlotPassthrough { index, reason });
                    self.call(Builtin::Json, Vec::new())
                }
            };
            self.path.pop();
            args.push(slot);
        }
        self.call(Builtin::Tuple, args)
    }

    fn compile_reference(&mut self, name: &str) -> ValidatorExpr {
        let binding = match self.symbols {
            Some(symbols) => match symbols.binding_of(name) {
                Some(binding) => {
                    if let Some(from) = self.declared.checked_sub(1) {
                        self.references.push(ReferenceSite {
                            name: name.to_string(),
                            path: self.path.to_string(),
                            from,
                        });
                    }
                    binding.to_string()
                }
                None => {
                    self.report(DiagnosticKind::UnresolvedReference { name: name.to_string() });
                    decoder_name_of(name)
                }
            },
            None => decoder_name_of(name),
        };
        ValidatorExpr::Identifier { name: binding }
    }

    /// Fields that cannot compile are left out, which narrows the shape.
    pub(crate) fn compile_record(&mut self, fields: &[Field]) -> ValidatorExpr {
        let mut entries = IndexMap::with_capacity(fields.len());
        for field in fields {
            self.path.push(Segment::Field(field.name.clone()));
            match self.compile(&field.ty) {
                Ok(expr) => {
                    let expr = if field.optional { self.call(Builtin::Optional, vec![expr]) } else { expr };
                    entries.insert(field.name.clone(), expr);
                }
                Err(reason) => {
                    self.report(DiagnosticKind::FieldDropped { field: field.name.clone(), reason });
                }
            }
            self.path.pop();
        }
        self.call(Builtin::Object, vec![ValidatorExpr::ObjectLiteral { entries }])
    }
}

fn primitive_builtin(kind: PrimitiveKind) -> Builtin {
    match kind {
        PrimitiveKind::String => Builtin::String,
        PrimitiveKind::Number => Builtin::Number,
        PrimitiveKind::Boolean => Builtin::Boolean,
    }
}

// ------------------------------- Front API -------------------------------- //

/// Compile a single descriptor outside of a module run. References resolve by
/// naming convention alone and diagnostics are discarded.
pub fn compile(ty: &TypeDescriptor, config: &CompileConfig, usage: &mut SymbolUsage) -> Option<ValidatorExpr> {
    let mut compiler = Compiler::unchecked(config);
    let result = compiler.compile(ty).ok();
    for builtin in compiler.usage.iter() {
        usage.record(builtin);
    }
    result
}

// ------------------------------- Tests ------------------------------------ //
