//! One top-level binding per declared type.

use serde::{Deserialize, Serialize};

use crate::compile::Compiler;
use crate::descriptor::TypeDeclaration;
use crate::expr::ValidatorExpr;
use crate::symbols::decoder_name_of;

/// Generic type wrapping every annotated binding.
pub const DECODER_TYPE: &str = "Decoder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedDeclaration {
    pub binding_name: String,
    /// `Decoder<Declared>`; absent when there is no initializer.
    pub result_type: Option<String>,
    /// `None` leaves the binding declared but uninitialized.
    pub expr: Option<ValidatorExpr>,
}

impl EmittedDeclaration {
    pub fn is_initialized(&self) -> bool {
        self.expr.is_some()
    }
}

pub fn emit_declaration(compiler: &mut Compiler<'_>, decl: &TypeDeclaration) -> EmittedDeclaration {
    let binding_name = decoder_name_of(&decl.name);
    match compiler.compile_declaration(decl) {
        Ok(expr) => {
            tracing::debug!(binding = %binding_name, "compiled declaration");
            EmittedDeclaration {
                binding_name,
                result_type: Some(format!("{DECODER_TYPE}<{}>", decl.name)),
                expr: Some(expr),
            }
        }
        Err(reason) => {
            tracing::debug!(binding = %binding_name, %reason, "declaration left uninitialized");
            EmittedDeclaration { binding_name, result_type: None, expr: None }
        }
    }
}
