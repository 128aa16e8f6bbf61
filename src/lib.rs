//! Generate runtime decoders from parsed TypeScript type declarations.
//!
//! Pipeline: [`descriptor`] (parser output) → [`compile`] (validator
//! expressions, with tagged-union detection and builtin usage tracking) →
//! [`emit`] (one binding per declaration) → [`assemble`] (imports + layout) →
//! [`printer`] (TypeScript text).

pub mod assemble;
pub mod cli;
pub mod compile;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod expr;
pub mod jq_exec;
pub mod path_de;
pub mod printer;
pub mod symbols;

pub use assemble::{assemble, GeneratedModule};
pub use config::CompileConfig;
pub use error::{Error, Result};

/// Parse a declaration tree from JSON text, compile it and render TypeScript.
pub fn generate_typescript(source: &str, config: &CompileConfig) -> Result<(String, GeneratedModule)> {
    let module: descriptor::SourceModule = path_de::from_str_with_path(source)?;
    let generated = assemble(&module, config);
    Ok((printer::render_module(&generated), generated))
}
