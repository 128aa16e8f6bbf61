//! Validator expressions: the compiler's output tree, one node per call that
//! builds a runtime decoder. No textual concerns live here.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::NumberText;

/// Validator-construction primitives supplied by the runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Builtin {
    Array,
    Boolean,
    Constant,
    Either,
    Json,
    JsonObject,
    Number,
    Object,
    Optional,
    String,
    TaggedUnion,
    Tuple,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Array => "array",
            Builtin::Boolean => "boolean",
            Builtin::Constant => "constant",
            Builtin::Either => "either",
            Builtin::Json => "json",
            Builtin::JsonObject => "jsonObject",
            Builtin::Number => "number",
            Builtin::Object => "object",
            Builtin::Optional => "optional",
            Builtin::String => "string",
            Builtin::TaggedUnion => "taggedUnion",
            Builtin::Tuple => "tuple",
        }
    }

    /// Value builtins are decoders already; the rest are decoder factories.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Builtin::String | Builtin::Number | Builtin::Boolean | Builtin::JsonObject | Builtin::Json
        )
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidatorExpr {
    BuiltinCall { builtin: Builtin, args: Vec<ValidatorExpr> },
    /// Another generated decoder binding, by name.
    Identifier { name: String },
    /// Argument-only: field name to validator, in declaration order.
    ObjectLiteral { entries: IndexMap<String, ValidatorExpr> },
    /// Argument-only: `constant` values and the `taggedUnion` discriminator.
    Literal { value: Literal },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Literal {
    String(String),
    /// Source text, printed verbatim.
    Number(NumberText),
}

impl ValidatorExpr {
    pub fn identifier(name: impl Into<String>) -> Self {
        ValidatorExpr::Identifier { name: name.into() }
    }
    pub fn string_literal(value: impl Into<String>) -> Self {
        ValidatorExpr::Literal { value: Literal::String(value.into()) }
    }

    /// The builtin this node calls, if it is a call.
    pub fn builtin(&self) -> Option<Builtin> {
        match self {
            ValidatorExpr::BuiltinCall { builtin, .. } => Some(*builtin),
            _ => None,
        }
    }

    pub fn args(&self) -> &[ValidatorExpr] {
        match self {
            ValidatorExpr::BuiltinCall { args, .. } => args,
            _ => &[],
        }
    }

    /// Every distinct builtin referenced anywhere in this tree.
    pub fn builtins(&self) -> BTreeSet<Builtin> {
        let mut out = BTreeSet::new();
        self.collect_builtins(&mut out);
        out
    }

    fn collect_builtins(&self, out: &mut BTreeSet<Builtin>) {
        match self {
            ValidatorExpr::BuiltinCall { builtin, args } => {
                out.insert(*builtin);
                for arg in args { arg.collect_builtins(out); }
            }
            ValidatorExpr::ObjectLiteral { entries } => {
                for value in entries.values() { value.collect_builtins(out); }
            }
            ValidatorExpr::Identifier { .. } | ValidatorExpr::Literal { .. } => {}
        }
    }
}
