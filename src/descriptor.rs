//! Type descriptor model: the structured shape of declared types, as handed
//! over by an external host-language parser.
//!
//! Descriptors are read-only input. References to other declared types are
//! kept by name and never inlined, so every tree is acyclic.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// One parsed source module: its top-level type declarations, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceModule {
    pub declarations: Vec<TypeDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDescriptor {
    Primitive { #[serde(rename = "type")] kind: PrimitiveKind },
    /// Untyped object marker (`object`).
    OpaqueObject,
    Union { members: Vec<TypeDescriptor> },
    Array { element: Box<TypeDescriptor> },
    Tuple { elements: Vec<TypeDescriptor> },
    Literal { value: LiteralValue },
    Reference { name: String },
    Record { fields: Vec<Field> },
    /// A construct the parser recognised but that has no validator form
    /// (intersections, mapped types, function types, `unknown`, ...).
    Unsupported { syntax: String },
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    String(String),
    Number(NumberText),
    Boolean(bool),
    Null,
    /// Digits only, as written in source (without the `n` suffix).
    BigInt(String),
}

impl LiteralValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::String(_) => "string",
            LiteralValue::Number(_) => "number",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Null => "null",
            LiteralValue::BigInt(_) => "bigint",
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|[0-9_]*\.?[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?)$")
        .expect("numeric literal pattern is valid")
});

/// A numeric literal kept as source text (`83`, `1e3`, `0xFF`,
/// `9007199254740993`), so no value is rounded on the way through.
///
/// Parsers may hand it over as a JSON number or as the literal's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NumberText(String);

impl NumberText {
    /// `None` unless `text` is a numeric literal.
    pub fn parse(text: &str) -> Option<Self> {
        NUMERIC_LITERAL.is_match(text).then(|| NumberText(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for NumberText {
    fn from(value: i64) -> Self {
        NumberText(value.to_string())
    }
}

impl fmt::Display for NumberText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NumberText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            // u64/i64 stay exact; only real floats go through f64
            Json(serde_json::Number),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Json(number) => Ok(NumberText(number.to_string())),
            Repr::Text(text) => NumberText::parse(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("not a numeric literal: {text:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
}

// ------------------------------ Builders ---------------------------------- //

impl TypeDescriptor {
    pub fn string() -> Self { TypeDescriptor::Primitive { kind: PrimitiveKind::String } }
    pub fn number() -> Self { TypeDescriptor::Primitive { kind: PrimitiveKind::Number } }
    pub fn boolean() -> Self { TypeDescriptor::Primitive { kind: PrimitiveKind::Boolean } }

    pub fn string_literal(value: impl Into<String>) -> Self {
        TypeDescriptor::Literal { value: LiteralValue::String(value.into()) }
    }
    pub fn number_literal(value: i64) -> Self {
        TypeDescriptor::Literal { value: LiteralValue::Number(value.into()) }
    }
    pub fn reference(name: impl Into<String>) -> Self {
        TypeDescriptor::Reference { name: name.into() }
    }
    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array { element: Box::new(element) }
    }
    pub fn record(fields: impl IntoIterator<Item = Field>) -> Self {
        TypeDescriptor::Record { fields: fields.into_iter().collect() }
    }
    pub fn unsupported(syntax: impl Into<String>) -> Self {
        TypeDescriptor::Unsupported { syntax: syntax.into() }
    }

    /// The field named `name`, when this is a record that has one.
    pub fn record_field(&self, name: &str) -> Option<&Field> {
        match self {
            TypeDescriptor::Record { fields } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }
}

impl Field {
    pub fn required(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Field { name: name.into(), ty, optional: false }
    }
    pub fn optional(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Field { name: name.into(), ty, optional: true }
    }
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        TypeDeclaration { name: name.into(), ty }
    }
}

// ------------------------------- Tests ------------------------------------ //
