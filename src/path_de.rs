use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(with_path)
}

/// Same, for a document that was already parsed (after a pointer or jq step).
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(with_path)
}

fn with_path(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    let json_path = err.path().to_string();
    Error::Deserialize { file: None, json_path, source: err.into_inner() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SourceModule;

    #[test]
    fn reports_the_offending_node() {
        let src = r#"{ "declarations": [ { "name": "Foo", "type": { "kind": "primitive", "type": "symbol" } } ] }"#;
        let err = from_str_with_path::<SourceModule>(src).unwrap_err();
        match err {
            Error::Deserialize { json_path, .. } => assert!(json_path.starts_with("declarations[0]"), "{json_path}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_parsed_values() {
        let value = serde_json::json!({ "declarations": [] });
        let module: SourceModule = from_value_with_path(value).unwrap();
        assert!(module.declarations.is_empty());
    }
}
