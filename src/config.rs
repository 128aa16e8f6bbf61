//! Run configuration. Loaded once, optionally from a JSON file, then frozen
//! for the duration of a generation run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Discriminator field enabling `taggedUnion` specialization.
    pub tag_field: Option<String>,
    /// One named import per used builtin instead of a namespace import.
    pub named_import_style: bool,
}

impl CompileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        crate::path_de::from_str_with_path(&source).map_err(|error| error.in_file(path))
    }

    /// Flags given on the command line win over the file.
    pub fn with_overrides(mut self, tag_field: Option<String>, named_imports: bool) -> Self {
        if tag_field.is_some() {
            self.tag_field = tag_field;
        }
        if named_imports {
            self.named_import_style = true;
        }
        self
    }
}
