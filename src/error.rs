use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures at the edges of a run: reading, locating and decoding input.
/// Compilation itself never fails; it reports diagnostics instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input did not match the declaration model.
    #[error("{}at JSON path {json_path} → {source}", in_file(.file))]
    Deserialize {
        file: Option<PathBuf>,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}no node at JSON pointer {pointer}", in_file(.file))]
    JsonPointer { file: Option<PathBuf>, pointer: String },

    #[error("{}jq: {message}", in_file(.file))]
    Jq { file: Option<PathBuf>, message: String },

    #[error("invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("unreadable glob match: {0}")]
    GlobEntry(#[from] glob::GlobError),

    #[error("glob pattern matched no files: {0}")]
    NoGlobMatch(String),

    #[error("{count} node(s) could not be compiled")]
    SkippedNodes { count: usize },
}

fn in_file(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!("{}: ", path.display()),
        None => String::new(),
    }
}

impl Error {
    /// Attach the input file to errors raised before the file was known.
    pub fn in_file(mut self, path: &Path) -> Self {
        match &mut self {
            Error::Deserialize { file, .. } | Error::JsonPointer { file, .. } | Error::Jq { file, .. } => {
                *file = Some(path.to_path_buf());
            }
            _ => {}
        }
        self
    }
}
