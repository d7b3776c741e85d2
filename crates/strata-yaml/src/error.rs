//! Error types for YAML parsing.

use thiserror::Error;

/// Result type alias for strata-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during YAML parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// YAML syntax error
    #[error("{}{message} at line {line} column {column}", file_prefix(.file))]
    Parse {
        message: String,
        file: Option<String>,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// More than one `---` document in a single source
    #[error("{}expected a single YAML document, found {count}", file_prefix(.file))]
    MultipleDocuments { file: Option<String>, count: usize },

    /// An alias refers to an anchor that was never defined
    #[error("{}unknown anchor referenced at line {line}", file_prefix(.file))]
    UnknownAnchor { file: Option<String>, line: usize },
}

fn file_prefix(file: &Option<String>) -> String {
    match file {
        Some(name) => format!("{}: ", name),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn from_scan(err: &yaml_rust2::ScanError, file: Option<String>) -> Self {
        let marker = err.marker();
        Error::Parse {
            message: err.info().to_string(),
            file,
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}
