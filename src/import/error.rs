//! Import Diagnostics
//!
//! File- and record-level import failures, rendered through miette in the CLI.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::statblock::StatblockError;

#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("{file} is empty")]
    #[diagnostic(
        code("GM::IMPORT_EMPTY"),
        help("Export the statblock again; the file has no content")
    )]
    Empty { file: String },

    #[error("{file} is {size} bytes, above the {limit} byte import limit")]
    #[diagnostic(
        code("GM::IMPORT_TOO_LARGE"),
        help("Split the file, or raise `max_file_bytes` in the [import] section of config.toml")
    )]
    TooLarge { file: String, size: usize, limit: usize },

    #[error("{file} has an unsupported file extension")]
    #[diagnostic(
        code("GM::IMPORT_EXTENSION"),
        help("Monster files must end in .monster; canonical statblocks in .json or .txt")
    )]
    UnsupportedExtension { file: String },

    #[error("Invalid JSON format in {file}: {message} (line {line}, column {column})")]
    #[diagnostic(code("GM::IMPORT_PARSE"), help("Fix the JSON syntax and import the file again"))]
    Parse {
        file: String,
        message: String,
        line: usize,
        column: usize,
        #[source_code]
        source_code: NamedSource<String>,
        #[label("parsing stopped here")]
        span: SourceSpan,
    },

    #[error("{file}, record {index}: {source}")]
    #[diagnostic(code("GM::IMPORT_RECORD"))]
    Validation {
        file: String,
        index: usize,
        #[source]
        source: StatblockError,
    },
}

impl ImportError {
    /// Build a parse diagnostic pointing at the position serde_json reported.
    pub fn parse(file: &str, content: &str, err: &serde_json::Error) -> Self {
        let (line, column) = (err.line(), err.column());
        let offset = byte_offset(content, line, column);
        let length = usize::from(offset < content.len());
        Self::Parse {
            file: file.to_string(),
            message: strip_position(&err.to_string()),
            line,
            column,
            source_code: NamedSource::new(file, content.to_string()),
            span: SourceSpan::new(offset.into(), length),
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::Empty { file }
            | Self::TooLarge { file, .. }
            | Self::UnsupportedExtension { file }
            | Self::Parse { file, .. }
            | Self::Validation { file, .. } => file,
        }
    }

    /// Record index for record-level failures.
    pub fn record(&self) -> Option<usize> {
        match self {
            Self::Validation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the content length.
fn byte_offset(content: &str, line: usize, column: usize) -> usize {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(content.len())
}

/// serde_json appends " at line X column Y"; the diagnostic shows it separately.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
