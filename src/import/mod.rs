//! Statblock Import
//!
//! Batch import of `.monster` files and canonical statblock JSON into the
//! library. Importing is split into a side-effect free [`preview`] and a
//! [`commit`] that writes the valid records to a [`StatblockOps`] store.
//! The [`srd`] submodule seeds the library from a bundled SRD monster list.
//!
//! [`StatblockOps`]: crate::database::StatblockOps

mod error;
pub mod srd;
mod workflow;

pub use error::ImportError;
pub use workflow::{
    commit, import_files, missing_required_fields, parse_file, preview, validate_file,
    REQUIRED_FIELDS,
};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ImportConfig;
use crate::database::UpsertAction;
use crate::statblock::CanonicalStatblock;

// ============================================================================
// Input
// ============================================================================

/// One file handed to the importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub name: String,
    pub content: String,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, named by its file name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Record layout of an import file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// Tetra Cube `.monster` JSON.
    Monster,
    /// Canonical statblock JSON.
    Statblock,
}

impl ImportFormat {
    pub fn detect(file: &ImportFile, config: &ImportConfig) -> Option<Self> {
        let ext = file.extension()?;
        let matches = |list: &[String]| {
            list.iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        };
        if matches(&config.monster_extensions) {
            Some(Self::Monster)
        } else if matches(&config.statblock_extensions) {
            Some(Self::Statblock)
        } else {
            None
        }
    }
}

// ============================================================================
// Preview
// ============================================================================

/// A parsed record awaiting commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPreview {
    pub file: String,
    pub index: usize,
    pub record: CanonicalStatblock,
    pub valid: bool,
    pub missing_fields: Vec<String>,
}

/// A file or record that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub file: String,
    /// Index within the file; `None` when the whole file was rejected.
    pub record: Option<usize>,
    pub error: String,
}

impl From<&ImportError> for ImportFailure {
    fn from(err: &ImportError) -> Self {
        Self {
            file: err.file().to_string(),
            record: err.record(),
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPreview {
    pub previews: Vec<RecordPreview>,
    pub errors: Vec<ImportFailure>,
}

impl ImportPreview {
    pub fn valid_count(&self) -> usize {
        self.previews.iter().filter(|p| p.valid).count()
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedRecord {
    pub file: String,
    pub index: usize,
    pub id: String,
    pub name: String,
    pub action: UpsertAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub file: String,
    pub index: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<ImportedRecord>,
    pub skipped: Vec<SkippedRecord>,
    pub errors: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn created_count(&self) -> usize {
        self.imported
            .iter()
            .filter(|r| r.action == UpsertAction::Created)
            .count()
    }

    pub fn updated_count(&self) -> usize {
        self.imported
            .iter()
            .filter(|r| r.action == UpsertAction::Updated)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.errors.is_empty()
    }
}
