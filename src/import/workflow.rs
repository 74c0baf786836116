//! Preview and commit.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    ImportError, ImportFailure, ImportFile, ImportFormat, ImportPreview, ImportReport,
    ImportedRecord, RecordPreview, SkippedRecord,
};
use crate::config::ImportConfig;
use crate::database::StatblockOps;
use crate::statblock::source::is_truthy;
use crate::statblock::{parse_canonical_value, parse_monster_value, StatblockError};

/// Fields a record needs before it can be committed.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "ac", "hp"];

/// Check a file before parsing it and pick its record format.
pub fn validate_file(
    file: &ImportFile,
    config: &ImportConfig,
) -> Result<ImportFormat, ImportError> {
    if file.content.trim().is_empty() {
        return Err(ImportError::Empty {
            file: file.name.clone(),
        });
    }

    if file.content.len() > config.max_file_bytes {
        return Err(ImportError::TooLarge {
            file: file.name.clone(),
            size: file.content.len(),
            limit: config.max_file_bytes,
        });
    }

    ImportFormat::detect(file, config).ok_or_else(|| ImportError::UnsupportedExtension {
        file: file.name.clone(),
    })
}

/// Required fields that are absent, null, false, zero or empty.
pub fn missing_required_fields(record: &Value) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| !record.get(**field).is_some_and(is_truthy))
        .map(|field| field.to_string())
        .collect()
}

/// Parse every record of a file.
///
/// A JSON syntax error rejects the whole file; otherwise each record
/// succeeds or fails on its own.
pub fn parse_file(
    file: &ImportFile,
    format: ImportFormat,
) -> Result<Vec<Result<RecordPreview, ImportError>>, ImportError> {
    let value: Value = serde_json::from_str(&file.content)
        .map_err(|err| ImportError::parse(&file.name, &file.content, &err))?;

    let records = match value {
        Value::Array(records) => records,
        single => vec![single],
    };

    Ok(records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_record(raw, format)
                .map_err(|source| ImportError::Validation {
                    file: file.name.clone(),
                    index,
                    source,
                })
                .map(|(record, missing_fields)| RecordPreview {
                    file: file.name.clone(),
                    index,
                    valid: missing_fields.is_empty(),
                    record,
                    missing_fields,
                })
        })
        .collect())
}

fn parse_record(
    raw: &Value,
    format: ImportFormat,
) -> Result<(crate::statblock::CanonicalStatblock, Vec<String>), StatblockError> {
    match format {
        ImportFormat::Monster => {
            let record = parse_monster_value(raw)?;
            let serialized = serde_json::to_value(&record).map_err(StatblockError::Shape)?;
            Ok((record, missing_required_fields(&serialized)))
        }
        ImportFormat::Statblock => {
            let record = parse_canonical_value(raw)?;
            Ok((record, missing_required_fields(raw)))
        }
    }
}

/// Parse a batch of files without touching the library.
pub fn preview(files: &[ImportFile], config: &ImportConfig) -> ImportPreview {
    let mut result = ImportPreview::default();

    for file in files {
        let parsed = validate_file(file, config).and_then(|format| parse_file(file, format));
        let records = match parsed {
            Ok(records) => records,
            Err(err) => {
                warn!(file = %file.name, error = %err, "Rejected import file");
                result.errors.push(ImportFailure::from(&err));
                continue;
            }
        };

        for record in records {
            match record {
                Ok(preview) => {
                    debug!(
                        file = %preview.file,
                        index = preview.index,
                        name = %preview.record.name,
                        valid = preview.valid,
                        "Parsed import record"
                    );
                    result.previews.push(preview);
                }
                Err(err) => {
                    warn!(file = %file.name, error = %err, "Rejected import record");
                    result.errors.push(ImportFailure::from(&err));
                }
            }
        }
    }

    result
}

/// Upsert every valid previewed record into `store`.
///
/// A record that fails to store is reported as skipped; the batch continues.
pub async fn commit<S: StatblockOps>(preview: ImportPreview, store: &S) -> ImportReport {
    let mut report = ImportReport {
        errors: preview.errors,
        ..Default::default()
    };

    for record in preview.previews {
        if !record.valid {
            report.skipped.push(SkippedRecord {
                file: record.file,
                index: record.index,
                name: record.record.name,
                reason: format!("Missing fields: {}", record.missing_fields.join(", ")),
            });
            continue;
        }

        match store.upsert_statblock(&record.record).await {
            Ok(outcome) => report.imported.push(ImportedRecord {
                file: record.file,
                index: record.index,
                id: outcome.record.id,
                name: outcome.record.name,
                action: outcome.action,
            }),
            Err(err) => {
                warn!(
                    file = %record.file,
                    name = %record.record.name,
                    error = %err,
                    "Failed to store statblock"
                );
                report.skipped.push(SkippedRecord {
                    file: record.file,
                    index: record.index,
                    name: record.record.name,
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        errors = report.errors.len(),
        "Import finished"
    );
    report
}

/// [`preview`] then [`commit`].
pub async fn import_files<S: StatblockOps>(
    files: &[ImportFile],
    config: &ImportConfig,
    store: &S,
) -> ImportReport {
    commit(preview(files, config), store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ImportConfig {
        ImportConfig::default()
    }

    #[test]
    fn test_validate_file_rules() {
        let cfg = config();
        assert!(matches!(
            validate_file(&ImportFile::new("a.monster", "  \n"), &cfg),
            Err(ImportError::Empty { .. })
        ));
        assert!(matches!(
            validate_file(&ImportFile::new("a.pdf", "{}"), &cfg),
            Err(ImportError::UnsupportedExtension { .. })
        ));
        assert!(matches!(
            validate_file(&ImportFile::new("noext", "{}"), &cfg),
            Err(ImportError::UnsupportedExtension { .. })
        ));
        assert_eq!(
            validate_file(&ImportFile::new("Orc.MONSTER", "{}"), &cfg).unwrap(),
            ImportFormat::Monster
        );
        assert_eq!(
            validate_file(&ImportFile::new("pack.json", "[]"), &cfg).unwrap(),
            ImportFormat::Statblock
        );

        let small = ImportConfig {
            max_file_bytes: 4,
            ..config()
        };
        assert!(matches!(
            validate_file(&ImportFile::new("a.json", "{\"name\": 1}"), &small),
            Err(ImportError::TooLarge { size: 11, limit: 4, .. })
        ));
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(missing_required_fields(&json!({"name": "Orc", "ac": 13, "hp": 15})).is_empty());
        assert_eq!(
            missing_required_fields(&json!({"name": "Orc", "ac": 0, "hp": null})),
            vec!["ac", "hp"]
        );
        assert_eq!(
            missing_required_fields(&json!({"name": "", "ac": "13", "hp": false})),
            vec!["name", "hp"]
        );
    }

    #[test]
    fn test_preview_marks_monster_without_hp_invalid() {
        let files = [ImportFile::new(
            "bare.monster",
            json!({"name": "Bare", "natArmorBonus": 2}).to_string(),
        )];
        let result = preview(&files, &config());
        assert!(result.errors.is_empty());
        assert_eq!(result.previews.len(), 1);
        let record = &result.previews[0];
        assert!(!record.valid);
        assert_eq!(record.missing_fields, vec!["hp"]);
        assert_eq!(record.record.ac, 12);
        assert_eq!(result.valid_count(), 0);
    }

    #[test]
    fn test_preview_syntax_error_rejects_file() {
        let files = [
            ImportFile::new("broken.json", "[{\"name\": \"A\"},"),
            ImportFile::new("ok.json", json!({"name": "B", "ac": 12, "hp": 9}).to_string()),
        ];
        let result = preview(&files, &config());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file, "broken.json");
        assert_eq!(result.errors[0].record, None);
        assert!(result.errors[0].error.starts_with("Invalid JSON format in broken.json"));
        assert_eq!(result.previews.len(), 1);
        assert!(result.previews[0].valid);
    }

    #[test]
    fn test_preview_reports_record_index() {
        let files = [ImportFile::new(
            "pack.json",
            json!([
                {"name": "A", "ac": 10, "hp": 5},
                {"ac": 11, "hp": 6},
                {"name": "C", "ac": 12, "hp": 7}
            ])
            .to_string(),
        )];
        let result = preview(&files, &config());
        assert_eq!(result.previews.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file, "pack.json");
        assert_eq!(result.errors[0].record, Some(1));
        assert_eq!(result.previews[1].index, 2);
    }
}
