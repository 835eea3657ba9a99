//! Delimited-text export of roster collections.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Collections that can be exported, by the name used in file names and URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportCollection {
    Riders,
    Operators,
    Vehicles,
    Routes,
    Load,
}

impl ExportCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportCollection::Riders => "riders",
            ExportCollection::Operators => "operators",
            ExportCollection::Vehicles => "vehicles",
            ExportCollection::Routes => "routes",
            ExportCollection::Load => "load",
        }
    }
}

impl std::str::FromStr for ExportCollection {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "riders" => Ok(ExportCollection::Riders),
            "operators" => Ok(ExportCollection::Operators),
            "vehicles" => Ok(ExportCollection::Vehicles),
            "routes" => Ok(ExportCollection::Routes),
            "load" | "load_records" => Ok(ExportCollection::Load),
            other => Err(ExportError::UnknownCollection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content: String,
}

/// Serialize `records` as CSV named `<name>.csv`. The header row follows the
/// field order of the record type; an empty collection yields an empty file.
pub fn export_csv<T: Serialize>(name: &str, records: &[T]) -> Result<ExportFile, ExportError> {
    let file_name = format!("{}.csv", name);
    if records.is_empty() {
        return Ok(ExportFile {
            file_name,
            content: String::new(),
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;

    Ok(ExportFile {
        file_name,
        content: String::from_utf8(bytes)?,
    })
}
