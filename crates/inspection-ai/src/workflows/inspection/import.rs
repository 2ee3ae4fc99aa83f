use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use super::domain::{Deficiency, Severity};

#[derive(Debug)]
pub enum DeficiencyImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for DeficiencyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeficiencyImportError::Io(err) => {
                write!(f, "failed to read deficiency export: {}", err)
            }
            DeficiencyImportError::Csv(err) => write!(f, "invalid deficiency CSV data: {}", err),
        }
    }
}

impl std::error::Error for DeficiencyImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeficiencyImportError::Io(err) => Some(err),
            DeficiencyImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DeficiencyImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DeficiencyImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct DeficiencyRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(rename = "Severity", default, deserialize_with = "empty_string_as_none")]
    severity: Option<String>,
    #[serde(
        rename = "Estimated Cost",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    estimated_cost: Option<String>,
    #[serde(rename = "Photos", default, deserialize_with = "empty_string_as_none")]
    photos: Option<String>,
}

impl DeficiencyRow {
    /// True only when every column is empty.
    fn is_blank(&self) -> bool {
        [
            &self.id,
            &self.category,
            &self.location,
            &self.description,
            &self.severity,
            &self.estimated_cost,
            &self.photos,
        ]
        .iter()
        .all(|column| column.is_none())
    }

    fn into_deficiency(self, line: usize) -> Deficiency {
        let id = self.id.unwrap_or_else(|| format!("row-{}", line));
        let estimated_cost = self
            .estimated_cost
            .as_deref()
            .map(|raw| {
                parse_cost(raw).unwrap_or_else(|| {
                    warn!(deficiency_id = %id, value = raw, "unreadable estimated cost");
                    0.0
                })
            })
            .unwrap_or(0.0);

        Deficiency {
            id,
            category: self.category.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            severity: self.severity.as_deref().and_then(Severity::parse),
            estimated_cost,
            photos: self
                .photos
                .as_deref()
                .map(split_photos)
                .unwrap_or_default(),
            is_immediate_repair: false,
            needs_supervisor_alert: false,
            criticality_score: None,
            detection_timestamp: None,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_cost(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|cost| cost.is_finite())
}

fn split_photos(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|photo| !photo.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads field-tablet deficiency exports into unscored [`Deficiency`] records.
pub struct DeficiencyImporter;

impl DeficiencyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Deficiency>, DeficiencyImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Deficiency>, DeficiencyImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut deficiencies = Vec::new();
        for (index, record) in csv_reader.deserialize::<DeficiencyRow>().enumerate() {
            let row = record?;
            if row.is_blank() {
                debug!(row = index + 1, "skipping empty deficiency row");
                continue;
            }
            deficiencies.push(row.into_deficiency(index + 1));
        }

        Ok(deficiencies)
    }
}
