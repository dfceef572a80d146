//! Dataset loading for the incident table.
//!
//! This module reads the source CSV into a `Vec<IncidentRecord>`,
//! checking the schema up front and decoding dates, times, and ages
//! with the load-time error taxonomy. The occurred-time column is
//! decoded as a string so leading zeros are never lost.

use crate::models::IncidentRecord;
use chrono::{NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column headers the source file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["Date Rptd", "DATE OCC", "TIME OCC", "AREA NAME", "Vict Age"];

/// Date layouts accepted for the two date columns. The first matches
/// the upstream open-data export ("01/08/2020 12:00:00 AM").
const DATETIME_FORMATS: [&str; 2] = ["%m/%d/%Y %I:%M:%S %p", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Rows between spinner updates while streaming the file.
const PROGRESS_EVERY: u64 = 10_000;

/// Errors that can occur while loading the dataset.
///
/// All of these are fatal and abort the run before any aggregation.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode dataset row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: cannot parse {column} value '{value}' as a date")]
    InvalidDate {
        row: u64,
        column: &'static str,
        value: String,
    },
}

type Result<T> = std::result::Result<T, DatasetError>;

/// One row as it appears in the source file, before typing.
///
/// `TIME OCC` and `Vict Age` stay strings here: the time must keep its
/// leading zeros and the age field is decoded leniently (empty or
/// non-numeric values become "no age", not an error).
#[derive(Debug, Deserialize)]
struct RawIncident {
    #[serde(rename = "Date Rptd")]
    reported_date: String,
    #[serde(rename = "DATE OCC")]
    occurred_date: String,
    #[serde(rename = "TIME OCC")]
    occurred_time: String,
    #[serde(rename = "AREA NAME")]
    area_name: String,
    #[serde(rename = "Vict Age", default)]
    victim_age: Option<String>,
}

/// The loaded, immutable incident table.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
}

impl Dataset {
    /// The record sequence the aggregation passes reduce over.
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the file held a header but no data rows.
    #[allow(dead_code)] // Companion to len()
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest occurred date, for the load banner.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.occurred_date;
        let (min, max) = self
            .records
            .iter()
            .fold((first, first), |(min, max), record| {
                (
                    min.min(record.occurred_date),
                    max.max(record.occurred_date),
                )
            });
        Some((min, max))
    }
}

/// Load the incident table from a CSV file.
///
/// Checks that every required column is present before decoding any
/// row, then streams rows into typed records. Shows a spinner while
/// streaming since upstream exports run to hundreds of thousands of
/// rows.
pub fn load_dataset(path: &Path, show_progress: bool) -> Result<Dataset> {
    info!("Loading dataset from {}", path.display());

    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    check_schema(reader.headers()?)?;

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        Some(pb)
    } else {
        None
    };

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RawIncident>().enumerate() {
        // Header is line 1, first data row is line 2.
        let source_row = index as u64 + 2;
        let raw = row?;
        records.push(typed_record(raw, source_row)?);

        if let Some(ref pb) = spinner {
            if source_row % PROGRESS_EVERY == 0 {
                pb.set_message(format!("{} rows loaded", records.len()));
                pb.tick();
            }
        }
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    debug!("Loaded {} records", records.len());
    Ok(Dataset { records })
}

/// Verify every required column is present in the header row.
fn check_schema(headers: &csv::StringRecord) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column));
        }
    }
    Ok(())
}

/// Convert a raw row into a typed record, attributing failures to the
/// source line.
fn typed_record(raw: RawIncident, source_row: u64) -> Result<IncidentRecord> {
    let reported_date = parse_date(&raw.reported_date, "Date Rptd", source_row)?;
    let occurred_date = parse_date(&raw.occurred_date, "DATE OCC", source_row)?;

    Ok(IncidentRecord {
        reported_date,
        occurred_date,
        occurred_time: normalize_time(&raw.occurred_time),
        area_name: raw.area_name.trim().to_string(),
        victim_age: parse_age(raw.victim_age.as_deref()),
        source_row,
    })
}

/// Parse a date column value, trying the datetime layouts first.
fn parse_date(value: &str, column: &'static str, row: u64) -> Result<NaiveDate> {
    let trimmed = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    Err(DatasetError::InvalidDate {
        row,
        column,
        value: value.to_string(),
    })
}

/// Left-pad the occurred time to 4 characters.
///
/// Upstream exports store "15" for 00:15; padding restores the dropped
/// leading zeros. Inputs longer than 4 characters or with non-digit
/// content are kept verbatim and rejected by the hour derivation, not
/// silently truncated.
fn normalize_time(value: &str) -> String {
    format!("{:0>4}", value.trim())
}

/// Decode the victim age field.
///
/// Empty and non-numeric values mean "age unknown" and are excluded
/// from the age aggregation downstream. They are not load errors.
fn parse_age(value: Option<&str>) -> Option<i32> {
    value.and_then(|v| v.trim().parse().ok())
}
