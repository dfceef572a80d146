//! The three incident reductions.
//!
//! Each pass is a pure function over the immutable record slice:
//! incidents per hour of day, night incidents per patrol area, and
//! incidents per victim age bracket. Peaks carry explicit tie-break
//! rules so re-runs and re-implementations agree on the answer.

use crate::models::{
    AgeBracket, AgeBracketCounts, HourlyCounts, IncidentRecord, NightAreaCounts, HOURS_PER_DAY,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// The night window: 22:00 through 03:59. A fixed hour set rather
/// than a range because it wraps around midnight.
pub const NIGHT_HOURS: [u8; 6] = [22, 23, 0, 1, 2, 3];

/// Errors produced by the aggregation passes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// A record's time field cannot be parsed to an hour. Fatal for
    /// the hour-deriving passes; corrupt times indicate systemic data
    /// corruption, so there is no skip-and-count fallback.
    #[error("Row {row}: cannot derive an hour from time value '{value}'")]
    MalformedTime { row: u64, value: String },

    /// The table has zero rows, so the hourly peak is undefined.
    #[error("Dataset contains no records; peak hour is undefined")]
    EmptyDataset,

    /// No record falls in the night window, so the peak night area is
    /// undefined.
    #[error("No incidents in the night window (22:00-03:59); peak night area is undefined")]
    NoNightIncidents,

    /// No record carries a bracketable age, so the age distribution is
    /// undefined.
    #[error("No records with a valid victim age; age distribution is undefined")]
    NoValidAges,
}

type Result<T> = std::result::Result<T, AggregationError>;

/// Derive a record's hour or attribute the failure to its source row.
fn hour_of(record: &IncidentRecord) -> Result<u8> {
    record
        .hour_occurred()
        .ok_or_else(|| AggregationError::MalformedTime {
            row: record.source_row,
            value: record.occurred_time.clone(),
        })
}

/// Count incidents per hour of day.
///
/// The result is dense: all 24 hours present, zero-filled, ascending.
/// Every record lands in exactly one bucket, so the counts sum to the
/// input length.
pub fn hourly_counts(records: &[IncidentRecord]) -> Result<HourlyCounts> {
    if records.is_empty() {
        return Err(AggregationError::EmptyDataset);
    }

    let mut counts = [0u64; HOURS_PER_DAY];
    for record in records {
        counts[hour_of(record)? as usize] += 1;
    }

    debug!("Hourly pass bucketed {} records", records.len());
    Ok(HourlyCounts::new(counts))
}

/// Count night-window incidents per patrol area.
///
/// Entries come back in descending-count order. Areas with equal
/// counts keep first-encountered order from the counting pass: the
/// counting table tracks insertion order and the sort is stable, so
/// ties are deterministic.
pub fn night_area_counts(records: &[IncidentRecord]) -> Result<NightAreaCounts> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for record in records {
        let hour = hour_of(record)?;
        if !NIGHT_HOURS.contains(&hour) {
            continue;
        }

        let area = record.area_name.as_str();
        if !counts.contains_key(area) {
            order.push(area);
        }
        *counts.entry(area).or_insert(0) += 1;
    }

    if order.is_empty() {
        return Err(AggregationError::NoNightIncidents);
    }

    let mut entries: Vec<(String, u64)> = order
        .into_iter()
        .map(|area| (area.to_string(), counts[area]))
        .collect();
    entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    debug!("Night pass counted {} distinct areas", entries.len());
    Ok(NightAreaCounts::new(entries))
}

/// Count incidents per victim age bracket.
///
/// Records with a missing or negative age are excluded from every
/// bracket and tallied separately; the bracketed counts therefore sum
/// to input length minus the excluded tally.
pub fn age_bracket_counts(records: &[IncidentRecord]) -> Result<AgeBracketCounts> {
    let mut counts = [0u64; 7];
    let mut excluded = 0u64;

    for record in records {
        match record.victim_age.and_then(AgeBracket::from_age) {
            Some(bracket) => counts[bracket.index()] += 1,
            None => excluded += 1,
        }
    }

    if counts.iter().all(|&c| c == 0) {
        return Err(AggregationError::NoValidAges);
    }

    debug!(
        "Age pass bracketed {} records, excluded {}",
        records.len() as u64 - excluded,
        excluded
    );
    Ok(AgeBracketCounts::new(counts, excluded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(time: &str, area: &str, age: Option<i32>, row: u64) -> IncidentRecord {
        IncidentRecord {
            reported_date: NaiveDate::from_ymd_opt(2020, 1, 8).unwrap(),
            occurred_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            occurred_time: time.to_string(),
            area_name: area.to_string(),
            victim_age: age,
            source_row: row,
        }
    }

    fn at_hour(hour: u8) -> IncidentRecord {
        record(&format!("{:02}30", hour), "Central", Some(30), 2)
    }

    #[test]
    fn hourly_counts_bucket_every_record() {
        let records: Vec<IncidentRecord> =
            [5u8, 5, 5, 13, 13, 22].iter().map(|&h| at_hour(h)).collect();

        let counts = hourly_counts(&records).unwrap();
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(5), 3);
        assert_eq!(counts.get(13), 2);
        assert_eq!(counts.get(22), 1);
        assert_eq!(counts.get(0), 0);
        assert_eq!(counts.peak(), (5, 3));
    }

    #[test]
    fn hourly_counts_reject_empty_dataset() {
        assert_eq!(
            hourly_counts(&[]).unwrap_err(),
            AggregationError::EmptyDataset
        );
    }

    #[test]
    fn hourly_counts_fail_on_malformed_time() {
        let records = vec![at_hour(5), record("26XX", "Central", None, 3)];

        let err = hourly_counts(&records).unwrap_err();
        assert_eq!(
            err,
            AggregationError::MalformedTime {
                row: 3,
                value: "26XX".to_string()
            }
        );
    }

    #[test]
    fn hourly_rerun_is_identical() {
        let records: Vec<IncidentRecord> = [3u8, 9, 9, 21].iter().map(|&h| at_hour(h)).collect();
        assert_eq!(
            hourly_counts(&records).unwrap(),
            hourly_counts(&records).unwrap()
        );
    }

    #[test]
    fn night_window_wraps_midnight() {
        // 22:00, 23:59, 00:00, 03:59 are night; 04:00 and 21:59 are not.
        let records = vec![
            record("2200", "A", None, 2),
            record("2359", "A", None, 3),
            record("0000", "B", None, 4),
            record("0359", "B", None, 5),
            record("0400", "C", None, 6),
            record("2159", "C", None, 7),
        ];

        let counts = night_area_counts(&records).unwrap();
        assert_eq!(counts.total(), 4);
        assert!(counts.iter().all(|(area, _)| area != "C"));
    }

    #[test]
    fn night_area_peak_scenario() {
        let records = vec![
            record("2300", "A", None, 2),
            record("0100", "A", None, 3),
            record("0200", "B", None, 4),
            record("1200", "B", None, 5), // daytime, ignored
        ];

        let counts = night_area_counts(&records).unwrap();
        assert_eq!(counts.peak(), Some(("A", 2)));
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn night_area_ties_keep_first_encountered_order() {
        let records = vec![
            record("2300", "Hollywood", None, 2),
            record("2300", "Central", None, 3),
            record("0100", "Hollywood", None, 4),
            record("0100", "Central", None, 5),
        ];

        let counts = night_area_counts(&records).unwrap();
        let areas: Vec<&str> = counts.iter().map(|(area, _)| area).collect();
        assert_eq!(areas, vec!["Hollywood", "Central"]);
        assert_eq!(counts.peak(), Some(("Hollywood", 2)));
    }

    #[test]
    fn night_area_counts_reject_all_day_dataset() {
        let records = vec![record("1200", "A", None, 2), record("0800", "B", None, 3)];
        assert_eq!(
            night_area_counts(&records).unwrap_err(),
            AggregationError::NoNightIncidents
        );
    }

    #[test]
    fn night_area_counts_fail_on_malformed_time() {
        let records = vec![record("9999", "A", None, 2)];
        assert_eq!(
            night_area_counts(&records).unwrap_err(),
            AggregationError::MalformedTime {
                row: 2,
                value: "9999".to_string()
            }
        );
    }

    #[test]
    fn age_brackets_scenario_with_missing_age() {
        let records = vec![
            record("1200", "A", Some(10), 2),
            record("1200", "A", Some(20), 3),
            record("1200", "A", Some(20), 4),
            record("1200", "A", None, 5),
        ];

        let counts = age_bracket_counts(&records).unwrap();
        assert_eq!(counts.get(AgeBracket::Under18), 1);
        assert_eq!(counts.get(AgeBracket::Age18To25), 2);
        assert_eq!(counts.total_valid(), 3);
        assert_eq!(counts.excluded(), 1);
        assert!((counts.percentage(AgeBracket::Under18) - 33.333).abs() < 0.01);
        assert!((counts.percentage(AgeBracket::Age18To25) - 66.666).abs() < 0.01);
    }

    #[test]
    fn age_shortfall_equals_excluded_count() {
        let records = vec![
            record("1200", "A", Some(40), 2),
            record("1200", "A", Some(-5), 3),
            record("1200", "A", None, 4),
            record("1200", "A", Some(0), 5),
        ];

        let counts = age_bracket_counts(&records).unwrap();
        assert_eq!(
            counts.total_valid() + counts.excluded(),
            records.len() as u64
        );
        assert_eq!(counts.excluded(), 2);
        // Age 0 lands in the first bracket rather than the excluded tally.
        assert_eq!(counts.get(AgeBracket::Under18), 1);
    }

    #[test]
    fn age_brackets_reject_dataset_without_valid_ages() {
        let records = vec![record("1200", "A", None, 2), record("1200", "A", Some(-1), 3)];
        assert_eq!(
            age_bracket_counts(&records).unwrap_err(),
            AggregationError::NoValidAges
        );
    }

    #[test]
    fn age_pass_ignores_time_field_entirely() {
        // Corrupt times do not disturb the age reduction.
        let records = vec![record("bad!", "A", Some(30), 2)];
        let counts = age_bracket_counts(&records).unwrap();
        assert_eq!(counts.get(AgeBracket::Age26To34), 1);
    }
}
