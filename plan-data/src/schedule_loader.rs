use std::io::Read;

use plan_core::{ScheduleError, SupportBracket, SupportSchedule};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a support schedule.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the support schedule CSV file.
///
/// - `min_income`, `max_income`: inclusive combined monthly net income range
/// - `children_1` .. `children_5`: flat monthly obligation per number of
///   children; an empty cell means the schedule has no entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub min_income: Decimal,
    pub max_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub children_1: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub children_2: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub children_3: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub children_4: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub children_5: Option<Decimal>,
}

impl From<ScheduleRecord> for SupportBracket {
    fn from(record: ScheduleRecord) -> Self {
        SupportBracket {
            min_income: record.min_income,
            max_income: record.max_income,
            amounts: [
                record.children_1,
                record.children_2,
                record.children_3,
                record.children_4,
                record.children_5,
            ],
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for guideline schedules from CSV files.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule rows from a CSV reader without validating them.
    pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and validate a complete schedule.
    ///
    /// Rows must be sorted by income and must not overlap.
    pub fn parse<R: Read>(reader: R) -> Result<SupportSchedule, ScheduleLoaderError> {
        let records = Self::parse_records(reader)?;
        debug!(brackets = records.len(), "parsed support schedule");
        let schedule = SupportSchedule::new(records.into_iter().map(SupportBracket::from).collect())?;
        Ok(schedule)
    }
}
