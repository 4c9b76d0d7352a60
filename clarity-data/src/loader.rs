use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clarity_core::reference::standard_jurisdictions;
use clarity_core::{BracketSchedule, FilingStatus, TaxBracket, TaxEngineError, TaxTables};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading federal bracket tables.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid table kind: {0}")]
    InvalidKind(String),

    #[error("No brackets for tax year {0}")]
    NoRecordsForYear(i32),

    #[error("Missing {kind} schedule for {filing_status}")]
    MissingSchedule {
        kind: TableKind,
        filing_status: FilingStatus,
    },

    #[error("Invalid {kind} schedule {schedule}: {source}")]
    Schedule {
        kind: TableKind,
        schedule: String,
        #[source]
        source: TaxEngineError,
    },

    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

/// Which federal table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Ordinary,
    QualifiedDividend,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [Self::Ordinary, Self::QualifiedDividend];

    fn parse(s: &str) -> Result<Self, TaxTableLoaderError> {
        match s.trim() {
            "ordinary" => Ok(Self::Ordinary),
            "qualified_dividend" => Ok(Self::QualifiedDividend),
            other => Err(TaxTableLoaderError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Ordinary => f.write_str("ordinary"),
            Self::QualifiedDividend => f.write_str("qualified_dividend"),
        }
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatus, TaxTableLoaderError> {
    match schedule.trim() {
        "X" => Ok(FilingStatus::Single),
        "Y-1" => Ok(FilingStatus::MarriedJoint),
        "Y-2" => Ok(FilingStatus::MarriedSeparate),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        other => Err(TaxTableLoaderError::InvalidSchedule(other.to_string())),
    }
}

/// A single row of the bracket CSV.
///
/// - `tax_year`: e.g. 2025
/// - `kind`: `ordinary` or `qualified_dividend`
/// - `schedule`: IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income` / `max_income`: bracket range, empty max for unlimited
/// - `rate`: the bracket rate as a fraction (0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub kind: String,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
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

/// Builds [`TaxTables`] for another tax year from CSV.
///
/// Only the federal schedules come from the file; jurisdiction profiles are
/// the crate's built-in set.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse bracket records from any reader (a file, a byte slice, ...).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TaxTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");
        Ok(records)
    }

    /// Most recent tax year present in `records`.
    pub fn latest_year(records: &[BracketRecord]) -> Option<i32> {
        records.iter().map(|record| record.tax_year).max()
    }

    /// Assemble validated tables for `tax_year`.
    ///
    /// Rows for other years are ignored. Within a (kind, schedule) group rows
    /// may appear in any order; they are sorted by `min_income` before the
    /// schedule is validated. All eight schedules (two kinds, four filing
    /// statuses) must be present.
    pub fn build(
        records: &[BracketRecord],
        tax_year: i32,
    ) -> Result<TaxTables, TaxTableLoaderError> {
        let mut groups: BTreeMap<(TableKind, FilingStatus), Vec<&BracketRecord>> = BTreeMap::new();

        for record in records.iter().filter(|record| record.tax_year == tax_year) {
            let kind = TableKind::parse(&record.kind)?;
            let filing_status = schedule_to_filing_status(&record.schedule)?;
            groups.entry((kind, filing_status)).or_default().push(record);
        }

        if groups.is_empty() {
            return Err(TaxTableLoaderError::NoRecordsForYear(tax_year));
        }

        let mut ordinary = BTreeMap::new();
        let mut qualified_dividend = BTreeMap::new();

        for kind in TableKind::ALL {
            for filing_status in FilingStatus::ALL {
                let mut rows = groups
                    .remove(&(kind, filing_status))
                    .ok_or(TaxTableLoaderError::MissingSchedule {
                        kind,
                        filing_status,
                    })?;
                rows.sort_by_key(|record| record.min_income);

                let brackets = rows
                    .iter()
                    .map(|record| TaxBracket::new(record.min_income, record.max_income, record.rate))
                    .collect();
                let schedule = BracketSchedule::new(brackets).map_err(|source| {
                    TaxTableLoaderError::Schedule {
                        kind,
                        schedule: filing_status.code().to_string(),
                        source,
                    }
                })?;

                match kind {
                    TableKind::Ordinary => ordinary.insert(filing_status, schedule),
                    TableKind::QualifiedDividend => qualified_dividend.insert(filing_status, schedule),
                };
            }
        }

        info!(tax_year, "loaded federal bracket tables");
        Ok(TaxTables::new(
            tax_year,
            ordinary,
            qualified_dividend,
            standard_jurisdictions(),
        ))
    }

    /// Read `path` and build tables for `tax_year`, or for the latest year in
    /// the file when `tax_year` is `None`.
    pub fn load_file(
        path: &Path,
        tax_year: Option<i32>,
    ) -> Result<TaxTables, TaxTableLoaderError> {
        let file = File::open(path).map_err(|source| TaxTableLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = Self::parse(file)?;

        let year = match tax_year.or_else(|| Self::latest_year(&records)) {
            Some(year) => year,
            None => return Err(TaxTableLoaderError::CsvParse(format!("{} has no rows", path.display()))),
        };

        Self::build(&records, year)
    }
}
