//! Integration tests for loading bracket tables from the bundled CSV and
//! running the engine against them.

use std::io::Write;

use clarity_core::{FilingStatus, Money, Percentage, TaxBracketEngine, TaxTables};
use clarity_data::{TableKind, TaxTableLoader, TaxTableLoaderError};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const FEDERAL_CSV: &str = include_str!("../test-data/federal_brackets.csv");

fn load(tax_year: i32) -> TaxTables {
    let records = TaxTableLoader::parse(FEDERAL_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxTableLoader::build(&records, tax_year).expect("Failed to build tables")
}

#[test]
fn test_bundled_csv_has_two_years() {
    let records = TaxTableLoader::parse(FEDERAL_CSV.as_bytes()).unwrap();

    assert_eq!(records.len(), 80);
    assert_eq!(TaxTableLoader::latest_year(&records), Some(2025));
}

#[test]
fn test_2024_csv_matches_built_in_tables() {
    let loaded = load(2024);
    let standard = TaxTables::standard();

    assert_eq!(loaded.tax_year(), standard.tax_year());
    for status in FilingStatus::ALL {
        assert_eq!(
            loaded.ordinary_schedule(status).unwrap(),
            standard.ordinary_schedule(status).unwrap(),
            "ordinary {status}"
        );
        assert_eq!(
            loaded.qualified_dividend_schedule(status).unwrap(),
            standard.qualified_dividend_schedule(status).unwrap(),
            "qualified dividend {status}"
        );
    }
    assert_eq!(loaded.jurisdictions(), standard.jurisdictions());
}

#[test]
fn test_2025_single_federal_tax() {
    let tables = load(2025);
    let engine = TaxBracketEngine::new(&tables);

    let result = engine
        .compute_effective_tax(Money::new(dec!(75000)), FilingStatus::Single, "Texas")
        .unwrap();

    // 1192.50 + 4386 + 5835.50
    assert_eq!(result.federal_tax, Money::new(dec!(11414.00)));
    assert_eq!(result.bracket_index, 2);
    assert_eq!(result.marginal_rate, Percentage::from_fraction(dec!(0.22)));
}

#[test]
fn test_2025_married_joint_dividend_threshold() {
    let tables = load(2025);
    let engine = TaxBracketEngine::new(&tables);

    let below = engine
        .qualified_dividend_rate("Texas", FilingStatus::MarriedJoint, Money::new(dec!(96699.99)))
        .unwrap();
    let at = engine
        .qualified_dividend_rate("Texas", FilingStatus::MarriedJoint, Money::new(dec!(96700)))
        .unwrap();

    assert_eq!(below, Percentage::ZERO);
    assert_eq!(at, Percentage::from_fraction(dec!(0.15)));
}

#[test]
fn test_2025_comparison_uses_loaded_schedules() {
    let tables = load(2025);
    let engine = TaxBracketEngine::new(&tables);

    let comparison = engine
        .compare_jurisdictions(Money::new(dec!(75000)), FilingStatus::Single, &["Texas", "Puerto Rico"])
        .unwrap();

    let texas = comparison.iter().find(|row| row.jurisdiction == "Texas").unwrap();
    assert_eq!(texas.total_tax, Money::new(dec!(11414.00)));
    assert_eq!(comparison.first().unwrap().jurisdiction, "Puerto Rico");
}

#[test]
fn test_missing_schedule_is_reported() {
    let trimmed: String = FEDERAL_CSV
        .lines()
        .filter(|line| !line.starts_with("2025,ordinary,Y-2"))
        .map(|line| format!("{line}\n"))
        .collect();
    let records = TaxTableLoader::parse(trimmed.as_bytes()).unwrap();

    let err = TaxTableLoader::build(&records, 2025).unwrap_err();

    assert!(
        matches!(
            err,
            TaxTableLoaderError::MissingSchedule {
                kind: TableKind::Ordinary,
                filing_status: FilingStatus::MarriedSeparate,
            }
        ),
        "got: {err:?}"
    );
    assert_eq!(err.to_string(), "Missing ordinary schedule for Married Filing Separately");
}

#[test]
fn test_load_file_defaults_to_latest_year() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FEDERAL_CSV.as_bytes()).unwrap();

    let latest = TaxTableLoader::load_file(file.path(), None).unwrap();
    let pinned = TaxTableLoader::load_file(file.path(), Some(2024)).unwrap();

    assert_eq!(latest.tax_year(), 2025);
    assert_eq!(pinned.tax_year(), 2024);
}

#[test]
fn test_load_file_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    let err = TaxTableLoader::load_file(&path, None).unwrap_err();

    assert!(matches!(err, TaxTableLoaderError::Io { .. }), "got: {err:?}");
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_load_file_header_only() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "tax_year,kind,schedule,min_income,max_income,rate").unwrap();

    let err = TaxTableLoader::load_file(file.path(), None).unwrap_err();

    assert!(matches!(err, TaxTableLoaderError::CsvParse(_)), "got: {err:?}");
}
