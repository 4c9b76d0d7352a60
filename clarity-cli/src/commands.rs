//! Subcommand handlers. Each one resolves its inputs against the profile,
//! calls the engine and returns the rendered report.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clarity_core::{
    DEFAULT_COMPARISON_SET, FilingStatus, Money, TaxBracketEngine, TaxEngineError, TaxTables,
};
use clarity_data::TaxTableLoader;
use tracing::{debug, info};

use crate::cli::{BracketsArgs, Command, CompareArgs, DividendRateArgs, ProfileArgs};
use crate::config::{ClarityConfig, ProfileConfig, TablesConfig};
use crate::output::{
    BracketsReport, ComparisonReport, DividendReport, JurisdictionsReport, OutputFormat,
    ScheduleKind, TaxReport, render,
};

/// Tables named by `--tables` / `[tables]`, or the built-in set.
pub fn load_tables(
    path: Option<&Path>,
    tax_year: Option<i32>,
    config: &TablesConfig,
) -> Result<Cow<'static, TaxTables>> {
    let path = path.or(config.path.as_deref());
    let tax_year = tax_year.or(config.tax_year);

    match path {
        Some(path) => {
            let tables = TaxTableLoader::load_file(path, tax_year)
                .with_context(|| format!("failed to load tables from {}", path.display()))?;
            Ok(Cow::Owned(tables))
        }
        None => {
            let standard = TaxTables::standard();
            match tax_year {
                Some(year) if year != standard.tax_year() => bail!(
                    "no built-in tables for tax year {year} (built-in: {}); pass --tables",
                    standard.tax_year()
                ),
                _ => Ok(Cow::Borrowed(standard)),
            }
        }
    }
}

/// Runs `command` and returns what should be printed on stdout.
pub fn run(
    command: &Command,
    tables: &TaxTables,
    config: &ClarityConfig,
    format: OutputFormat,
) -> Result<String> {
    let engine = TaxBracketEngine::new(tables);
    debug!(?command, tax_year = tables.tax_year(), "running command");

    match command {
        Command::Tax(args) => render(&tax(engine, args, &config.profile)?, format),
        Command::DividendRate(args) => render(&dividend_rate(engine, args, &config.profile)?, format),
        Command::Compare(args) => render(&compare(engine, args, config)?, format),
        Command::Brackets(args) => render(&brackets(engine, args, &config.profile)?, format),
        Command::Jurisdictions => render(
            &JurisdictionsReport {
                jurisdictions: tables.jurisdictions().to_vec(),
            },
            format,
        ),
    }
}

/// One-line message for `err`, naming the input field when an engine error
/// is anywhere in the chain.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<TaxEngineError>()) {
        Some(engine_err) => format!("invalid {}: {engine_err}", engine_err.field()),
        None => format!("{err:#}"),
    }
}

fn resolve_income(
    flag: Option<Money>,
    profile: &ProfileConfig,
) -> Result<Money> {
    match flag.or(profile.annual_income) {
        Some(income) => Ok(income),
        None => bail!("no income given; pass --income or set annual_income under [profile]"),
    }
}

fn resolve_status(
    flag: Option<&str>,
    profile: &ProfileConfig,
) -> Result<FilingStatus> {
    match flag.or(profile.filing_status.as_deref()) {
        Some(text) => Ok(text.parse::<FilingStatus>()?),
        None => Ok(FilingStatus::Single),
    }
}

fn resolve_jurisdiction<'a>(
    flag: Option<&'a str>,
    profile: &'a ProfileConfig,
) -> Result<&'a str> {
    match flag.or(profile.jurisdiction.as_deref()) {
        Some(name) => Ok(name),
        None => bail!("no jurisdiction given; pass --jurisdiction or set jurisdiction under [profile]"),
    }
}

fn tax(
    engine: TaxBracketEngine<'_>,
    args: &ProfileArgs,
    profile: &ProfileConfig,
) -> Result<TaxReport> {
    let income = resolve_income(args.income, profile)?;
    let filing_status = resolve_status(args.status.as_deref(), profile)?;
    let jurisdiction = resolve_jurisdiction(args.jurisdiction.as_deref(), profile)?;

    let result = engine.compute_effective_tax(income, filing_status, jurisdiction)?;
    let name = engine.jurisdiction(jurisdiction)?.name.clone();
    info!(jurisdiction = %name, total_tax = %result.total_tax, "computed tax");

    Ok(TaxReport {
        tax_year: engine.tables().tax_year(),
        filing_status,
        jurisdiction: name,
        after_tax_income: result.after_tax_income(),
        result,
    })
}

fn dividend_rate(
    engine: TaxBracketEngine<'_>,
    args: &DividendRateArgs,
    profile: &ProfileConfig,
) -> Result<DividendReport> {
    let income = resolve_income(args.profile.income, profile)?;
    let filing_status = resolve_status(args.profile.status.as_deref(), profile)?;
    let jurisdiction = resolve_jurisdiction(args.profile.jurisdiction.as_deref(), profile)?;

    let rate = engine.qualified_dividend_rate(jurisdiction, filing_status, income)?;
    let dividend_tax = args
        .dividends
        .map(|dividends| engine.dividend_tax(jurisdiction, filing_status, income, dividends))
        .transpose()?;

    Ok(DividendReport {
        tax_year: engine.tables().tax_year(),
        filing_status,
        jurisdiction: engine.jurisdiction(jurisdiction)?.name.clone(),
        income,
        qualified_dividend_rate: rate,
        dividends: args.dividends,
        dividend_tax,
    })
}

fn compare(
    engine: TaxBracketEngine<'_>,
    args: &CompareArgs,
    config: &ClarityConfig,
) -> Result<ComparisonReport> {
    let income = resolve_income(args.income, &config.profile)?;
    let filing_status = resolve_status(args.status.as_deref(), &config.profile)?;

    let rows = if !args.jurisdictions.is_empty() {
        engine.compare_jurisdictions(income, filing_status, &args.jurisdictions)?
    } else if !config.compare.jurisdictions.is_empty() {
        engine.compare_jurisdictions(income, filing_status, &config.compare.jurisdictions)?
    } else {
        engine.compare_jurisdictions(income, filing_status, &DEFAULT_COMPARISON_SET)?
    };

    Ok(ComparisonReport {
        tax_year: engine.tables().tax_year(),
        filing_status,
        income,
        rows,
    })
}

fn brackets(
    engine: TaxBracketEngine<'_>,
    args: &BracketsArgs,
    profile: &ProfileConfig,
) -> Result<BracketsReport> {
    let filing_status = resolve_status(args.status.as_deref(), profile)?;
    let schedule = match args.kind {
        ScheduleKind::Ordinary => engine.bracket_schedule(filing_status)?,
        ScheduleKind::QualifiedDividend => engine.tables().qualified_dividend_schedule(filing_status)?,
    };

    Ok(BracketsReport {
        tax_year: engine.tables().tax_year(),
        filing_status,
        kind: args.kind,
        brackets: schedule.to_vec(),
    })
}
