use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clarity_core::Money;

use crate::output::{OutputFormat, ScheduleKind};

/// Federal and state income tax by bracket, side by side across jurisdictions.
///
/// Defaults for filing status, jurisdiction and income come from a TOML
/// profile (`--config`, `$INCOME_CLARITY_CONFIG` or `./income-clarity.toml`);
/// flags override it.
#[derive(Debug, Parser)]
#[command(name = "income-clarity", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML profile to read defaults from.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CSV of federal bracket tables to use instead of the built-in 2024 set.
    #[arg(long, global = true, value_name = "CSV")]
    pub tables: Option<PathBuf>,

    /// Tax year to take from `--tables` (latest in the file by default).
    #[arg(long, global = true)]
    pub tax_year: Option<i32>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log filter, e.g. `debug` or `clarity_core=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Federal plus jurisdiction tax on an income, with the bracket breakdown
    Tax(ProfileArgs),
    /// Qualified dividend rate for an income, and optionally the tax on an amount
    DividendRate(DividendRateArgs),
    /// Rank jurisdictions by total tax on the same income
    Compare(CompareArgs),
    /// List a federal bracket schedule
    Brackets(BracketsArgs),
    /// List the known jurisdictions
    Jurisdictions,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// Annual taxable income, e.g. 75000 or "$75,000.00".
    #[arg(long, allow_negative_numbers = true)]
    pub income: Option<Money>,

    /// Filing status: single, married-joint, married-separate,
    /// head-of-household, or S / MFJ / MFS / HOH.
    #[arg(long)]
    pub status: Option<String>,

    /// Jurisdiction name or code, e.g. "Texas" or TX.
    #[arg(long)]
    pub jurisdiction: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DividendRateArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Qualified dividend amount to compute the tax on.
    #[arg(long, allow_negative_numbers = true)]
    pub dividends: Option<Money>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CompareArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub income: Option<Money>,

    #[arg(long)]
    pub status: Option<String>,

    /// Jurisdiction to include; repeat for more. Falls back to the profile's
    /// `[compare]` list, then to a built-in set.
    #[arg(long = "jurisdiction", value_name = "NAME")]
    pub jurisdictions: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BracketsArgs {
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long, value_enum, default_value_t = ScheduleKind::Ordinary)]
    pub kind: ScheduleKind,
}
