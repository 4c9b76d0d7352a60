//! Report types printed by the subcommands, as plain text or JSON.

use std::fmt::{self, Write};

use clap::ValueEnum;
use clarity_core::{
    FilingStatus, JurisdictionComparison, JurisdictionTaxProfile, Money, Percentage,
    QualifiedDividendTreatment, StateIncomeTax, TaxBracket, TaxComputationResult,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// A command result that can be printed either way.
pub trait Render: Serialize {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result;
}

pub fn render<T: Render>(
    report: &T,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            report.write_text(&mut out)?;
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn range(bracket: &TaxBracket) -> String {
    match bracket.max_income {
        Some(max) => format!("{} - {}", bracket.min_income, max),
        None => format!("{} and up", bracket.min_income),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxReport {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub jurisdiction: String,
    pub after_tax_income: Money,
    #[serde(flatten)]
    pub result: TaxComputationResult,
}

impl Render for TaxReport {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        let r = &self.result;
        writeln!(out, "Tax year:                {}", self.tax_year)?;
        writeln!(out, "Filing status:           {}", self.filing_status)?;
        writeln!(out, "Jurisdiction:            {}", self.jurisdiction)?;
        writeln!(out, "Income:                  {}", r.income)?;
        writeln!(out, "Federal tax:             {}", r.federal_tax)?;
        writeln!(out, "State tax:               {}", r.state_tax)?;
        writeln!(out, "Total tax:               {}", r.total_tax)?;
        writeln!(out, "After-tax income:        {}", self.after_tax_income)?;
        writeln!(out, "Marginal rate:           {}", r.marginal_rate)?;
        writeln!(out, "Bracket index:           {}", r.bracket_index)?;
        writeln!(out, "Effective rate:          {}", r.effective_rate)?;
        writeln!(out, "Combined effective rate: {}", r.combined_effective_rate)?;

        if r.federal_breakdown.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "Federal breakdown")?;
        writeln!(out, "{:>3}  {:<28} {:>7} {:>15} {:>13}", "#", "Range", "Rate", "Taxable", "Tax")?;
        for row in &r.federal_breakdown {
            writeln!(
                out,
                "{:>3}  {:<28} {:>7} {:>15} {:>13}",
                row.index,
                range(&row.bracket),
                row.bracket.rate.to_string(),
                row.taxable_amount.to_string(),
                row.tax.to_string(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DividendReport {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub jurisdiction: String,
    pub income: Money,
    pub qualified_dividend_rate: Percentage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividends: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_tax: Option<Money>,
}

impl Render for DividendReport {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        writeln!(out, "Tax year:                {}", self.tax_year)?;
        writeln!(out, "Filing status:           {}", self.filing_status)?;
        writeln!(out, "Jurisdiction:            {}", self.jurisdiction)?;
        writeln!(out, "Income:                  {}", self.income)?;
        writeln!(out, "Qualified dividend rate: {}", self.qualified_dividend_rate)?;
        if let (Some(dividends), Some(tax)) = (self.dividends, self.dividend_tax) {
            writeln!(out, "Dividends:               {dividends}")?;
            writeln!(out, "Dividend tax:            {tax}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub income: Money,
    pub rows: JurisdictionComparison,
}

impl Render for ComparisonReport {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        writeln!(
            out,
            "{} income of {} ({})",
            self.filing_status, self.income, self.tax_year
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "{:>4}  {:<16} {:>15} {:>15} {:>15} {:>9}",
            "Rank", "Jurisdiction", "Total tax", "State tax", "After tax", "QD rate"
        )?;
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(
                out,
                "{:>4}  {:<16} {:>15} {:>15} {:>15} {:>9}",
                rank + 1,
                row.jurisdiction,
                row.total_tax.to_string(),
                row.state_tax.to_string(),
                row.after_tax_income.to_string(),
                row.qualified_dividend_rate.to_string(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Ordinary income brackets
    #[default]
    Ordinary,
    /// Qualified dividend thresholds
    QualifiedDividend,
}

impl fmt::Display for ScheduleKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Ordinary => f.write_str("Ordinary income"),
            Self::QualifiedDividend => f.write_str("Qualified dividend"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketsReport {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub kind: ScheduleKind,
    pub brackets: Vec<TaxBracket>,
}

impl Render for BracketsReport {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        writeln!(out, "{} brackets, {} ({})", self.kind, self.filing_status, self.tax_year)?;
        for (index, bracket) in self.brackets.iter().enumerate() {
            writeln!(
                out,
                "{:>3}  {:<28} {:>7}",
                index,
                range(bracket),
                bracket.rate.to_string()
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct JurisdictionsReport {
    pub jurisdictions: Vec<JurisdictionTaxProfile>,
}

fn describe_state_tax(tax: &StateIncomeTax) -> String {
    match tax {
        StateIncomeTax::None => "none".to_string(),
        StateIncomeTax::Flat(rate) => format!("flat {rate}"),
        StateIncomeTax::Progressive(schedule) => format!("progressive, {} brackets", schedule.len()),
    }
}

impl Render for JurisdictionsReport {
    fn write_text(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        writeln!(out, "{:<14} {:<6} {:<26} {}", "Jurisdiction", "Code", "Income tax", "Qualified dividends")?;
        for profile in &self.jurisdictions {
            let dividends = match profile.qualified_dividends {
                QualifiedDividendTreatment::FederalSchedule => "federal schedule",
                QualifiedDividendTreatment::Exempt => "exempt",
            };
            writeln!(
                out,
                "{:<14} {:<6} {:<26} {}",
                profile.name,
                profile.code,
                describe_state_tax(&profile.state_tax),
                dividends
            )?;
        }
        Ok(())
    }
}
