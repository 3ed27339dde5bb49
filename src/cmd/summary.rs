//! Summary command - taxes for a year of declared periods

use crate::cmd::args::FloorPolicyArg;
use crate::cmd::display::{print_annual_summary, print_minimum_tax_check, print_periods};
use crate::cmd::read_periods;
use crate::core::{
    check_minimum_tax, compute_year, compute_year_streaming, summarize_year, AnnualSummary,
    FloorPolicy, MinimumTaxCheck, PeriodRecord, RateTable,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// CSV or JSON file containing declared periods (or "-" for stdin)
    #[arg(short, long)]
    periods: PathBuf,

    /// Declare as an individual (personal income tax instead of corporate tax)
    #[arg(short, long)]
    individual: bool,

    /// Where the minimum tax is applied within a period
    #[arg(short, long, value_enum, default_value_t = FloorPolicyArg::PerCall)]
    floor_policy: FloorPolicyArg,

    /// Base the minimum tax on each period's own revenue instead of the year's total
    #[arg(long)]
    streaming: bool,

    /// Reject revenue that is not a non-negative number instead of treating it as zero
    #[arg(long)]
    strict: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SummaryData<'a> {
    currency: &'a str,
    is_individual: bool,
    periods: &'a [PeriodRecord],
    summary: AnnualSummary,
    minimum_tax_check: Option<MinimumTaxCheck>,
}

impl SummaryCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let inputs = read_periods(&self.periods, self.strict)?;
        if inputs.is_empty() {
            anyhow::bail!("No periods found in {}", self.periods.display());
        }

        let policy: FloorPolicy = self.floor_policy.into();
        let records = if self.streaming {
            compute_year_streaming(rates, &inputs, self.individual, policy)
        } else {
            compute_year(rates, &inputs, self.individual, policy)
        };
        let summary = summarize_year(&records);
        let check = check_minimum_tax(rates, summary.total_revenue, self.individual);

        if self.json {
            let data = SummaryData {
                currency: &rates.currency,
                is_individual: self.individual,
                periods: &records,
                summary,
                minimum_tax_check: check,
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            print_periods(&records);
            print_annual_summary(&summary, &rates.currency);
            println!();
            print_minimum_tax_check(check.as_ref(), &rates.currency);
        }
        Ok(())
    }
}
