//! Simulate command - a generated year of revenue and taxes for one entity

use crate::cmd::args::{FloorPolicyArg, IndustryArg};
use crate::cmd::display::{print_annual_summary, print_periods, write_periods_csv};
use crate::core::{
    compute_year, generate, generate_inputs, summarize_year, AnnualSummary, FloorPolicy,
    IndustryProfile, PeriodRecord, RateTable,
};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// Industry profile used to draw monthly revenue
    #[arg(long, value_enum, default_value_t = IndustryArg::General)]
    industry: IndustryArg,

    /// Simulate an individual instead of a company
    #[arg(short, long)]
    individual: bool,

    /// Seed for a reproducible dataset
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where the minimum tax is applied within a period
    #[arg(short, long, value_enum, default_value_t = FloorPolicyArg::PerCall)]
    floor_policy: FloorPolicyArg,

    /// Use the simulated year's total revenue as the minimum-tax basis
    #[arg(long)]
    two_pass: bool,

    /// Output as CSV
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SimulateOutput<'a> {
    currency: &'a str,
    industry: &'static str,
    is_individual: bool,
    periods: &'a [PeriodRecord],
    summary: AnnualSummary,
}

impl SimulateCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let industry: IndustryProfile = self.industry.into();
        let policy: FloorPolicy = self.floor_policy.into();

        let records = if self.two_pass {
            let inputs = generate_inputs(industry, &mut rng);
            compute_year(rates, &inputs, self.individual, policy)
        } else {
            generate(rates, industry, self.individual, &mut rng, policy)
        };
        let summary = summarize_year(&records);
        log::info!(
            "Simulated {} periods for a {} {}",
            records.len(),
            industry,
            if self.individual { "individual" } else { "company" }
        );

        if self.csv {
            write_periods_csv(&records)
        } else if self.json {
            let output = SimulateOutput {
                currency: &rates.currency,
                industry: industry.as_str(),
                is_individual: self.individual,
                periods: &records,
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        } else {
            print_periods(&records);
            print_annual_summary(&summary, &rates.currency);
            Ok(())
        }
    }
}
