//! Compute command - taxes on a single revenue amount

use crate::cmd::args::{RevenueTypeArg, VatCategoryArg};
use crate::cmd::display::print_breakdown;
use crate::core::{
    coerce_revenue, compute_taxes, parse_revenue, ComputeOptions, RateTable, TaxBreakdown,
};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ComputeCommand {
    /// Revenue amount, e.g. 1000000 or "1 000 000"
    #[arg(allow_hyphen_values = true)]
    revenue: String,

    /// VAT category for general sales
    #[arg(short, long, value_enum, default_value_t = VatCategoryArg::Standard)]
    vat_category: VatCategoryArg,

    /// Kind of revenue
    #[arg(short = 't', long, value_enum, default_value_t = RevenueTypeArg::General)]
    revenue_type: RevenueTypeArg,

    /// Declare as an individual (personal income tax instead of corporate tax)
    #[arg(short, long)]
    individual: bool,

    /// Total annual revenue used for the minimum tax (defaults to REVENUE)
    #[arg(short, long)]
    annual_revenue: Option<String>,

    /// Reject revenue that is not a non-negative number instead of treating it as zero
    #[arg(long)]
    strict: bool,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ComputeOutput<'a> {
    currency: &'a str,
    revenue: Decimal,
    revenue_type: &'static str,
    vat_category: &'static str,
    is_individual: bool,
    #[serde(flatten)]
    breakdown: TaxBreakdown,
}

impl ComputeCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let revenue = self.parse(&self.revenue)?;
        let base = if self.individual {
            ComputeOptions::individual()
        } else {
            ComputeOptions::default()
        };
        let mut options = base
            .with_revenue_type(self.revenue_type.into())
            .with_vat_category(self.vat_category.into());
        if let Some(annual) = &self.annual_revenue {
            options = options.with_annual_revenue(self.parse(annual)?);
        }

        let breakdown = compute_taxes(rates, revenue, &options);

        if self.json {
            let output = ComputeOutput {
                currency: &rates.currency,
                revenue,
                revenue_type: options.revenue_type.as_str(),
                vat_category: options.vat_category.as_str(),
                is_individual: options.is_individual,
                breakdown,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Revenue {} {} ({}, VAT {}{})",
                revenue,
                rates.currency,
                options.revenue_type,
                options.vat_category,
                if options.is_individual { ", individual" } else { "" }
            );
            print_breakdown(&breakdown, &rates.currency);
        }
        Ok(())
    }

    fn parse(&self, input: &str) -> anyhow::Result<Decimal> {
        if self.strict {
            Ok(parse_revenue(input)?)
        } else {
            Ok(coerce_revenue(input))
        }
    }
}
