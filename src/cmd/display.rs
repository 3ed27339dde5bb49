use crate::core::{AnnualSummary, MinimumTaxCheck, PeriodRecord, TaxBreakdown};
use rust_decimal::Decimal;
use std::io;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_name(period: u8) -> &'static str {
    MONTHS.get(period as usize).copied().unwrap_or("?")
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// One tax bucket of a breakdown
#[derive(Debug, Clone, Tabled)]
struct BucketRow {
    #[tabled(rename = "Tax")]
    tax: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

pub fn print_breakdown(breakdown: &TaxBreakdown, currency: &str) {
    let rows = vec![
        BucketRow {
            tax: "VAT",
            amount: format_amount(breakdown.vat),
        },
        BucketRow {
            tax: "Corporate tax",
            amount: format_amount(breakdown.corporate_tax),
        },
        BucketRow {
            tax: "Personal income tax",
            amount: format_amount(breakdown.personal_income_tax),
        },
        BucketRow {
            tax: "License tax",
            amount: format_amount(breakdown.license_tax),
        },
        BucketRow {
            tax: "Electricity surtax",
            amount: format_amount(breakdown.electricity_surtax),
        },
        BucketRow {
            tax: "Excise duty",
            amount: format_amount(breakdown.excise_duty),
        },
        BucketRow {
            tax: "Total",
            amount: format!("{} {}", format_amount(breakdown.total_tax), currency),
        },
    ];
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    if !breakdown.minimum_tax.is_zero() {
        println!(
            "Minimum tax {} vs corporate tax {}{}",
            format_amount(breakdown.minimum_tax),
            format_amount(breakdown.corporate_tax_before_floor),
            if breakdown.floor_applied() { " (minimum tax applied)" } else { "" }
        );
    }
}

/// Row for period tables and CSV output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct PeriodRow {
    #[tabled(rename = "#")]
    pub period: u8,

    #[tabled(rename = "Month")]
    pub month: &'static str,

    #[tabled(rename = "Revenue")]
    pub revenue: String,

    #[tabled(rename = "Slices")]
    pub slices: usize,

    #[tabled(rename = "VAT")]
    pub vat: String,

    #[tabled(rename = "Corporate")]
    pub corporate_tax: String,

    #[tabled(rename = "Personal")]
    pub personal_income_tax: String,

    #[tabled(rename = "License")]
    pub license_tax: String,

    #[tabled(rename = "Electricity")]
    pub electricity_surtax: String,

    #[tabled(rename = "Excise")]
    pub excise_duty: String,

    #[tabled(rename = "Min. Tax")]
    pub minimum_tax: String,

    #[tabled(rename = "Total Tax")]
    pub total_tax: String,
}

impl From<&PeriodRecord> for PeriodRow {
    fn from(record: &PeriodRecord) -> Self {
        let b = &record.breakdown;
        PeriodRow {
            period: record.period,
            month: month_name(record.period),
            revenue: format_amount(record.revenue),
            slices: record.slices.len(),
            vat: format_amount(b.vat),
            corporate_tax: format_amount(b.corporate_tax),
            personal_income_tax: format_amount(b.personal_income_tax),
            license_tax: format_amount(b.license_tax),
            electricity_surtax: format_amount(b.electricity_surtax),
            excise_duty: format_amount(b.excise_duty),
            minimum_tax: format_amount(b.minimum_tax),
            total_tax: format_amount(b.total_tax),
        }
    }
}

pub fn print_periods(records: &[PeriodRecord]) {
    if records.is_empty() {
        println!("No periods to display");
        return;
    }
    let rows: Vec<PeriodRow> = records.iter().map(PeriodRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

pub fn write_periods_csv(records: &[PeriodRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    for record in records {
        wtr.serialize(PeriodRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_annual_summary(summary: &AnnualSummary, currency: &str) {
    println!(
        "ANNUAL TOTAL ({} period{}): revenue {} {} | tax {} {}",
        summary.period_count,
        if summary.period_count == 1 { "" } else { "s" },
        format_amount(summary.total_revenue),
        currency,
        format_amount(summary.total_tax),
        currency
    );
}

pub fn print_minimum_tax_check(check: Option<&MinimumTaxCheck>, currency: &str) {
    match check {
        Some(check) => {
            println!("MINIMUM TAX CHECK");
            println!(
                "  Annual revenue: {} {}",
                format_amount(check.annual_revenue),
                currency
            );
            println!(
                "  Minimum tax: {} | Corporate tax before floor: {}",
                format_amount(check.minimum_tax),
                format_amount(check.corporate_tax_before_floor)
            );
            if check.floor_applies {
                println!("  Minimum tax applies: it exceeds the computed corporate tax");
            } else {
                println!("  Corporate tax applies: it exceeds the minimum tax");
            }
        }
        None => println!("MINIMUM TAX CHECK: not applicable"),
    }
}
