//! Calendar command - filing deadlines for a jurisdiction

use crate::cmd::display::month_name;
use crate::core::calendar::due_day_for;
use crate::core::period::PERIODS_PER_YEAR;
use crate::core::{monthly_due_date, Jurisdiction, PaymentStatus};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct CalendarCommand {
    /// Country name or code (Gabon/GAB, Ghana/GHA, France/FRA)
    #[arg(short, long, default_value = "Gabon")]
    country: String,

    /// Calendar year (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Classify a last payment date (YYYY-MM-DD) against today's deadline
    #[arg(short, long)]
    last_payment: Option<NaiveDate>,

    /// Date to evaluate the payment status on (defaults to today)
    #[arg(short, long)]
    today: Option<NaiveDate>,
}

#[derive(Tabled)]
struct DeadlineRow {
    #[tabled(rename = "Period")]
    period: &'static str,
    #[tabled(rename = "Due")]
    due: String,
}

impl CalendarCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let Some(jurisdiction) = Jurisdiction::from_str(&self.country) else {
            log::warn!("No filing calendar for '{}'", self.country);
            println!(
                "No filing calendar for {}: monthly taxes are due on day {} of the following month",
                self.country,
                due_day_for(&self.country)
            );
            return Ok(());
        };
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let year = self.year.unwrap_or_else(|| today.year());

        let rows = (0..PERIODS_PER_YEAR)
            .map(|period| {
                let due = monthly_due_date(jurisdiction, year, period).ok_or_else(|| {
                    anyhow::anyhow!("Year {} is outside the supported date range", year)
                })?;
                Ok(DeadlineRow {
                    period: month_name(period),
                    due: due.format("%Y-%m-%d").to_string(),
                })
            })
            .collect::<anyhow::Result<Vec<DeadlineRow>>>()?;
        println!(
            "{} monthly deadlines for {} (day {} of the following month)",
            jurisdiction,
            year,
            jurisdiction.monthly_due_day()
        );
        println!("{}", Table::new(rows).with(Style::rounded()));

        let installments = jurisdiction.corporate_installments(year);
        if !installments.is_empty() {
            let dates: Vec<String> = installments
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            println!("Corporate tax installments: {}", dates.join(", "));
        }
        if let Some(due) = jurisdiction.annual_return_due(year) {
            println!("Annual return for {}: due {}", year, due.format("%Y-%m-%d"));
        }

        if let Some(last_payment) = self.last_payment {
            let status = PaymentStatus::classify(Some(last_payment), today, jurisdiction);
            println!(
                "Payment status on {} (last payment {}): {}",
                today, last_payment, status
            );
        }
        Ok(())
    }
}
