//! Rates command - print the active rate table

use crate::cmd::display::format_rate;
use crate::core::RateTable;
use clap::Args;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Output as JSON, in the format accepted by --rates
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Rate")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl RatesCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(rates)?);
            return Ok(());
        }

        let rows: Vec<RateRow> = rates
            .entries()
            .into_iter()
            .map(|(name, value)| RateRow {
                name,
                value: format_rate(value),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!("Currency: {}", rates.currency);
        Ok(())
    }
}
