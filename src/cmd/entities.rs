//! Entities command - a simulated registry of businesses

use crate::core::simulate::SimulatedEntity;
use crate::core::{simulate_entities, summarize_year, RateTable};
use crate::cmd::display::format_amount;
use chrono::{Local, NaiveDate};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct EntitiesCommand {
    /// Number of businesses to simulate
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Seed for a reproducible registry
    #[arg(short, long)]
    seed: Option<u64>,

    /// Date payment statuses are evaluated on (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    today: Option<NaiveDate>,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Company")]
    company_name: String,
    #[tabled(rename = "Country")]
    country: &'static str,
    #[tabled(rename = "Industry")]
    industry: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Last Payment")]
    last_payment: String,
    #[tabled(rename = "Annual Revenue")]
    revenue: String,
    #[tabled(rename = "Annual Tax")]
    tax: String,
}

impl From<&SimulatedEntity> for EntityRow {
    fn from(entity: &SimulatedEntity) -> Self {
        let summary = summarize_year(&entity.periods);
        EntityRow {
            id: entity.id.clone(),
            company_name: entity.company_name.clone(),
            country: entity.jurisdiction.name(),
            industry: entity.industry.as_str(),
            status: entity.payment_status.as_str(),
            last_payment: entity.last_payment.format("%Y-%m-%d").to_string(),
            revenue: format_amount(summary.total_revenue),
            tax: format_amount(summary.total_tax),
        }
    }
}

impl EntitiesCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let entities = simulate_entities(rates, self.count, today, &mut rng);
        log::info!("Simulated {} entities as of {}", entities.len(), today);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entities)?);
            return Ok(());
        }

        if entities.is_empty() {
            println!("No entities to display");
            return Ok(());
        }
        let rows: Vec<EntityRow> = entities.iter().map(EntityRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(6..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!("Amounts in {}, statuses as of {}", rates.currency, today);
        Ok(())
    }
}
