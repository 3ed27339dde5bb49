mod cmd;
mod core;

use crate::cmd::{
    calendar::CalendarCommand, compute::ComputeCommand, entities::EntitiesCommand,
    rates::RatesCommand, schema::SchemaCommand, simulate::SimulateCommand,
    summary::SummaryCommand,
};
use crate::core::RateTable;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gtax", version, about = "Small-business tax calculator")]
struct Cli {
    /// JSON rate table replacing the built-in rates
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the taxes on a single revenue amount
    Compute(ComputeCommand),
    /// Generate a year of simulated revenue and compute its taxes
    Simulate(SimulateCommand),
    /// Compute a year of declared periods with annual totals
    Summary(SummaryCommand),
    /// Simulate a registry of businesses with payment statuses
    Entities(EntitiesCommand),
    /// List filing deadlines for a jurisdiction
    Calendar(CalendarCommand),
    /// Print the active rate table
    Rates(RatesCommand),
    /// Print expected input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let rates = match &cli.rates {
        Some(path) => RateTable::load(path)?,
        None => RateTable::default(),
    };

    match cli.command {
        Command::Compute(cmd) => cmd.exec(&rates),
        Command::Simulate(cmd) => cmd.exec(&rates),
        Command::Summary(cmd) => cmd.exec(&rates),
        Command::Entities(cmd) => cmd.exec(&rates),
        Command::Calendar(cmd) => cmd.exec(),
        Command::Rates(cmd) => cmd.exec(&rates),
        Command::Schema(cmd) => cmd.exec(),
    }
}
