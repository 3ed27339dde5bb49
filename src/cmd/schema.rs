//! Schema command - print expected input formats

use crate::cmd::PeriodCsvRow;
use crate::core::{RateTable, YearInput};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, rates-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the periods input file
    JsonSchema,
    /// JSON Schema for the --rates file
    RatesSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(YearInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::RatesSchema => {
                let schema = schema_for!(RateTable);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", PeriodCsvRow::csv_columns().join(",")),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in PeriodCsvRow::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("One row per revenue slice; rows sharing a period are merged.");
    }
}
