pub mod args;
pub mod calendar;
pub mod compute;
pub mod display;
pub mod entities;
pub mod rates;
pub mod schema;
pub mod simulate;
pub mod summary;

use crate::core::{
    coerce_revenue, group_by_period, parse_revenue, PeriodInput, RevenueSlice, RevenueType,
    VatCategory, YearInput,
};
use gtax_derive::CsvSchema;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Description of one CSV input column
#[derive(Debug, Clone, Copy)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// One revenue slice of a period, as a CSV row
#[derive(Debug, Deserialize, CsvSchema)]
pub struct PeriodCsvRow {
    /// Month index, 0 (first month) to 11
    pub period: u8,
    /// general, electricity, tobacco, alcohol or luxury_goods
    #[serde(default)]
    pub revenue_type: Option<String>,
    /// standard, reduced, super_reduced or zero
    #[serde(default)]
    pub vat_category: Option<String>,
    /// Revenue amount, e.g. 1500000 or 1_500_000
    pub revenue: String,
}

impl PeriodCsvRow {
    fn into_slice(self, strict: bool) -> anyhow::Result<(u8, RevenueSlice)> {
        let slice = revenue_slice(
            self.period,
            self.revenue_type.as_deref(),
            self.vat_category.as_deref(),
            &self.revenue,
            strict,
        )?;
        Ok((self.period, slice))
    }
}

/// A year of declared revenue as written in a JSON file, before revenue is
/// checked
#[derive(Debug, Deserialize)]
struct YearJson {
    periods: Vec<PeriodJson>,
}

#[derive(Debug, Deserialize)]
struct PeriodJson {
    period: u8,
    #[serde(default)]
    slices: Vec<SliceJson>,
}

#[derive(Debug, Deserialize)]
struct SliceJson {
    #[serde(default)]
    revenue_type: Option<String>,
    #[serde(default)]
    vat_category: Option<String>,
    revenue: RevenueJson,
}

/// Revenue given either as a JSON number or as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RevenueJson {
    Number(serde_json::Number),
    Text(String),
}

impl RevenueJson {
    fn as_text(&self) -> String {
        match self {
            RevenueJson::Number(n) => n.to_string(),
            RevenueJson::Text(s) => s.clone(),
        }
    }
}

/// Build a slice from its raw fields. Strict mode rejects revenue that is not
/// a non-negative number, lenient mode counts it as zero.
fn revenue_slice(
    period: u8,
    revenue_type: Option<&str>,
    vat_category: Option<&str>,
    revenue: &str,
    strict: bool,
) -> anyhow::Result<RevenueSlice> {
    let revenue = if strict {
        parse_revenue(revenue).map_err(|e| anyhow::anyhow!("period {}: {}", period, e))?
    } else {
        coerce_revenue(revenue)
    };
    Ok(RevenueSlice {
        revenue_type: revenue_type.map_or(RevenueType::default(), RevenueType::from_str_lossy),
        vat_category: vat_category.map_or(VatCategory::default(), VatCategory::from_str_lossy),
        revenue,
    })
}

/// Read declared periods from a CSV or JSON file (or stdin with "-").
///
/// Files ending in `.json` hold a [`YearInput`]; anything else is read as
/// CSV rows of [`PeriodCsvRow`]. Stdin is sniffed: input starting with `{`
/// is JSON.
pub fn read_periods(path: &Path, strict: bool) -> anyhow::Result<Vec<PeriodInput>> {
    let buffer = if path.as_os_str() == "-" {
        read_stdin()?
    } else {
        let mut buffer = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut buffer)?;
        buffer
    };

    let is_json = match path.extension() {
        Some(ext) => ext.eq_ignore_ascii_case("json"),
        None => buffer
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{'),
    };

    let inputs = if is_json {
        read_periods_json(&buffer[..], strict)?
    } else {
        read_periods_csv(&buffer[..], strict)?
    };
    log::info!("Read {} period(s) from {}", inputs.len(), path.display());
    Ok(inputs)
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

fn read_periods_json<R: Read>(reader: R, strict: bool) -> anyhow::Result<Vec<PeriodInput>> {
    let raw: YearJson = serde_json::from_reader(reader)?;
    let mut periods = Vec::with_capacity(raw.periods.len());
    for period in raw.periods {
        let slices = period
            .slices
            .iter()
            .map(|s| {
                revenue_slice(
                    period.period,
                    s.revenue_type.as_deref(),
                    s.vat_category.as_deref(),
                    &s.revenue.as_text(),
                    strict,
                )
            })
            .collect::<anyhow::Result<Vec<RevenueSlice>>>()?;
        periods.push(PeriodInput {
            period: period.period,
            slices,
        });
    }

    let mut year = YearInput { periods };
    year.validate()?;
    year.periods.sort_by_key(|p| p.period);
    Ok(year.periods)
}

fn read_periods_csv<R: Read>(reader: R, strict: bool) -> anyhow::Result<Vec<PeriodInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize::<PeriodCsvRow>() {
        rows.push(result?.into_slice(strict)?);
    }
    Ok(group_by_period(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PeriodInputError;
    use rust_decimal_macros::dec;

    #[test]
    fn csv_rows_grouped_by_period() {
        let data = "\
period,revenue_type,vat_category,revenue
1,general,,2000000
0,general,reduced,1_000_000
1,electricity,,25000
";
        let inputs = read_periods_csv(data.as_bytes(), true).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].period, 0);
        assert_eq!(inputs[0].slices[0].vat_category, VatCategory::Reduced);
        assert_eq!(inputs[0].revenue(), dec!(1000000));
        assert_eq!(inputs[1].slices.len(), 2);
        assert_eq!(inputs[1].slices[1].revenue_type, RevenueType::Electricity);
    }

    #[test]
    fn csv_optional_columns() {
        let data = "period,revenue\n3,500\n";
        let inputs = read_periods_csv(data.as_bytes(), true).unwrap();
        assert_eq!(inputs[0].slices[0], RevenueSlice::general(dec!(500)));
    }

    #[test]
    fn unknown_categories_fall_back() {
        let data = "period,revenue_type,vat_category,revenue\n0,gold,luxury,100\n";
        let inputs = read_periods_csv(data.as_bytes(), true).unwrap();
        assert_eq!(inputs[0].slices[0].revenue_type, RevenueType::General);
        assert_eq!(inputs[0].slices[0].vat_category, VatCategory::Zero);
    }

    #[test]
    fn lenient_revenue_is_zero() {
        let data = "period,revenue\n0,abc\n1,-50\n";
        let inputs = read_periods_csv(data.as_bytes(), false).unwrap();
        assert_eq!(inputs[0].revenue(), dec!(0));
        assert_eq!(inputs[1].revenue(), dec!(0));
    }

    #[test]
    fn strict_revenue_rejected() {
        let data = "period,revenue\n0,abc\n";
        let err = read_periods_csv(data.as_bytes(), true).unwrap_err();
        assert!(err.to_string().contains("not a number"), "{err}");
    }

    #[test]
    fn csv_period_out_of_range() {
        let data = "period,revenue\n12,100\n";
        let err = read_periods_csv(data.as_bytes(), true).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PeriodInputError>(),
            Some(&PeriodInputError::OutOfRange(12))
        );
    }

    #[test]
    fn json_periods_sorted_and_validated() {
        let data = r#"{"periods": [
            {"period": 2, "slices": [{"revenue": 100}]},
            {"period": 0, "slices": [{"revenue_type": "electricity", "revenue": 50}]}
        ]}"#;
        let inputs = read_periods_json(data.as_bytes(), true).unwrap();
        assert_eq!(inputs[0].period, 0);
        assert_eq!(inputs[0].slices[0].revenue_type, RevenueType::Electricity);
        assert_eq!(inputs[1].revenue(), dec!(100));

        let duplicate = r#"{"periods": [
            {"period": 1, "slices": []},
            {"period": 1, "slices": []}
        ]}"#;
        assert!(read_periods_json(duplicate.as_bytes(), true).is_err());
    }

    #[test]
    fn json_revenue_checked_like_csv() {
        let data = r#"{"periods": [
            {"period": 0, "slices": [{"revenue": 1000000}, {"revenue": -900000}]},
            {"period": 1, "slices": [{"revenue": "1 500 000"}, {"revenue": "abc"}]}
        ]}"#;
        let inputs = read_periods_json(data.as_bytes(), false).unwrap();
        assert_eq!(inputs[0].slices[1].revenue, dec!(0));
        assert_eq!(inputs[0].revenue(), dec!(1000000));
        assert_eq!(inputs[1].slices[0].revenue, dec!(1500000));
        assert_eq!(inputs[1].revenue(), dec!(1500000));

        let err = read_periods_json(data.as_bytes(), true).unwrap_err();
        assert!(err.to_string().contains("period 0"), "{err}");
        assert!(err.to_string().contains("negative"), "{err}");
    }

    #[test]
    fn json_revenue_above_maximum() {
        let data = r#"{"periods": [{"period": 0, "slices": [{"revenue": 1e20}]}]}"#;
        let inputs = read_periods_json(data.as_bytes(), false).unwrap();
        assert_eq!(inputs[0].revenue(), dec!(0));

        let err = read_periods_json(data.as_bytes(), true).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"), "{err}");
    }

    #[test]
    fn csv_columns_from_row_type() {
        assert_eq!(
            PeriodCsvRow::csv_columns(),
            &["period", "revenue_type", "vat_category", "revenue"]
        );
        let required: Vec<&str> = PeriodCsvRow::csv_schema()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(required, vec!["period", "revenue"]);
    }
}
