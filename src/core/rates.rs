use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("rate '{name}' must be between 0 and 1, got {value}")]
    OutOfRange { name: &'static str, value: Decimal },
    #[error("failed to read rate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rate table: {0}")]
    Json(#[from] serde_json::Error),
}

/// VAT tier applied to general sales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VatCategory {
    #[default]
    Standard,
    Reduced,
    SuperReduced,
    /// Exports and other zero-rated operations
    Zero,
}

impl VatCategory {
    pub fn from_str(s: &str) -> Option<VatCategory> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "standard" => Some(VatCategory::Standard),
            "reduced" => Some(VatCategory::Reduced),
            "super_reduced" => Some(VatCategory::SuperReduced),
            "zero" => Some(VatCategory::Zero),
            _ => None,
        }
    }

    /// Unknown categories are zero-rated.
    pub fn from_str_lossy(s: &str) -> VatCategory {
        VatCategory::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown VAT category '{}', applying zero rate", s);
            VatCategory::Zero
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VatCategory::Standard => "standard",
            VatCategory::Reduced => "reduced",
            VatCategory::SuperReduced => "super_reduced",
            VatCategory::Zero => "zero",
        }
    }
}

impl std::fmt::Display for VatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Product classes subject to excise duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExciseClass {
    Tobacco,
    Alcohol,
    LuxuryGoods,
}

impl ExciseClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExciseClass::Tobacco => "tobacco",
            ExciseClass::Alcohol => "alcohol",
            ExciseClass::LuxuryGoods => "luxury_goods",
        }
    }
}

/// Kind of revenue being declared. Anything other than `General` selects an
/// alternate tax path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevenueType {
    #[default]
    General,
    /// Electricity billing, taxed only through the electricity surtax
    Electricity,
    Tobacco,
    Alcohol,
    LuxuryGoods,
}

impl RevenueType {
    pub fn from_str(s: &str) -> Option<RevenueType> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "general" => Some(RevenueType::General),
            "electricity" => Some(RevenueType::Electricity),
            "tobacco" => Some(RevenueType::Tobacco),
            "alcohol" => Some(RevenueType::Alcohol),
            "luxury_goods" => Some(RevenueType::LuxuryGoods),
            _ => None,
        }
    }

    /// Unknown revenue types are taxed on the general path.
    pub fn from_str_lossy(s: &str) -> RevenueType {
        RevenueType::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown revenue type '{}', using general", s);
            RevenueType::General
        })
    }

    pub fn excise_class(&self) -> Option<ExciseClass> {
        match self {
            RevenueType::Tobacco => Some(ExciseClass::Tobacco),
            RevenueType::Alcohol => Some(ExciseClass::Alcohol),
            RevenueType::LuxuryGoods => Some(ExciseClass::LuxuryGoods),
            RevenueType::General | RevenueType::Electricity => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueType::General => "general",
            RevenueType::Electricity => "electricity",
            RevenueType::Tobacco => "tobacco",
            RevenueType::Alcohol => "alcohol",
            RevenueType::LuxuryGoods => "luxury_goods",
        }
    }

    /// Resolve the tax regime this revenue type falls under
    pub fn regime(&self, rates: &RateTable) -> Regime {
        match self {
            RevenueType::General => Regime::General,
            RevenueType::Electricity => Regime::Surtax {
                rate: rates.electricity_surtax,
            },
            other => match other.excise_class() {
                Some(class) => Regime::Excise {
                    class,
                    rate: rates.excise.rate(class),
                },
                None => Regime::General,
            },
        }
    }
}

impl std::fmt::Display for RevenueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a revenue type is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// VAT, license tax and corporate/personal income tax
    General,
    /// Replaces the whole general regime
    Surtax { rate: Decimal },
    /// Added on top of the general regime
    Excise { class: ExciseClass, rate: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VatRates {
    #[schemars(with = "f64")]
    pub standard: Decimal,
    #[schemars(with = "f64")]
    pub reduced: Decimal,
    #[schemars(with = "f64")]
    pub super_reduced: Decimal,
    #[schemars(with = "f64")]
    pub zero: Decimal,
}

impl Default for VatRates {
    fn default() -> Self {
        VatRates {
            standard: dec!(0.18),
            reduced: dec!(0.10),
            super_reduced: dec!(0.05),
            zero: dec!(0),
        }
    }
}

impl VatRates {
    pub fn rate(&self, category: VatCategory) -> Decimal {
        match category {
            VatCategory::Standard => self.standard,
            VatCategory::Reduced => self.reduced,
            VatCategory::SuperReduced => self.super_reduced,
            VatCategory::Zero => self.zero,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExciseRates {
    #[schemars(with = "f64")]
    pub tobacco: Decimal,
    #[schemars(with = "f64")]
    pub alcohol: Decimal,
    #[schemars(with = "f64")]
    pub luxury_goods: Decimal,
}

impl Default for ExciseRates {
    fn default() -> Self {
        ExciseRates {
            tobacco: dec!(0.45),
            alcohol: dec!(0.30),
            luxury_goods: dec!(0.20),
        }
    }
}

impl ExciseRates {
    pub fn rate(&self, class: ExciseClass) -> Decimal {
        match class {
            ExciseClass::Tobacco => self.tobacco,
            ExciseClass::Alcohol => self.alcohol,
            ExciseClass::LuxuryGoods => self.luxury_goods,
        }
    }
}

/// Tax rates used by every computation.
///
/// Rates are illustrative. A table is built once, either from the defaults or
/// from a JSON file, and passed by reference; fields missing from the JSON
/// keep their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RateTable {
    /// Display label for amounts, no conversion is performed
    pub currency: String,
    pub vat: VatRates,
    /// Replaces VAT and license tax on electricity billing
    #[schemars(with = "f64")]
    pub electricity_surtax: Decimal,
    /// Corporate tax (IS)
    #[schemars(with = "f64")]
    pub corporate: Decimal,
    /// Minimum tax (IMF), as a fraction of total annual revenue
    #[schemars(with = "f64")]
    pub minimum_tax: Decimal,
    /// Flat placeholder for personal income tax (IRPP)
    #[schemars(with = "f64")]
    pub personal_income: Decimal,
    /// License tax (Patente), as a fraction of revenue
    #[schemars(with = "f64")]
    pub license: Decimal,
    pub excise: ExciseRates,
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable {
            currency: "FCFA".to_string(),
            vat: VatRates::default(),
            electricity_surtax: dec!(0.09),
            corporate: dec!(0.30),
            minimum_tax: dec!(0.01),
            personal_income: dec!(0.10),
            license: dec!(0.025),
            excise: ExciseRates::default(),
        }
    }
}

impl RateTable {
    /// Read a rate table from JSON and check every rate is a fraction
    pub fn from_json<R: Read>(reader: R) -> Result<Self, RateError> {
        let table: RateTable = serde_json::from_reader(reader)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, RateError> {
        let file = File::open(path)?;
        let table = Self::from_json(BufReader::new(file))?;
        log::info!("Loaded rate table from {}", path.display());
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RateError> {
        for (name, value) in self.entries() {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(RateError::OutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Every named rate in the table
    pub fn entries(&self) -> Vec<(&'static str, Decimal)> {
        vec![
            ("vat.standard", self.vat.standard),
            ("vat.reduced", self.vat.reduced),
            ("vat.super_reduced", self.vat.super_reduced),
            ("vat.zero", self.vat.zero),
            ("electricity_surtax", self.electricity_surtax),
            ("corporate", self.corporate),
            ("minimum_tax", self.minimum_tax),
            ("personal_income", self.personal_income),
            ("license", self.license),
            ("excise.tobacco", self.excise.tobacco),
            ("excise.alcohol", self.excise.alcohol),
            ("excise.luxury_goods", self.excise.luxury_goods),
        ]
    }

    pub fn vat_rate(&self, category: VatCategory) -> Decimal {
        self.vat.rate(category)
    }
}
