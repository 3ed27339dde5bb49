use super::rates::{RateTable, Regime, RevenueType, VatCategory};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RevenueError {
    #[error("revenue is empty")]
    Empty,
    #[error("revenue is not a number: '{0}'")]
    NotANumber(String),
    #[error("revenue cannot be negative: {0}")]
    Negative(Decimal),
    #[error("revenue {0} exceeds the maximum of {}", MAX_REVENUE)]
    TooLarge(Decimal),
}

/// Largest revenue accepted for a single amount. Larger amounts are refused
/// when parsed and capped when passed to [`compute_taxes`].
pub const MAX_REVENUE: Decimal = dec!(1000000000000000);

/// Revenue as it is taxed: negative amounts count as zero and amounts above
/// [`MAX_REVENUE`] are capped
pub fn clamp_revenue(revenue: Decimal) -> Decimal {
    revenue.clamp(Decimal::ZERO, MAX_REVENUE)
}

/// Sum of amounts, saturating instead of overflowing
pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Strictly parse a revenue amount typed by a user.
///
/// Whitespace and `_` digit separators are ignored, so "1 000 000" and
/// "1_000_000" both parse. Scientific notation is accepted. Amounts above
/// [`MAX_REVENUE`] are refused.
pub fn parse_revenue(input: &str) -> Result<Decimal, RevenueError> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(RevenueError::Empty);
    }
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| RevenueError::NotANumber(input.trim().to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RevenueError::Negative(value));
    }
    if value > MAX_REVENUE {
        return Err(RevenueError::TooLarge(value));
    }
    Ok(value)
}

/// Lenient revenue parsing for partially filled input: anything that is not
/// a non-negative number counts as zero.
pub fn coerce_revenue(input: &str) -> Decimal {
    parse_revenue(input).unwrap_or_else(|err| {
        log::debug!("Treating revenue as zero: {}", err);
        Decimal::ZERO
    })
}

/// Amount the minimum tax is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MinimumTaxBasis {
    /// Use the revenue passed to this computation. Only exact when that
    /// revenue is the full-year total; for a single period it approximates.
    #[default]
    ThisRevenue,
    /// The entity's true total annual revenue
    AnnualRevenue(Decimal),
    /// Do not apply the floor here, the caller applies it to a merged total
    Deferred,
}

/// Options for a single tax computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputeOptions {
    pub vat_category: VatCategory,
    pub revenue_type: RevenueType,
    pub is_individual: bool,
    pub minimum_tax_basis: MinimumTaxBasis,
}

impl ComputeOptions {
    pub fn individual() -> Self {
        ComputeOptions {
            is_individual: true,
            ..Default::default()
        }
    }

    pub fn with_revenue_type(mut self, revenue_type: RevenueType) -> Self {
        self.revenue_type = revenue_type;
        self
    }

    pub fn with_vat_category(mut self, vat_category: VatCategory) -> Self {
        self.vat_category = vat_category;
        self
    }

    pub fn with_annual_revenue(mut self, annual_revenue: Decimal) -> Self {
        self.minimum_tax_basis = MinimumTaxBasis::AnnualRevenue(annual_revenue);
        self
    }

    pub fn with_basis(mut self, basis: MinimumTaxBasis) -> Self {
        self.minimum_tax_basis = basis;
        self
    }
}

/// Taxes owed on one revenue amount.
///
/// `total_tax` is always the sum of the six tax buckets. `minimum_tax` and
/// `corporate_tax_before_floor` are informational and not part of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaxBreakdown {
    #[schemars(with = "f64")]
    pub vat: Decimal,
    /// Corporate tax after the minimum-tax floor
    #[schemars(with = "f64")]
    pub corporate_tax: Decimal,
    #[schemars(with = "f64")]
    pub personal_income_tax: Decimal,
    #[schemars(with = "f64")]
    pub license_tax: Decimal,
    #[schemars(with = "f64")]
    pub electricity_surtax: Decimal,
    #[schemars(with = "f64")]
    pub excise_duty: Decimal,
    #[schemars(with = "f64")]
    pub minimum_tax: Decimal,
    #[schemars(with = "f64")]
    pub corporate_tax_before_floor: Decimal,
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
}

impl TaxBreakdown {
    /// Sum of the tax buckets
    pub fn bucket_sum(&self) -> Decimal {
        sum_amounts([
            self.vat,
            self.corporate_tax,
            self.personal_income_tax,
            self.license_tax,
            self.electricity_surtax,
            self.excise_duty,
        ])
    }

    /// Whether the minimum tax replaced the computed corporate tax
    pub fn floor_applied(&self) -> bool {
        self.corporate_tax > self.corporate_tax_before_floor
    }

    /// Raise corporate tax to `minimum_tax` if it is lower.
    ///
    /// Used on breakdowns computed with a deferred floor. Breakdowns without
    /// corporate tax (individuals, electricity billing) are left untouched.
    pub fn apply_minimum_tax(mut self, minimum_tax: Decimal) -> Self {
        if self.corporate_tax_before_floor.is_zero() && self.corporate_tax.is_zero() {
            return self;
        }
        self.minimum_tax = minimum_tax;
        self.corporate_tax = self.corporate_tax_before_floor.max(minimum_tax);
        self.total_tax = self.bucket_sum();
        self
    }
}

impl std::ops::Add for TaxBreakdown {
    type Output = TaxBreakdown;

    fn add(self, other: TaxBreakdown) -> TaxBreakdown {
        let mut sum = TaxBreakdown {
            vat: self.vat.saturating_add(other.vat),
            corporate_tax: self.corporate_tax.saturating_add(other.corporate_tax),
            personal_income_tax: self
                .personal_income_tax
                .saturating_add(other.personal_income_tax),
            license_tax: self.license_tax.saturating_add(other.license_tax),
            electricity_surtax: self
                .electricity_surtax
                .saturating_add(other.electricity_surtax),
            excise_duty: self.excise_duty.saturating_add(other.excise_duty),
            minimum_tax: self.minimum_tax.saturating_add(other.minimum_tax),
            corporate_tax_before_floor: self
                .corporate_tax_before_floor
                .saturating_add(other.corporate_tax_before_floor),
            total_tax: Decimal::ZERO,
        };
        sum.total_tax = sum.bucket_sum();
        sum
    }
}

impl std::iter::Sum for TaxBreakdown {
    fn sum<I: Iterator<Item = TaxBreakdown>>(iter: I) -> Self {
        iter.fold(TaxBreakdown::default(), |acc, b| acc + b)
    }
}

impl<'a> std::iter::Sum<&'a TaxBreakdown> for TaxBreakdown {
    fn sum<I: Iterator<Item = &'a TaxBreakdown>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Compute the taxes owed on `revenue`.
///
/// Never fails: negative revenue is treated as zero and revenue above
/// [`MAX_REVENUE`] is capped. Electricity billing is
/// taxed only by the surtax. Excise duty is added on top of VAT and license
/// tax. Individuals pay the flat personal rate and no VAT, license or
/// corporate tax. Entities pay the higher of corporate tax and the minimum
/// tax on `options.minimum_tax_basis`; a zero revenue carries no minimum tax.
pub fn compute_taxes(
    rates: &RateTable,
    revenue: Decimal,
    options: &ComputeOptions,
) -> TaxBreakdown {
    let revenue = clamp_revenue(revenue);

    let mut vat = revenue * rates.vat_rate(options.vat_category);
    let mut license_tax = revenue * rates.license;
    let mut electricity_surtax = Decimal::ZERO;
    let mut excise_duty = Decimal::ZERO;

    let regime = options.revenue_type.regime(rates);
    log::trace!("Revenue {} ({}) taxed under {:?}", revenue, options.revenue_type, regime);

    match regime {
        Regime::Surtax { rate } => {
            electricity_surtax = revenue * rate;
            let total_tax = electricity_surtax;
            return TaxBreakdown {
                electricity_surtax,
                total_tax,
                ..Default::default()
            };
        }
        Regime::Excise { class, rate } => {
            excise_duty = revenue * rate;
            log::trace!("{} excise duty {}", class.as_str(), excise_duty);
        }
        Regime::General => {}
    }

    let mut corporate_tax = Decimal::ZERO;
    let mut corporate_tax_before_floor = Decimal::ZERO;
    let mut personal_income_tax = Decimal::ZERO;
    let mut minimum_tax = Decimal::ZERO;

    if options.is_individual {
        personal_income_tax = revenue * rates.personal_income;
        vat = Decimal::ZERO;
        license_tax = Decimal::ZERO;
    } else {
        corporate_tax_before_floor = revenue * rates.corporate;
        corporate_tax = corporate_tax_before_floor;

        // nothing declared, nothing to floor
        let basis = match options.minimum_tax_basis {
            _ if revenue.is_zero() => None,
            MinimumTaxBasis::ThisRevenue => Some(revenue),
            MinimumTaxBasis::AnnualRevenue(total) => Some(total.max(Decimal::ZERO)),
            MinimumTaxBasis::Deferred => None,
        };
        if let Some(basis) = basis {
            minimum_tax = basis * rates.minimum_tax;
            if minimum_tax > corporate_tax {
                log::debug!(
                    "Minimum tax {} exceeds corporate tax {} on revenue {}",
                    minimum_tax,
                    corporate_tax,
                    revenue
                );
                corporate_tax = minimum_tax;
            }
        }
    }

    let mut breakdown = TaxBreakdown {
        vat,
        corporate_tax,
        personal_income_tax,
        license_tax,
        electricity_surtax,
        excise_duty,
        minimum_tax,
        corporate_tax_before_floor,
        total_tax: Decimal::ZERO,
    };
    breakdown.total_tax = breakdown.bucket_sum();
    breakdown
}
