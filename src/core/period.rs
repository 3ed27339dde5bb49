//! Combining breakdowns within a period and across a year

use super::compute::{
    clamp_revenue, compute_taxes, sum_amounts, ComputeOptions, MinimumTaxBasis, TaxBreakdown,
};
use super::rates::{RateTable, RevenueType, VatCategory};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PERIODS_PER_YEAR: u8 = 12;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodInputError {
    #[error("period {0} is outside 0-11")]
    OutOfRange(u8),
    #[error("period {0} appears more than once")]
    Duplicate(u8),
}

/// Whether the minimum-tax floor is applied to every revenue slice or once to
/// the merged period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloorPolicy {
    /// Each slice compares its own corporate tax with the minimum tax, so a
    /// period with several slices can pay the floor more than once
    #[default]
    PerCall,
    /// Slices are computed without the floor and it is applied once to the
    /// period's merged corporate tax
    PerPeriod,
}

/// Part of a period's revenue belonging to one revenue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RevenueSlice {
    #[serde(default)]
    pub revenue_type: RevenueType,
    #[serde(default)]
    pub vat_category: VatCategory,
    #[schemars(with = "f64")]
    pub revenue: Decimal,
}

impl RevenueSlice {
    pub fn new(revenue_type: RevenueType, revenue: Decimal) -> Self {
        RevenueSlice {
            revenue_type,
            vat_category: VatCategory::default(),
            revenue,
        }
    }

    pub fn general(revenue: Decimal) -> Self {
        Self::new(RevenueType::General, revenue)
    }

    /// Revenue this slice is taxed on
    pub fn taxable_revenue(&self) -> Decimal {
        clamp_revenue(self.revenue)
    }
}

/// Declared revenue for one month, before any tax is computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodInput {
    /// Month index, 0 is the first month of the reporting year
    pub period: u8,
    pub slices: Vec<RevenueSlice>,
}

impl PeriodInput {
    /// Taxable revenue of the period: negative slices count as zero
    pub fn revenue(&self) -> Decimal {
        sum_amounts(self.slices.iter().map(RevenueSlice::taxable_revenue))
    }
}

/// A year of declared revenue, as read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct YearInput {
    pub periods: Vec<PeriodInput>,
}

impl YearInput {
    pub fn validate(&self) -> Result<(), PeriodInputError> {
        let mut seen = [false; PERIODS_PER_YEAR as usize];
        for input in &self.periods {
            let slot = seen
                .get_mut(input.period as usize)
                .ok_or(PeriodInputError::OutOfRange(input.period))?;
            if *slot {
                return Err(PeriodInputError::Duplicate(input.period));
            }
            *slot = true;
        }
        Ok(())
    }
}

/// Group per-slice rows into one input per period, ordered by period
pub fn group_by_period<I>(rows: I) -> Result<Vec<PeriodInput>, PeriodInputError>
where
    I: IntoIterator<Item = (u8, RevenueSlice)>,
{
    let mut periods: BTreeMap<u8, Vec<RevenueSlice>> = BTreeMap::new();
    for (period, slice) in rows {
        if period >= PERIODS_PER_YEAR {
            return Err(PeriodInputError::OutOfRange(period));
        }
        periods.entry(period).or_default().push(slice);
    }
    Ok(periods
        .into_iter()
        .map(|(period, slices)| PeriodInput { period, slices })
        .collect())
}

/// Taxes for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRecord {
    pub period: u8,
    /// Sum of the taxable slice revenues
    pub revenue: Decimal,
    #[serde(flatten)]
    pub breakdown: TaxBreakdown,
    #[serde(skip)]
    pub slices: Vec<RevenueSlice>,
}

/// Totals across the periods of a reporting year
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AnnualSummary {
    pub period_count: usize,
    pub total_revenue: Decimal,
    pub total_tax: Decimal,
    pub breakdown: TaxBreakdown,
}

/// Comparison of the annual minimum tax with the computed corporate tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinimumTaxCheck {
    pub annual_revenue: Decimal,
    pub minimum_tax: Decimal,
    pub corporate_tax_before_floor: Decimal,
    pub floor_applies: bool,
}

/// Field-wise sum of breakdowns. An empty slice gives the zero breakdown.
pub fn merge_breakdowns(breakdowns: &[TaxBreakdown]) -> TaxBreakdown {
    breakdowns.iter().sum()
}

/// Compute every slice of a period and merge the results
pub fn compute_period(
    rates: &RateTable,
    input: &PeriodInput,
    is_individual: bool,
    basis: MinimumTaxBasis,
    policy: FloorPolicy,
) -> PeriodRecord {
    let revenue = input.revenue();
    let slice_basis = match policy {
        FloorPolicy::PerCall => basis,
        FloorPolicy::PerPeriod => MinimumTaxBasis::Deferred,
    };

    let breakdowns: Vec<TaxBreakdown> = input
        .slices
        .iter()
        .map(|slice| {
            let options = ComputeOptions {
                is_individual,
                ..ComputeOptions::default()
            }
            .with_revenue_type(slice.revenue_type)
            .with_vat_category(slice.vat_category)
            .with_basis(slice_basis);
            compute_taxes(rates, slice.taxable_revenue(), &options)
        })
        .collect();
    let mut breakdown = merge_breakdowns(&breakdowns);

    if policy == FloorPolicy::PerPeriod {
        let floor_basis = match basis {
            MinimumTaxBasis::ThisRevenue => Some(revenue),
            MinimumTaxBasis::AnnualRevenue(total) => Some(total.max(Decimal::ZERO)),
            MinimumTaxBasis::Deferred => None,
        };
        if let Some(floor_basis) = floor_basis {
            breakdown = breakdown.apply_minimum_tax(floor_basis * rates.minimum_tax);
        }
    }

    log::debug!(
        "Period {}: revenue {} over {} slice(s), total tax {}",
        input.period,
        revenue,
        input.slices.len(),
        breakdown.total_tax
    );

    PeriodRecord {
        period: input.period,
        revenue,
        breakdown,
        slices: input.slices.clone(),
    }
}

/// Compute a year in two passes: total the revenue of every period first, then
/// compute each period with that total as the minimum-tax basis.
pub fn compute_year(
    rates: &RateTable,
    inputs: &[PeriodInput],
    is_individual: bool,
    policy: FloorPolicy,
) -> Vec<PeriodRecord> {
    let annual_revenue = sum_amounts(inputs.iter().map(PeriodInput::revenue));
    log::debug!("Annual revenue for minimum tax: {}", annual_revenue);
    inputs
        .iter()
        .map(|input| {
            compute_period(
                rates,
                input,
                is_individual,
                MinimumTaxBasis::AnnualRevenue(annual_revenue),
                policy,
            )
        })
        .collect()
}

/// Compute a year in a single pass, each period using only its own revenue as
/// the minimum-tax basis.
///
/// This is an approximation: the minimum tax is defined on annual revenue,
/// which is unknown while periods are still being entered. Use
/// [`compute_year`] once the year is complete.
pub fn compute_year_streaming(
    rates: &RateTable,
    inputs: &[PeriodInput],
    is_individual: bool,
    policy: FloorPolicy,
) -> Vec<PeriodRecord> {
    inputs
        .iter()
        .map(|input| {
            compute_period(rates, input, is_individual, MinimumTaxBasis::ThisRevenue, policy)
        })
        .collect()
}

/// Sum revenue and taxes across periods. Periods need not be sorted or
/// contiguous and are not deduplicated.
pub fn summarize_year(periods: &[PeriodRecord]) -> AnnualSummary {
    let breakdown: TaxBreakdown = periods.iter().map(|p| &p.breakdown).sum();
    AnnualSummary {
        period_count: periods.len(),
        total_revenue: sum_amounts(periods.iter().map(|p| p.revenue)),
        total_tax: sum_amounts(periods.iter().map(|p| p.breakdown.total_tax)),
        breakdown,
    }
}

/// Check the minimum tax against corporate tax on the whole year's revenue.
///
/// Returns `None` for individuals and for a year with no revenue, neither of
/// which is subject to the minimum tax.
pub fn check_minimum_tax(
    rates: &RateTable,
    annual_revenue: Decimal,
    is_individual: bool,
) -> Option<MinimumTaxCheck> {
    if is_individual || annual_revenue <= Decimal::ZERO {
        return None;
    }
    let options = ComputeOptions::default().with_annual_revenue(annual_revenue);
    let annual = compute_taxes(rates, annual_revenue, &options);
    Some(MinimumTaxCheck {
        annual_revenue,
        minimum_tax: annual.minimum_tax,
        corporate_tax_before_floor: annual.corporate_tax_before_floor,
        floor_applies: annual.floor_applied(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::MAX_REVENUE;
    use rust_decimal_macros::dec;

    fn input(period: u8, slices: &[(RevenueType, Decimal)]) -> PeriodInput {
        PeriodInput {
            period,
            slices: slices
                .iter()
                .map(|(t, r)| RevenueSlice::new(*t, *r))
                .collect(),
        }
    }

    fn breakdown(revenue: Decimal, options: ComputeOptions) -> TaxBreakdown {
        compute_taxes(&RateTable::default(), revenue, &options)
    }

    #[test]
    fn merge_is_field_wise_sum() {
        let a = breakdown(dec!(1000000), ComputeOptions::default());
        let b = breakdown(
            dec!(15000),
            ComputeOptions::default().with_revenue_type(RevenueType::Electricity),
        );
        let merged = merge_breakdowns(&[a, b]);
        assert_eq!(merged.vat, dec!(180000));
        assert_eq!(merged.electricity_surtax, dec!(1350));
        assert_eq!(merged.corporate_tax, dec!(300000));
        assert_eq!(merged.total_tax, a.total_tax + b.total_tax);
        assert_eq!(merged.total_tax, merged.bucket_sum());
    }

    #[test]
    fn merge_empty_is_zero() {
        assert_eq!(merge_breakdowns(&[]), TaxBreakdown::default());
    }

    #[test]
    fn merge_is_associative() {
        let a = breakdown(dec!(123456.78), ComputeOptions::default());
        let b = breakdown(
            dec!(2500),
            ComputeOptions::individual().with_revenue_type(RevenueType::Tobacco),
        );
        let c = breakdown(
            dec!(999.99),
            ComputeOptions::default().with_revenue_type(RevenueType::Electricity),
        );
        assert_eq!(
            merge_breakdowns(&[a, b, c]),
            merge_breakdowns(&[merge_breakdowns(&[a, b]), c])
        );
        assert_eq!(
            merge_breakdowns(&[a, b, c]),
            merge_breakdowns(&[a, merge_breakdowns(&[b, c])])
        );
    }

    #[test]
    fn per_call_floor_applies_to_each_slice() {
        let rates = RateTable::default();
        let period = input(
            0,
            &[
                (RevenueType::General, dec!(100000)),
                (RevenueType::Alcohol, dec!(10000)),
                (RevenueType::Electricity, dec!(1500)),
            ],
        );
        let basis = MinimumTaxBasis::AnnualRevenue(dec!(20000000));
        let record = compute_period(&rates, &period, false, basis, FloorPolicy::PerCall);
        // floor of 200,000 paid by the general and the alcohol slice
        assert_eq!(record.breakdown.corporate_tax, dec!(400000));
        assert_eq!(record.breakdown.minimum_tax, dec!(400000));
        assert_eq!(record.revenue, dec!(111500));
        assert_eq!(record.breakdown.total_tax, record.breakdown.bucket_sum());
    }

    #[test]
    fn per_period_floor_applies_once() {
        let rates = RateTable::default();
        let period = input(
            0,
            &[
                (RevenueType::General, dec!(100000)),
                (RevenueType::Alcohol, dec!(10000)),
                (RevenueType::Electricity, dec!(1500)),
            ],
        );
        let basis = MinimumTaxBasis::AnnualRevenue(dec!(20000000));
        let record = compute_period(&rates, &period, false, basis, FloorPolicy::PerPeriod);
        assert_eq!(record.breakdown.corporate_tax_before_floor, dec!(33000));
        assert_eq!(record.breakdown.corporate_tax, dec!(200000));
        assert_eq!(record.breakdown.minimum_tax, dec!(200000));
        assert_eq!(record.breakdown.total_tax, record.breakdown.bucket_sum());
    }

    #[test]
    fn policies_agree_when_floor_does_not_bind() {
        let rates = RateTable::default();
        let period = input(
            3,
            &[
                (RevenueType::General, dec!(2000000)),
                (RevenueType::Electricity, dec!(25000)),
            ],
        );
        let per_call = compute_period(
            &rates,
            &period,
            false,
            MinimumTaxBasis::ThisRevenue,
            FloorPolicy::PerCall,
        );
        let per_period = compute_period(
            &rates,
            &period,
            false,
            MinimumTaxBasis::ThisRevenue,
            FloorPolicy::PerPeriod,
        );
        assert_eq!(per_call.breakdown.total_tax, per_period.breakdown.total_tax);
        assert_eq!(per_call.breakdown.corporate_tax, dec!(600000));
    }

    #[test]
    fn per_period_floor_ignored_for_individuals() {
        let rates = RateTable::default();
        let period = input(0, &[(RevenueType::General, dec!(100000))]);
        let basis = MinimumTaxBasis::AnnualRevenue(dec!(50000000));
        let record = compute_period(&rates, &period, true, basis, FloorPolicy::PerPeriod);
        assert_eq!(record.breakdown.corporate_tax, dec!(0));
        assert_eq!(record.breakdown.personal_income_tax, dec!(10000));
        assert_eq!(record.breakdown.total_tax, dec!(10000));
    }

    #[test]
    fn two_pass_uses_annual_revenue() {
        let rates = RateTable::default();
        let mut inputs = vec![input(0, &[(RevenueType::General, dec!(100000))])];
        for period in 1..12 {
            inputs.push(input(period, &[(RevenueType::General, dec!(9900000))]));
        }
        let annual: Decimal = inputs.iter().map(PeriodInput::revenue).sum();
        assert_eq!(annual, dec!(109000000));

        let records = compute_year(&rates, &inputs, false, FloorPolicy::PerCall);
        assert_eq!(records.len(), 12);
        // 1% of 109M = 1.09M beats 30% of 100K
        assert_eq!(records[0].breakdown.minimum_tax, dec!(1090000));
        assert_eq!(records[0].breakdown.corporate_tax, dec!(1090000));
        // 30% of 9.9M beats the floor
        assert_eq!(records[1].breakdown.corporate_tax, dec!(2970000));
    }

    #[test]
    fn streaming_pass_approximates() {
        let rates = RateTable::default();
        let inputs = vec![
            input(0, &[(RevenueType::General, dec!(100000))]),
            input(1, &[(RevenueType::General, dec!(50000000))]),
        ];
        let streaming = compute_year_streaming(&rates, &inputs, false, FloorPolicy::PerCall);
        let two_pass = compute_year(&rates, &inputs, false, FloorPolicy::PerCall);
        assert_eq!(streaming[0].breakdown.corporate_tax, dec!(30000));
        assert_eq!(two_pass[0].breakdown.corporate_tax, dec!(501000));
        assert!(summarize_year(&streaming).total_tax < summarize_year(&two_pass).total_tax);
    }

    #[test]
    fn summarize_sums_revenue_and_tax() {
        let rates = RateTable::default();
        let inputs = vec![
            input(5, &[(RevenueType::General, dec!(1000000))]),
            input(0, &[(RevenueType::General, dec!(500000))]),
            input(11, &[(RevenueType::Electricity, dec!(100000))]),
        ];
        let records = compute_year_streaming(&rates, &inputs, false, FloorPolicy::PerCall);
        let summary = summarize_year(&records);
        assert_eq!(summary.period_count, 3);
        assert_eq!(summary.total_revenue, dec!(1600000));
        assert_eq!(summary.total_tax, dec!(505000) + dec!(252500) + dec!(9000));
        assert_eq!(summary.breakdown.total_tax, summary.total_tax);
    }

    #[test]
    fn summarize_empty_year() {
        let summary = summarize_year(&[]);
        assert_eq!(summary.period_count, 0);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.total_tax, Decimal::ZERO);
    }

    #[test]
    fn minimum_tax_check() {
        let rates = RateTable::default();
        let check = check_minimum_tax(&rates, dec!(10000000), false).unwrap();
        assert_eq!(check.minimum_tax, dec!(100000));
        assert_eq!(check.corporate_tax_before_floor, dec!(3000000));
        assert!(!check.floor_applies);

        let no_corporate = RateTable {
            corporate: dec!(0.005),
            ..RateTable::default()
        };
        let check = check_minimum_tax(&no_corporate, dec!(10000000), false).unwrap();
        assert!(check.floor_applies);

        assert_eq!(check_minimum_tax(&rates, dec!(10000000), true), None);
        assert_eq!(check_minimum_tax(&rates, Decimal::ZERO, false), None);
    }

    #[test]
    fn negative_slices_count_as_zero() {
        let rates = RateTable::default();
        let period = input(
            0,
            &[
                (RevenueType::General, dec!(100)),
                (RevenueType::General, dec!(-500000)),
            ],
        );
        assert_eq!(period.revenue(), dec!(100));
        for policy in [FloorPolicy::PerCall, FloorPolicy::PerPeriod] {
            let record =
                compute_period(&rates, &period, false, MinimumTaxBasis::ThisRevenue, policy);
            assert_eq!(record.revenue, dec!(100));
            assert_eq!(record.breakdown.minimum_tax, dec!(1));
            assert_eq!(record.breakdown.corporate_tax, dec!(30));
            assert_eq!(record.breakdown.total_tax, dec!(50.5));
        }

        let record = compute_period(
            &rates,
            &period,
            false,
            MinimumTaxBasis::AnnualRevenue(dec!(-1000)),
            FloorPolicy::PerPeriod,
        );
        assert_eq!(record.breakdown.minimum_tax, Decimal::ZERO);
        assert_eq!(record.breakdown.corporate_tax, dec!(30));
    }

    #[test]
    fn negative_slice_does_not_lower_the_year() {
        let rates = RateTable::default();
        let inputs = vec![input(
            0,
            &[
                (RevenueType::General, dec!(1000000)),
                (RevenueType::General, dec!(-900000)),
            ],
        )];
        let records = compute_year(&rates, &inputs, false, FloorPolicy::PerCall);
        assert_eq!(records[0].revenue, dec!(1000000));
        assert_eq!(records[0].breakdown.total_tax, dec!(505000));
        assert_eq!(summarize_year(&records).total_revenue, dec!(1000000));
    }

    #[test]
    fn huge_revenue_does_not_overflow() {
        let rates = RateTable::default();
        let huge = Decimal::MAX / dec!(2);
        let inputs: Vec<PeriodInput> = (0..3)
            .map(|period| input(period, &[(RevenueType::General, huge)]))
            .collect();
        for policy in [FloorPolicy::PerCall, FloorPolicy::PerPeriod] {
            let records = compute_year(&rates, &inputs, false, policy);
            assert!(records.iter().all(|r| r.revenue == MAX_REVENUE));
            let summary = summarize_year(&records);
            assert_eq!(summary.total_revenue, MAX_REVENUE * dec!(3));
            assert_eq!(summary.total_tax, summary.breakdown.bucket_sum());
        }

        let record = PeriodRecord {
            period: 0,
            revenue: Decimal::MAX,
            breakdown: TaxBreakdown {
                vat: Decimal::MAX,
                total_tax: Decimal::MAX,
                ..Default::default()
            },
            slices: Vec::new(),
        };
        let summary = summarize_year(&[record.clone(), record]);
        assert_eq!(summary.total_revenue, Decimal::MAX);
        assert_eq!(summary.total_tax, Decimal::MAX);
    }

    #[test]
    fn group_rows_by_period() {
        let rows = vec![
            (2, RevenueSlice::general(dec!(100))),
            (0, RevenueSlice::general(dec!(50))),
            (2, RevenueSlice::new(RevenueType::Electricity, dec!(5))),
        ];
        let inputs = group_by_period(rows).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].period, 0);
        assert_eq!(inputs[1].period, 2);
        assert_eq!(inputs[1].slices.len(), 2);
        assert_eq!(inputs[1].revenue(), dec!(105));
    }

    #[test]
    fn group_rejects_period_out_of_range() {
        let rows = vec![(12, RevenueSlice::general(dec!(100)))];
        assert_eq!(group_by_period(rows), Err(PeriodInputError::OutOfRange(12)));
    }

    #[test]
    fn year_input_validation() {
        let mut year = YearInput {
            periods: vec![input(0, &[]), input(1, &[])],
        };
        assert!(year.validate().is_ok());
        year.periods.push(input(1, &[]));
        assert_eq!(year.validate(), Err(PeriodInputError::Duplicate(1)));
        year.periods = vec![input(15, &[])];
        assert_eq!(year.validate(), Err(PeriodInputError::OutOfRange(15)));
    }
}
