//! Simulated monthly revenue for demonstrations and tests
//!
//! Every function takes the random source as a parameter; seed a
//! `rand::rngs::StdRng` for reproducible datasets.

use super::calendar::{simulate_last_payment, Jurisdiction, PaymentStatus};
use super::compute::MinimumTaxBasis;
use super::period::{
    compute_period, FloorPolicy, PeriodInput, PeriodRecord, RevenueSlice, PERIODS_PER_YEAR,
};
use super::rates::{RateTable, RevenueType};
use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Probability that a retail month includes excisable sales
const EXCISE_PROBABILITY: f64 = 0.3;

/// Industry used to pick a plausible monthly revenue band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryProfile {
    #[default]
    General,
    Tech,
    Retail,
    Consulting,
}

impl IndustryProfile {
    pub const ALL: [IndustryProfile; 4] = [
        IndustryProfile::General,
        IndustryProfile::Tech,
        IndustryProfile::Retail,
        IndustryProfile::Consulting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndustryProfile::General => "general",
            IndustryProfile::Tech => "tech",
            IndustryProfile::Retail => "retail",
            IndustryProfile::Consulting => "consulting",
        }
    }

    /// Monthly revenue band, lower bound inclusive
    pub fn revenue_band(&self) -> (i64, i64) {
        match self {
            IndustryProfile::General => (1_000_000, 5_000_000),
            IndustryProfile::Tech => (5_000_000, 15_000_000),
            IndustryProfile::Retail => (2_000_000, 8_000_000),
            IndustryProfile::Consulting => (500_000, 3_000_000),
        }
    }

    /// Whether some months include alcohol sales
    pub fn sells_excisable_goods(&self) -> bool {
        matches!(self, IndustryProfile::Retail)
    }
}

impl std::fmt::Display for IndustryProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Share of `total` drawn from `[min_bps, max_bps)` basis points, in whole units
fn share<R: Rng + ?Sized>(rng: &mut R, total: Decimal, min_bps: i64, max_bps: i64) -> Decimal {
    let bps = rng.random_range(min_bps..max_bps);
    (total * Decimal::new(bps, 4)).floor()
}

/// Draw twelve months of revenue split into general, electricity and, for
/// retail, alcohol slices. Slice amounts are whole units summing to the
/// month's total.
pub fn generate_inputs<R: Rng + ?Sized>(
    industry: IndustryProfile,
    rng: &mut R,
) -> Vec<PeriodInput> {
    let (min, max) = industry.revenue_band();
    (0..PERIODS_PER_YEAR)
        .map(|period| {
            let total = Decimal::from(rng.random_range(min..max));
            let electricity = share(rng, total, 100, 150);
            let sells_excise =
                industry.sells_excisable_goods() && rng.random_bool(EXCISE_PROBABILITY);
            let excise = if sells_excise {
                share(rng, total, 500, 1000)
            } else {
                Decimal::ZERO
            };
            let general = total - electricity - excise;

            let mut slices = vec![
                RevenueSlice::general(general),
                RevenueSlice::new(RevenueType::Electricity, electricity),
            ];
            if !excise.is_zero() {
                slices.push(RevenueSlice::new(RevenueType::Alcohol, excise));
            }
            PeriodInput { period, slices }
        })
        .collect()
}

/// Simulate a year of taxes for one entity.
///
/// Each slice is computed on its own with the minimum tax based on its own
/// revenue and merged into the month, so the result matches what a live form
/// produces. Feed [`generate_inputs`] to
/// [`compute_year`](super::period::compute_year) for the two-pass figures.
pub fn generate<R: Rng + ?Sized>(
    rates: &RateTable,
    industry: IndustryProfile,
    is_individual: bool,
    rng: &mut R,
    policy: FloorPolicy,
) -> Vec<PeriodRecord> {
    let records: Vec<PeriodRecord> = generate_inputs(industry, rng)
        .iter()
        .map(|input| {
            compute_period(rates, input, is_individual, MinimumTaxBasis::ThisRevenue, policy)
        })
        .collect();
    log::debug!(
        "Simulated {} periods for {} (individual: {})",
        records.len(),
        industry,
        is_individual
    );
    records
}

/// A registered business with a simulated year of activity
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedEntity {
    /// Registration id, e.g. `NDI-GAB-00000`
    pub id: String,
    pub company_name: String,
    pub jurisdiction: Jurisdiction,
    pub industry: IndustryProfile,
    pub payment_status: PaymentStatus,
    pub last_payment: NaiveDate,
    pub periods: Vec<PeriodRecord>,
}

/// Build a registry of `count` simulated businesses, cycling through
/// jurisdictions and industries.
pub fn simulate_entities<R: Rng + ?Sized>(
    rates: &RateTable,
    count: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<SimulatedEntity> {
    (0..count)
        .map(|i| {
            let jurisdiction = Jurisdiction::ALL[i % Jurisdiction::ALL.len()];
            let industry = IndustryProfile::ALL[i % IndustryProfile::ALL.len()];
            let payment_status = PaymentStatus::draw(rng);
            let last_payment = simulate_last_payment(payment_status, today, jurisdiction, rng);
            SimulatedEntity {
                id: format!("NDI-{}-{:05}", jurisdiction.code(), i),
                company_name: format!("Entreprise {} {}", i + 1, jurisdiction.name()),
                jurisdiction,
                industry,
                payment_status,
                last_payment,
                periods: generate(rates, industry, false, rng, FloorPolicy::PerCall),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::period::{compute_year, summarize_year};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn twelve_ordered_periods() {
        let mut rng = StdRng::seed_from_u64(1);
        let records = generate(
            &RateTable::default(),
            IndustryProfile::General,
            false,
            &mut rng,
            FloorPolicy::PerCall,
        );
        assert_eq!(records.len(), 12);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.period as usize, i);
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let rates = RateTable::default();
        let a = generate(
            &rates,
            IndustryProfile::Retail,
            false,
            &mut StdRng::seed_from_u64(42),
            FloorPolicy::PerCall,
        );
        let b = generate(
            &rates,
            IndustryProfile::Retail,
            false,
            &mut StdRng::seed_from_u64(42),
            FloorPolicy::PerCall,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn revenue_within_industry_band() {
        let mut rng = StdRng::seed_from_u64(3);
        for industry in IndustryProfile::ALL {
            let (min, max) = industry.revenue_band();
            for input in generate_inputs(industry, &mut rng) {
                let revenue = input.revenue();
                assert!(revenue >= Decimal::from(min), "{industry} {revenue}");
                assert!(revenue < Decimal::from(max), "{industry} {revenue}");
            }
        }
    }

    #[test]
    fn slices_split_the_month() {
        let mut rng = StdRng::seed_from_u64(11);
        for input in generate_inputs(IndustryProfile::Retail, &mut rng) {
            let total = input.revenue();
            let electricity = input
                .slices
                .iter()
                .find(|s| s.revenue_type == RevenueType::Electricity)
                .unwrap()
                .revenue;
            assert!(electricity >= (total * dec!(0.01)).floor());
            assert!(electricity <= total * dec!(0.015));
            if let Some(alcohol) = input
                .slices
                .iter()
                .find(|s| s.revenue_type == RevenueType::Alcohol)
            {
                assert!(alcohol.revenue >= (total * dec!(0.05)).floor());
                assert!(alcohol.revenue <= total * dec!(0.10));
            }
            for slice in &input.slices {
                assert_eq!(slice.revenue, slice.revenue.floor());
            }
        }
    }

    #[test]
    fn only_retail_sells_alcohol() {
        let mut rng = StdRng::seed_from_u64(5);
        for industry in [
            IndustryProfile::General,
            IndustryProfile::Tech,
            IndustryProfile::Consulting,
        ] {
            for _ in 0..10 {
                for input in generate_inputs(industry, &mut rng) {
                    assert_eq!(input.slices.len(), 2);
                }
            }
        }

        // 30% of 120 retail months
        let alcohol_months = (0..10)
            .flat_map(|_| generate_inputs(IndustryProfile::Retail, &mut rng))
            .filter(|input| input.slices.len() == 3)
            .count();
        assert!(alcohol_months > 10 && alcohol_months < 70, "{alcohol_months}");
    }

    #[test]
    fn period_records_keep_invariants() {
        let rates = RateTable::default();
        let mut rng = StdRng::seed_from_u64(99);
        for is_individual in [false, true] {
            let records = generate(
                &rates,
                IndustryProfile::Retail,
                is_individual,
                &mut rng,
                FloorPolicy::PerCall,
            );
            for record in records {
                let b = record.breakdown;
                assert_eq!(b.total_tax, b.bucket_sum());
                assert!(!b.electricity_surtax.is_zero());
                if is_individual {
                    assert!(b.corporate_tax.is_zero());
                    assert!(!b.personal_income_tax.is_zero());
                    assert!(b.vat.is_zero());
                } else {
                    assert!(!b.corporate_tax.is_zero());
                    assert!(b.personal_income_tax.is_zero());
                }
            }
        }
    }

    #[test]
    fn two_pass_on_simulated_inputs() {
        let rates = RateTable::default();
        let inputs = generate_inputs(IndustryProfile::Consulting, &mut StdRng::seed_from_u64(8));
        let records = compute_year(&rates, &inputs, false, FloorPolicy::PerPeriod);
        let summary = summarize_year(&records);
        let annual: Decimal = inputs.iter().map(PeriodInput::revenue).sum();
        assert_eq!(summary.total_revenue, annual);
        for record in &records {
            assert_eq!(record.breakdown.minimum_tax, annual * rates.minimum_tax);
        }
    }

    #[test]
    fn entity_registry() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let mut rng = StdRng::seed_from_u64(2026);
        let entities = simulate_entities(&RateTable::default(), 20, today, &mut rng);
        assert_eq!(entities.len(), 20);
        assert_eq!(entities[0].id, "NDI-GAB-00000");
        assert_eq!(entities[1].id, "NDI-GHA-00001");
        assert_eq!(entities[2].id, "NDI-FRA-00002");
        assert_eq!(entities[19].company_name, "Entreprise 20 Ghana");
        for entity in &entities {
            assert_eq!(entity.periods.len(), 12);
            assert_eq!(
                PaymentStatus::classify(Some(entity.last_payment), today, entity.jurisdiction),
                entity.payment_status
            );
        }
    }
}
