pub mod calendar;
pub mod compute;
pub mod period;
pub mod rates;
pub mod simulate;

// Flat public surface for domain types and functions.
pub use calendar::{monthly_due_date, Jurisdiction, PaymentStatus};
pub use compute::{
    coerce_revenue, compute_taxes, parse_revenue, ComputeOptions, TaxBreakdown,
};
#[allow(unused_imports)]
pub use compute::{MinimumTaxBasis, RevenueError};
pub use period::{
    check_minimum_tax, compute_year, compute_year_streaming, group_by_period, summarize_year,
    AnnualSummary, FloorPolicy, MinimumTaxCheck, PeriodInput, PeriodRecord, RevenueSlice,
    YearInput,
};
#[allow(unused_imports)]
pub use period::{compute_period, merge_breakdowns, PeriodInputError};
pub use rates::{RateTable, RevenueType, VatCategory};
#[allow(unused_imports)]
pub use rates::RateError;
pub use simulate::{generate, generate_inputs, simulate_entities, IndustryProfile};
