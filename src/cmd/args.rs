//! Command line adapters for domain enums

use crate::core::{FloorPolicy, IndustryProfile, RevenueType, VatCategory};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum VatCategoryArg {
    #[default]
    Standard,
    Reduced,
    SuperReduced,
    Zero,
}

impl From<VatCategoryArg> for VatCategory {
    fn from(arg: VatCategoryArg) -> Self {
        match arg {
            VatCategoryArg::Standard => VatCategory::Standard,
            VatCategoryArg::Reduced => VatCategory::Reduced,
            VatCategoryArg::SuperReduced => VatCategory::SuperReduced,
            VatCategoryArg::Zero => VatCategory::Zero,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RevenueTypeArg {
    #[default]
    General,
    Electricity,
    Tobacco,
    Alcohol,
    LuxuryGoods,
}

impl From<RevenueTypeArg> for RevenueType {
    fn from(arg: RevenueTypeArg) -> Self {
        match arg {
            RevenueTypeArg::General => RevenueType::General,
            RevenueTypeArg::Electricity => RevenueType::Electricity,
            RevenueTypeArg::Tobacco => RevenueType::Tobacco,
            RevenueTypeArg::Alcohol => RevenueType::Alcohol,
            RevenueTypeArg::LuxuryGoods => RevenueType::LuxuryGoods,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum IndustryArg {
    #[default]
    General,
    Tech,
    Retail,
    Consulting,
}

impl From<IndustryArg> for IndustryProfile {
    fn from(arg: IndustryArg) -> Self {
        match arg {
            IndustryArg::General => IndustryProfile::General,
            IndustryArg::Tech => IndustryProfile::Tech,
            IndustryArg::Retail => IndustryProfile::Retail,
            IndustryArg::Consulting => IndustryProfile::Consulting,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FloorPolicyArg {
    /// Apply the minimum tax to every revenue slice
    #[default]
    PerCall,
    /// Apply the minimum tax once to each period's total
    PerPeriod,
}

impl From<FloorPolicyArg> for FloorPolicy {
    fn from(arg: FloorPolicyArg) -> Self {
        match arg {
            FloorPolicyArg::PerCall => FloorPolicy::PerCall,
            FloorPolicyArg::PerPeriod => FloorPolicy::PerPeriod,
        }
    }
}
