//! Guideline worksheet implementations.

pub mod child_support;

pub use child_support::{
    ChildSupportCalculation, ChildSupportInput, ChildSupportWorksheet, CostShare,
    GuidelineConfig, GuidelineConfigError,
};
