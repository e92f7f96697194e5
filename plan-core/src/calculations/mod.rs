//! Derived financial values for the questionnaire.
//!
//! [`FinancialDerivationEngine`] reads the current answers and produces net
//! incomes, income percentages and, once children are entered, the guideline
//! child support calculation from [`worksheets::child_support`].

pub mod common;
mod derivation;
mod income;
pub mod worksheets;

pub use derivation::{DerivedValues, FinancialDerivationEngine};
pub use income::IncomeSummary;
pub use worksheets::{
    ChildSupportCalculation, ChildSupportInput, ChildSupportWorksheet, CostShare,
    GuidelineConfig, GuidelineConfigError,
};
