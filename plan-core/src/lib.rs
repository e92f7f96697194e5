//! Calculation core for the co-parenting plan questionnaire.
//!
//! The crate is split the same way the questionnaire is used:
//!
//! - [`form`] holds the answers as a copy-on-write tree addressed by dot paths.
//! - [`calculations`] derives net incomes and the guideline child-support amount.
//! - [`validation`] checks a section's questions against the current answers.
//! - [`questionnaire`] sequences the sections and keeps derived values live.

pub mod calculations;
pub mod form;
pub mod models;
pub mod questionnaire;
pub mod validation;

pub use calculations::{
    ChildSupportCalculation, ChildSupportWorksheet, DerivedValues, FinancialDerivationEngine,
    IncomeSummary,
};
pub use form::{FieldPath, FormData, FormError, FormValue};
pub use models::*;
pub use questionnaire::{Navigation, Questionnaire, QuestionnaireError, WizardState};
pub use validation::{SectionValidator, UploadedFiles, ValidationErrors};
