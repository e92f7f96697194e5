use std::io::Read;

use plan_core::{FormData, FormError};
use thiserror::Error;

/// Errors that can occur when loading saved answers.
#[derive(Debug, Error)]
pub enum AnswersLoaderError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid answers: {0}")]
    Form(#[from] FormError),
}

/// Loader for questionnaire answers saved as a JSON object.
///
/// Object keys become map nodes, so `{"parent1_income": {"gross_monthly": 5000}}`
/// is addressable as `parent1_income.gross_monthly`. `null` values are
/// treated as unanswered.
pub struct AnswersLoader;

impl AnswersLoader {
    pub fn parse<R: Read>(reader: R) -> Result<FormData, AnswersLoaderError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Ok(FormData::try_from(value)?)
    }
}
