use regex::Regex;
use tracing::warn;

use crate::form::{FormData, FormValue, coerce_decimal};
use crate::models::CustomValidator;

/// Runs a question's custom validator.
///
/// Returns the validator's message when the check fails. A missing answer
/// never fails a custom check; required-field rules report those.
pub(super) fn check(
    validator: &CustomValidator,
    value: Option<&FormValue>,
    form: &FormData,
) -> Option<String> {
    let value = value.filter(|v| !v.is_blank())?;

    match validator {
        CustomValidator::Pattern { pattern, message } => {
            let regex = match Regex::new(pattern) {
                Ok(regex) => regex,
                Err(error) => {
                    warn!(pattern = %pattern, %error, "skipping invalid validation pattern");
                    return None;
                }
            };
            let text = value.as_text()?;
            (!regex.is_match(text.trim())).then(|| message.clone())
        }
        CustomValidator::MinLength { min, message } => {
            let text = value.as_text()?;
            (text.trim().chars().count() < *min).then(|| message.clone())
        }
        CustomValidator::NotExceeding { other, message } => {
            let amount = value.to_decimal()?;
            let limit = form.optional_number(other)?;
            (amount > limit).then(|| message.clone())
        }
        CustomValidator::SumAtMost {
            other,
            limit,
            message,
        } => {
            let amount = value.to_decimal()?;
            let total = amount.saturating_add(coerce_decimal(form.get(other)));
            (total > *limit).then(|| message.clone())
        }
    }
}
