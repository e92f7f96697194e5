use plan_core::calculations::common::round_half_up;
use plan_core::{FieldPath, FormError, FormValue, Parent, UploadedFiles};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a `path=value` line cannot be parsed.
#[derive(Debug, Error)]
pub enum ParseAssignmentError {
    #[error("expected 'path=value', got '{0}'")]
    MissingEquals(String),

    #[error("invalid path in '{input}': {source}")]
    Path {
        input: String,
        #[source]
        source: FormError,
    },
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Reads a command-line answer.
///
/// `true`/`false` become booleans, numbers (commas allowed) become numbers
/// and anything else is kept as text.
pub fn parse_answer_value(s: &str) -> FormValue {
    let trimmed = s.trim();
    match trimmed {
        "true" => return FormValue::Bool(true),
        "false" => return FormValue::Bool(false),
        _ => {}
    }
    let normalized = normalize_decimal_input(trimmed);
    match normalized.parse::<Decimal>() {
        Ok(n) if !normalized.is_empty() => FormValue::Number(n),
        _ => FormValue::Text(trimmed.to_string()),
    }
}

/// Splits `path=value` into a field path and an answer.
pub fn parse_assignment(s: &str) -> Result<(FieldPath, FormValue), ParseAssignmentError> {
    let (path, value) = s
        .split_once('=')
        .ok_or_else(|| ParseAssignmentError::MissingEquals(s.to_string()))?;
    let path = FieldPath::parse(path.trim()).map_err(|source| ParseAssignmentError::Path {
        input: s.to_string(),
        source,
    })?;
    Ok((path, parse_answer_value(value)))
}

/// Parses an upload list: one `question_id=file name` per line. Blank lines
/// and lines starting with `#` are skipped.
pub fn parse_uploads(text: &str) -> Result<UploadedFiles, ParseAssignmentError> {
    let mut uploads = UploadedFiles::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (question, file) = line
            .split_once('=')
            .ok_or_else(|| ParseAssignmentError::MissingEquals(line.to_string()))?;
        let path = FieldPath::parse(question.trim()).map_err(|source| ParseAssignmentError::Path {
            input: line.to_string(),
            source,
        })?;
        uploads
            .entry(path.as_str().to_string())
            .or_default()
            .push(file.trim().to_string());
    }
    Ok(uploads)
}

/// Formats an amount as dollars and cents with thousands separators.
pub fn money(d: Decimal) -> String {
    let rounded = round_half_up(d);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{cents}")
}

pub fn percent(d: Decimal) -> String {
    format!("{:.2}%", round_half_up(d))
}

/// Formats an optional parent for display, using "—" when `None`.
pub fn opt_parent_display(parent: Option<Parent>) -> String {
    match parent {
        Some(Parent::Parent1) => "Parent 1".to_string(),
        Some(Parent::Parent2) => "Parent 2".to_string(),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_answer_value_accepts_comma_thousands_separator() {
        assert_eq!(parse_answer_value("1,234.56"), FormValue::Number(dec!(1234.56)));
        assert_eq!(parse_answer_value("  365 "), FormValue::Number(dec!(365)));
    }

    #[test]
    fn parse_answer_value_keeps_text_and_booleans() {
        assert_eq!(parse_answer_value("Acme Corp"), FormValue::from("Acme Corp"));
        assert_eq!(parse_answer_value("true"), FormValue::Bool(true));
        assert_eq!(parse_answer_value(""), FormValue::from(""));
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        let (path, value) = parse_assignment("parents.parent1_email=a=b@example.com").unwrap();

        assert_eq!(path.as_str(), "parents.parent1_email");
        assert_eq!(value, FormValue::from("a=b@example.com"));
    }

    #[test]
    fn parse_assignment_rejects_missing_equals_and_bad_path() {
        assert!(matches!(
            parse_assignment("children.count"),
            Err(ParseAssignmentError::MissingEquals(_))
        ));
        assert!(matches!(
            parse_assignment("children..count=2"),
            Err(ParseAssignmentError::Path { .. })
        ));
    }

    #[test]
    fn parse_uploads_groups_files_by_question() {
        let text = "# uploaded so far\ndocuments.pay_stubs = march.pdf\n\ndocuments.pay_stubs=april.pdf\n";

        let uploads = parse_uploads(text).unwrap();

        assert_eq!(
            uploads["documents.pay_stubs"],
            vec!["march.pdf".to_string(), "april.pdf".to_string()]
        );
    }

    #[test]
    fn money_groups_thousands_and_rounds() {
        assert_eq!(money(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(money(dec!(879.7196)), "$879.72");
        assert_eq!(money(dec!(0)), "$0.00");
        assert_eq!(money(dec!(-1500)), "-$1,500.00");
    }

    #[test]
    fn percent_rounds_to_two_places() {
        assert_eq!(percent(dec!(64.864864)), "64.86%");
        assert_eq!(percent(dec!(100)), "100.00%");
    }

    #[test]
    fn opt_parent_display_uses_dash_for_none() {
        assert_eq!(opt_parent_display(Some(Parent::Parent2)), "Parent 2");
        assert_eq!(opt_parent_display(None), "—");
    }
}
