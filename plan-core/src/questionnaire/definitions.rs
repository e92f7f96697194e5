//! Built-in section definitions for the Advanced Plan questionnaire.

use rust_decimal::Decimal;

use crate::models::{CustomValidator, Parent, Question, QuestionKind, Section, ValidationRule, paths};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const NIGHTS_PER_YEAR: i64 = 365;
const DEVIATION_REASON_MIN_LENGTH: usize = 20;

/// The Advanced Plan sections, in order.
pub fn advanced_plan() -> Vec<Section> {
    vec![
        parents(),
        income(Parent::Parent1),
        income(Parent::Parent2),
        children(),
        parenting_time(),
        child_support_expenses(),
        documents(),
    ]
}

fn parents() -> Section {
    let mut questions = Vec::new();
    for (n, label) in [(1, "Parent 1"), (2, "Parent 2")] {
        questions.push(
            Question::new(format!("parents.parent{n}_name"), format!("{label} full name"), QuestionKind::Text)
                .required(),
        );
        questions.push(
            Question::new(format!("parents.parent{n}_email"), format!("{label} email"), QuestionKind::Text)
                .with_custom(CustomValidator::Pattern {
                    pattern: EMAIL_PATTERN.to_string(),
                    message: "Please enter a valid email address".to_string(),
                }),
        );
    }
    questions.push(
        Question::new("parents.relationship", "Relationship status", QuestionKind::Dropdown)
            .with_options(["Never married", "Separated", "Divorcing", "Divorced"]),
    );
    Section::new("parents", "About the Parents", questions)
}

fn income(parent: Parent) -> Section {
    let label = parent_label(parent);
    let field = |name: &str| paths::income_field(parent, name);
    let gross = field(paths::GROSS_MONTHLY);

    let mut questions = vec![
        Question::new(field(paths::EMPLOYER), "Employer", QuestionKind::Text),
        Question::new(field(paths::EMPLOYMENT_TYPE), "Employment type", QuestionKind::Dropdown)
            .with_options(["Full-time", "Part-time", "Self-employed", "Unemployed"]),
        Question::new(gross.clone(), "Gross monthly income", QuestionKind::Currency)
            .required()
            .with_rule(ValidationRule {
                message: Some(format!("Please enter {label}'s gross monthly income")),
                ..Default::default()
            }),
    ];

    for (name, title) in [
        (paths::FEDERAL_TAX, "Federal income tax"),
        (paths::STATE_TAX, "State income tax"),
        (paths::FICA_TAX, "Social Security and Medicare (FICA)"),
        (paths::UNION_DUES, "Mandatory union dues"),
        (paths::MANDATORY_RETIREMENT, "Mandatory retirement contributions"),
        (paths::HEALTH_INSURANCE_SELF, "Health insurance for self"),
    ] {
        questions.push(
            Question::new(field(name), title, QuestionKind::Currency).with_custom(
                CustomValidator::NotExceeding {
                    other: gross.clone(),
                    message: "Deductions cannot exceed gross monthly income".to_string(),
                },
            ),
        );
    }

    Section::new(paths::income_root(parent), format!("{label} Income"), questions)
}

fn children() -> Section {
    Section::new(
        "children",
        "Children",
        vec![
            Question::new(paths::CHILDREN_COUNT, "Number of children", QuestionKind::ButtonGroup)
                .required()
                .with_options(["1", "2", "3", "4", "5"]),
            Question::new(paths::CHILDREN_DETAILS, "Children's details", QuestionKind::Repeater).required(),
        ],
    )
}

fn parenting_time() -> Section {
    let overnights = |parent: Parent| {
        Question::new(
            paths::overnights(parent),
            format!("Overnights per year with {}", parent_label(parent)),
            QuestionKind::Text,
        )
        .with_rule(ValidationRule {
            min: Some(Decimal::ZERO),
            max: Some(Decimal::from(NIGHTS_PER_YEAR)),
            ..Default::default()
        })
        .with_custom(CustomValidator::SumAtMost {
            other: paths::overnights(parent.other()).to_string(),
            limit: Decimal::from(NIGHTS_PER_YEAR),
            message: "Overnights for both parents cannot exceed 365".to_string(),
        })
    };

    Section::new(
        "parenting_time",
        "Parenting Time",
        vec![
            Question::new("parenting_time.schedule", "Regular schedule", QuestionKind::CardSelect)
                .required()
                .with_options(["Week on / week off", "2-2-3", "Every other weekend", "Custom"]),
            overnights(Parent::Parent1),
            overnights(Parent::Parent2),
            Question::new("parenting_time.holidays", "Holidays to alternate", QuestionKind::CheckboxGroup)
                .with_options(["Thanksgiving", "Winter break", "Spring break", "Birthdays"]),
        ],
    )
}

fn child_support_expenses() -> Section {
    Section::new(
        "child_support",
        "Child Support Expenses",
        vec![
            Question::new(
                paths::HEALTH_INSURANCE_MONTHLY,
                "Children's health insurance per month",
                QuestionKind::Currency,
            ),
            Question::new(paths::CHILDCARE_MONTHLY, "Work-related childcare per month", QuestionKind::Currency),
            Question::new("child_support.deviation_requested", "Request a deviation?", QuestionKind::Radio)
                .required()
                .with_options(["Yes", "No"]),
            Question::new("child_support.deviation_reason", "Reason for deviation", QuestionKind::Textarea)
                .with_custom(CustomValidator::MinLength {
                    min: DEVIATION_REASON_MIN_LENGTH,
                    message: "Please explain the deviation in at least 20 characters".to_string(),
                }),
        ],
    )
}

fn documents() -> Section {
    Section::new(
        "documents",
        "Supporting Documents",
        vec![
            Question::new("documents.pay_stubs", "Recent pay stubs", QuestionKind::FileUpload).required(),
            Question::new("documents.tax_returns", "Last year's tax return", QuestionKind::FileUpload),
        ],
    )
}

fn parent_label(parent: Parent) -> &'static str {
    match parent {
        Parent::Parent1 => "Parent 1",
        Parent::Parent2 => "Parent 2",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::form::{FieldPath, FormData};
    use crate::validation::{SectionValidator, UploadedFiles};

    #[test]
    fn advanced_plan_has_seven_sections_in_order() {
        let ids: Vec<_> = advanced_plan().into_iter().map(|s| s.id).collect();

        assert_eq!(
            ids,
            vec![
                "parents",
                "parent1_income",
                "parent2_income",
                "children",
                "parenting_time",
                "child_support",
                "documents",
            ]
        );
    }

    #[test]
    fn question_ids_are_unique_valid_paths() {
        let mut seen = BTreeSet::new();

        for section in advanced_plan() {
            for question in section.questions {
                assert!(FieldPath::parse(&question.id).is_ok(), "{}", question.id);
                assert!(seen.insert(question.id.clone()), "duplicate {}", question.id);
            }
        }
    }

    #[test]
    fn empty_income_section_reports_custom_gross_message() {
        let section = income(Parent::Parent2);

        let errors = SectionValidator::validate(&section, &FormData::new(), &UploadedFiles::new());

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("parent2_income.gross_monthly"),
            Some("Please enter Parent 2's gross monthly income")
        );
    }

    #[test]
    fn deduction_above_gross_is_rejected() {
        let answers = FormData::try_from(json!({
            "parent1_income": { "gross_monthly": 3000, "federal_tax": 3500 }
        }))
        .unwrap();

        let errors = SectionValidator::validate(&income(Parent::Parent1), &answers, &UploadedFiles::new());

        assert_eq!(
            errors.get("parent1_income.federal_tax"),
            Some("Deductions cannot exceed gross monthly income")
        );
    }

    #[test]
    fn overnights_may_not_exceed_a_year_together() {
        let answers = FormData::try_from(json!({
            "parenting_time": {
                "schedule": "Custom",
                "parent1_overnights": "200",
                "parent2_overnights": "200"
            }
        }))
        .unwrap();

        let errors = SectionValidator::validate(&parenting_time(), &answers, &UploadedFiles::new());

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(paths::PARENT1_OVERNIGHTS),
            Some("Overnights for both parents cannot exceed 365")
        );
    }

    #[test]
    fn overnights_limit_is_a_full_year() {
        let section = parenting_time();
        let rule = section.questions[1].validation.as_ref().unwrap();

        assert_eq!(rule.max, Some(dec!(365)));
    }

    #[test]
    fn short_deviation_reason_is_rejected() {
        let answers = FormData::try_from(json!({
            "child_support": { "deviation_requested": "Yes", "deviation_reason": "too high" }
        }))
        .unwrap();

        let errors = SectionValidator::validate(&child_support_expenses(), &answers, &UploadedFiles::new());

        assert!(errors.contains("child_support.deviation_reason"));
    }
}
