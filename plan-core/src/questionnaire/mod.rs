//! Questionnaire session state.
//!
//! [`Questionnaire`] owns the answers for one session, gates section
//! advancement on validation and keeps the derived financial values in step
//! with every change to the answers.

pub mod definitions;

use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{DerivedValues, FinancialDerivationEngine};
use crate::form::{FieldPath, FormData, FormError, FormValue};
use crate::models::Section;
use crate::validation::{SectionValidator, UploadedFiles, ValidationErrors};

/// Errors raised by questionnaire operations.
#[derive(Debug, Error)]
pub enum QuestionnaireError {
    /// A questionnaire needs at least one section.
    #[error("questionnaire has no sections")]
    NoSections,

    /// A field path could not be parsed.
    #[error("invalid field path: {0}")]
    InvalidPath(#[from] FormError),
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Answering the section at this index.
    AnsweringSection(usize),

    /// Every section passed validation.
    ShowingPayment,
}

/// Outcome of [`Questionnaire::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Advanced(WizardState),

    /// The current section failed validation. The errors are also kept
    /// on the questionnaire until the fields are edited.
    Blocked(ValidationErrors),

    /// Already past the last section.
    AtEnd,
}

/// One questionnaire session.
///
/// ```
/// use plan_core::{FormValue, Navigation, Questionnaire, WizardState};
/// use plan_core::questionnaire::definitions;
///
/// let mut plan = Questionnaire::new(definitions::advanced_plan()).unwrap();
/// assert!(matches!(plan.next(), Navigation::Blocked(_)));
///
/// plan.update("parents.parent1_name", FormValue::from("Jordan")).unwrap();
/// plan.update("parents.parent2_name", FormValue::from("Casey")).unwrap();
/// assert_eq!(plan.next(), Navigation::Advanced(WizardState::AnsweringSection(1)));
/// ```
#[derive(Debug, Clone)]
pub struct Questionnaire {
    sections: Vec<Section>,
    engine: FinancialDerivationEngine,
    state: WizardState,
    answers: FormData,
    uploads: UploadedFiles,
    errors: ValidationErrors,
    derived: DerivedValues,
}

impl Questionnaire {
    pub fn new(sections: Vec<Section>) -> Result<Self, QuestionnaireError> {
        if sections.is_empty() {
            return Err(QuestionnaireError::NoSections);
        }
        let mut questionnaire = Self {
            sections,
            engine: FinancialDerivationEngine::default(),
            state: WizardState::AnsweringSection(0),
            answers: FormData::new(),
            uploads: UploadedFiles::new(),
            errors: ValidationErrors::new(),
            derived: DerivedValues::default(),
        };
        questionnaire.refresh();
        Ok(questionnaire)
    }

    /// Replaces the derivation engine, e.g. to use a loaded schedule.
    pub fn with_engine(
        mut self,
        engine: FinancialDerivationEngine,
    ) -> Self {
        self.engine = engine;
        self.refresh();
        self
    }

    /// Starts from previously saved answers.
    pub fn with_answers(
        mut self,
        answers: FormData,
    ) -> Self {
        self.answers = answers;
        self.refresh();
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// The section being answered, `None` on the payment step.
    pub fn current_section(&self) -> Option<&Section> {
        match self.state {
            WizardState::AnsweringSection(index) => self.sections.get(index),
            WizardState::ShowingPayment => None,
        }
    }

    pub fn answers(&self) -> &FormData {
        &self.answers
    }

    pub fn uploads(&self) -> &UploadedFiles {
        &self.uploads
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn derived(&self) -> &DerivedValues {
        &self.derived
    }

    /// Stores an answer, clears its error and recomputes derived values.
    pub fn update(
        &mut self,
        path: &str,
        value: FormValue,
    ) -> Result<(), QuestionnaireError> {
        let path = FieldPath::parse(path)?;
        self.answers = self.answers.set(&path, value);
        self.errors.clear_field(&path);
        self.refresh();
        Ok(())
    }

    /// Removes an answer, clears its error and recomputes derived values.
    pub fn clear(
        &mut self,
        path: &str,
    ) -> Result<(), QuestionnaireError> {
        let path = FieldPath::parse(path)?;
        self.answers = self.answers.remove(&path);
        self.errors.clear_field(&path);
        self.refresh();
        Ok(())
    }

    pub fn record_upload(
        &mut self,
        question_id: &str,
        file_name: impl Into<String>,
    ) -> Result<(), QuestionnaireError> {
        let path = FieldPath::parse(question_id)?;
        let file_name = file_name.into();
        debug!(question = %path, file = %file_name, "upload recorded");
        self.uploads
            .entry(path.as_str().to_string())
            .or_default()
            .push(file_name);
        self.errors.clear_field(&path);
        Ok(())
    }

    /// Forgets an uploaded file. Returns `false` if it was not recorded.
    pub fn remove_upload(
        &mut self,
        question_id: &str,
        file_name: &str,
    ) -> Result<bool, QuestionnaireError> {
        let path = FieldPath::parse(question_id)?;
        let Some(files) = self.uploads.get_mut(path.as_str()) else {
            return Ok(false);
        };
        let before = files.len();
        files.retain(|f| f != file_name);
        let removed = files.len() != before;
        if files.is_empty() {
            self.uploads.remove(path.as_str());
        }
        self.errors.clear_field(&path);
        Ok(removed)
    }

    /// Validates the current section and records the result.
    pub fn validate_current(&mut self) -> &ValidationErrors {
        self.errors = match self.current_section() {
            Some(section) => SectionValidator::validate(section, &self.answers, &self.uploads),
            None => ValidationErrors::new(),
        };
        &self.errors
    }

    /// Moves forward when the current section validates.
    pub fn next(&mut self) -> Navigation {
        let WizardState::AnsweringSection(index) = self.state else {
            return Navigation::AtEnd;
        };

        if !self.validate_current().is_empty() {
            debug!(
                section = index,
                errors = self.errors.len(),
                "section blocked by validation"
            );
            return Navigation::Blocked(self.errors.clone());
        }

        self.state = if index + 1 < self.sections.len() {
            WizardState::AnsweringSection(index + 1)
        } else {
            info!("all sections complete");
            WizardState::ShowingPayment
        };
        Navigation::Advanced(self.state)
    }

    /// Steps back one section without validating.
    pub fn previous(&mut self) -> WizardState {
        self.state = match self.state {
            WizardState::AnsweringSection(index) => {
                WizardState::AnsweringSection(index.saturating_sub(1))
            }
            WizardState::ShowingPayment => {
                WizardState::AnsweringSection(self.sections.len() - 1)
            }
        };
        self.errors = ValidationErrors::new();
        self.state
    }

    /// `(current_step, total_steps)`, both one-based. The payment step is
    /// the last step.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sections.len() + 1;
        let current = match self.state {
            WizardState::AnsweringSection(index) => index + 1,
            WizardState::ShowingPayment => total,
        };
        (current, total)
    }

    fn refresh(&mut self) {
        self.derived = self.engine.derive(&self.answers);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Question, QuestionKind};

    fn two_sections() -> Vec<Section> {
        vec![
            Section::new(
                "income",
                "Income",
                vec![
                    Question::new("parent1_income.gross_monthly", "Parent 1 gross", QuestionKind::Currency)
                        .required(),
                    Question::new("parent2_income.gross_monthly", "Parent 2 gross", QuestionKind::Currency)
                        .required(),
                ],
            ),
            Section::new(
                "documents",
                "Documents",
                vec![Question::new("documents.pay_stubs", "Pay stubs", QuestionKind::FileUpload).required()],
            ),
        ]
    }

    fn questionnaire() -> Questionnaire {
        Questionnaire::new(two_sections()).unwrap()
    }

    // =========================================================================
    // Construction tests
    // =========================================================================

    #[test]
    fn new_rejects_empty_section_list() {
        let result = Questionnaire::new(vec![]);

        assert!(matches!(result, Err(QuestionnaireError::NoSections)));
    }

    #[test]
    fn new_starts_at_first_section() {
        let plan = questionnaire();

        assert_eq!(plan.state(), WizardState::AnsweringSection(0));
        assert_eq!(plan.current_section().unwrap().id, "income");
        assert_eq!(plan.progress(), (1, 3));
    }

    #[test]
    fn with_answers_derives_immediately() {
        let answers = FormData::new().set(
            &FieldPath::parse("parent1_income.gross_monthly").unwrap(),
            FormValue::from(dec!(4000)),
        );

        let plan = questionnaire().with_answers(answers);

        assert_eq!(plan.derived().incomes.parent1_net_income, dec!(4000));
    }

    // =========================================================================
    // Update tests
    // =========================================================================

    #[test]
    fn update_recomputes_derived_values_even_when_invalid() {
        let mut plan = questionnaire();

        plan.update("parent1_income.gross_monthly", FormValue::from(dec!(5000)))
            .unwrap();
        plan.update("parent2_income.gross_monthly", FormValue::from("abc"))
            .unwrap();

        assert_eq!(plan.derived().incomes.combined_net_income, dec!(5000));
        assert_eq!(plan.derived().incomes.parent1_income_percentage, dec!(100));
    }

    #[test]
    fn update_with_oversized_amounts_still_derives() {
        let mut plan = questionnaire();

        plan.update("parent1_income.gross_monthly", FormValue::from("79,228,162,514,264,337,593,543,950,335"))
            .unwrap();
        plan.update("parent1_income.federal_tax", FormValue::from("-79228162514264337593543950335"))
            .unwrap();
        plan.update("parent2_income.gross_monthly", FormValue::from(dec!(3000)))
            .unwrap();

        assert_eq!(plan.derived().incomes.parent1_net_income, rust_decimal::Decimal::MAX);
        assert_eq!(plan.derived().incomes.combined_net_income, rust_decimal::Decimal::MAX);
    }

    #[test]
    fn update_rejects_malformed_path() {
        let mut plan = questionnaire();

        let result = plan.update("parent1_income..gross", FormValue::from(1_i64));

        assert!(matches!(result, Err(QuestionnaireError::InvalidPath(_))));
    }

    #[test]
    fn update_clears_only_the_edited_field_error() {
        let mut plan = questionnaire();
        plan.next();
        assert_eq!(plan.errors().len(), 2);

        plan.update("parent1_income.gross_monthly", FormValue::from(dec!(10)))
            .unwrap();

        assert_eq!(plan.errors().len(), 1);
        assert!(plan.errors().contains("parent2_income.gross_monthly"));
    }

    #[test]
    fn clear_removes_answer_and_recomputes() {
        let mut plan = questionnaire();
        plan.update("parent1_income.gross_monthly", FormValue::from(dec!(5000)))
            .unwrap();

        plan.clear("parent1_income.gross_monthly").unwrap();

        assert!(plan.answers().get("parent1_income.gross_monthly").is_none());
        assert_eq!(plan.derived().incomes.combined_net_income, dec!(0));
    }

    // =========================================================================
    // Navigation tests
    // =========================================================================

    #[test]
    fn next_is_blocked_by_empty_required_fields() {
        let mut plan = questionnaire();

        let navigation = plan.next();

        let Navigation::Blocked(errors) = navigation else {
            panic!("expected blocked navigation");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(plan.state(), WizardState::AnsweringSection(0));
    }

    #[test]
    fn next_walks_through_sections_to_payment() {
        let mut plan = questionnaire();
        plan.update("parent1_income.gross_monthly", FormValue::from(dec!(5000)))
            .unwrap();
        plan.update("parent2_income.gross_monthly", FormValue::from(dec!(3000)))
            .unwrap();

        assert_eq!(plan.next(), Navigation::Advanced(WizardState::AnsweringSection(1)));

        plan.record_upload("documents.pay_stubs", "stub.pdf").unwrap();

        assert_eq!(plan.next(), Navigation::Advanced(WizardState::ShowingPayment));
        assert_eq!(plan.progress(), (3, 3));
        assert!(plan.current_section().is_none());
        assert_eq!(plan.next(), Navigation::AtEnd);
    }

    #[test]
    fn previous_never_validates() {
        let mut plan = questionnaire();
        plan.update("parent1_income.gross_monthly", FormValue::from(dec!(1)))
            .unwrap();
        plan.update("parent2_income.gross_monthly", FormValue::from(dec!(1)))
            .unwrap();
        plan.next();
        plan.next();

        assert_eq!(plan.previous(), WizardState::AnsweringSection(1));
        assert!(plan.errors().is_empty());
        assert_eq!(plan.previous(), WizardState::AnsweringSection(0));
        assert_eq!(plan.previous(), WizardState::AnsweringSection(0));
    }

    #[test]
    fn previous_from_payment_returns_to_last_section() {
        let mut plan = Questionnaire::new(vec![Section::new("only", "Only", vec![])]).unwrap();
        assert_eq!(plan.next(), Navigation::Advanced(WizardState::ShowingPayment));

        assert_eq!(plan.previous(), WizardState::AnsweringSection(0));
    }

    // =========================================================================
    // Upload tests
    // =========================================================================

    #[test]
    fn remove_upload_drops_empty_entries() {
        let mut plan = questionnaire();
        plan.record_upload("documents.pay_stubs", "a.pdf").unwrap();

        assert!(plan.remove_upload("documents.pay_stubs", "a.pdf").unwrap());
        assert!(!plan.remove_upload("documents.pay_stubs", "a.pdf").unwrap());
        assert!(plan.uploads().is_empty());
    }
}
