//! Integration tests that load the sample schedule and answers from disk and
//! run them through the derivation engine and section validator.

use plan_core::calculations::common::round_half_up;
use plan_core::questionnaire::definitions;
use plan_core::{
    ChildSupportWorksheet, FinancialDerivationEngine, Navigation, Parent, Questionnaire,
    SectionValidator, SupportSchedule, UploadedFiles, WizardState,
};
use plan_core::calculations::GuidelineConfig;
use plan_data::{AnswersLoader, ScheduleLoader};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const SCHEDULE_CSV: &str = include_str!("../test-data/support_schedule.csv");
const ANSWERS_JSON: &str = include_str!("../test-data/answers.json");

fn engine_from_csv() -> FinancialDerivationEngine {
    let schedule = ScheduleLoader::parse(SCHEDULE_CSV.as_bytes()).expect("Failed to parse schedule");
    let worksheet =
        ChildSupportWorksheet::new(GuidelineConfig::standard(), schedule).expect("Invalid worksheet");
    FinancialDerivationEngine::new(worksheet)
}

#[test]
fn test_sample_schedule_matches_built_in_schedule() {
    let schedule = ScheduleLoader::parse(SCHEDULE_CSV.as_bytes()).expect("Failed to parse schedule");

    assert_eq!(schedule, SupportSchedule::standard());
}

#[test]
fn test_derive_sample_answers() {
    let answers = AnswersLoader::parse(ANSWERS_JSON.as_bytes()).expect("Failed to parse answers");

    let derived = engine_from_csv().derive(&answers);

    assert_eq!(derived.incomes.parent1_net_income, dec!(4800));
    assert_eq!(derived.incomes.parent2_net_income, dec!(2600));
    assert_eq!(derived.incomes.combined_net_income, dec!(7400));
    assert_eq!(round_half_up(derived.incomes.parent1_income_percentage), dec!(64.86));
    assert_eq!(round_half_up(derived.incomes.parent2_income_percentage), dec!(35.14));

    let support = derived.child_support.expect("children were entered");
    assert_eq!(support.basic_obligation, dec!(2025));
    assert_eq!(support.parent1_overnight_percentage, dec!(40));
    assert_eq!(support.parent2_overnight_percentage, dec!(60));
    assert_eq!(support.time_sharing_adjustment, dec!(10.125));
    assert_eq!(round_half_up(support.final_amount), dec!(879.72));
    assert_eq!(support.paying_parent, Some(Parent::Parent1));
    assert_eq!(support.receiving_parent, Some(Parent::Parent2));
}

#[test]
fn test_sample_answers_only_miss_documents() {
    let answers = AnswersLoader::parse(ANSWERS_JSON.as_bytes()).expect("Failed to parse answers");
    let uploads = UploadedFiles::new();

    let failing: Vec<_> = definitions::advanced_plan()
        .iter()
        .filter(|section| !SectionValidator::validate(section, &answers, &uploads).is_empty())
        .map(|section| section.id.clone())
        .collect();

    assert_eq!(failing, vec!["documents".to_string()]);
}

#[test]
fn test_questionnaire_reaches_payment_with_sample_answers() {
    let answers = AnswersLoader::parse(ANSWERS_JSON.as_bytes()).expect("Failed to parse answers");
    let mut plan = Questionnaire::new(definitions::advanced_plan())
        .expect("Advanced plan has sections")
        .with_engine(engine_from_csv())
        .with_answers(answers);

    for _ in 0..6 {
        assert!(matches!(plan.next(), Navigation::Advanced(_)));
    }
    assert!(matches!(plan.next(), Navigation::Blocked(_)));

    plan.record_upload("documents.pay_stubs", "pay-stub-march.pdf")
        .expect("valid question id");

    assert_eq!(plan.next(), Navigation::Advanced(WizardState::ShowingPayment));
    assert_eq!(plan.progress(), (8, 8));
    assert_eq!(round_half_up(plan.derived().child_support.as_ref().unwrap().final_amount), dec!(879.72));
}
