use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::debug;

use super::income::IncomeSummary;
use super::worksheets::{ChildSupportCalculation, ChildSupportInput, ChildSupportWorksheet};
use crate::form::{FormData, FormValue};
use crate::models::{IncomeRecord, Parent, paths};

/// Everything derived from the answers, serialized as one flat bag of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedValues {
    #[serde(flatten)]
    pub incomes: IncomeSummary,

    /// Present once at least one child has been entered.
    #[serde(flatten)]
    pub child_support: Option<ChildSupportCalculation>,
}

/// Recomputes derived values from the questionnaire answers.
///
/// Missing answers read as zero, so any partially completed questionnaire
/// yields a result.
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::{FieldPath, FinancialDerivationEngine, FormData};
///
/// let form = FormData::new()
///     .set(&FieldPath::parse("parent1_income.gross_monthly").unwrap(), dec!(5000).into())
///     .set(&FieldPath::parse("parent2_income.gross_monthly").unwrap(), dec!(3000).into());
///
/// let derived = FinancialDerivationEngine::default().derive(&form);
///
/// assert_eq!(derived.incomes.combined_net_income, dec!(8000));
/// assert_eq!(derived.incomes.parent1_income_percentage, dec!(62.5));
/// assert!(derived.child_support.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FinancialDerivationEngine {
    worksheet: ChildSupportWorksheet,
}

impl FinancialDerivationEngine {
    pub fn new(worksheet: ChildSupportWorksheet) -> Self {
        Self { worksheet }
    }

    pub fn worksheet(&self) -> &ChildSupportWorksheet {
        &self.worksheet
    }

    pub fn derive(
        &self,
        form: &FormData,
    ) -> DerivedValues {
        let incomes = self.income_summary(form);
        let input = self.child_support_input(form, &incomes);
        let child_support = (input.children > 0).then(|| self.worksheet.calculate(&input));

        debug!(
            combined_net_income = %incomes.combined_net_income,
            children = input.children,
            final_amount = ?child_support.as_ref().map(|c| c.final_amount),
            "derived values refreshed"
        );

        DerivedValues {
            incomes,
            child_support,
        }
    }

    pub fn income_summary(
        &self,
        form: &FormData,
    ) -> IncomeSummary {
        IncomeSummary::from_records(
            &IncomeRecord::from_form(form, Parent::Parent1),
            &IncomeRecord::from_form(form, Parent::Parent2),
        )
    }

    /// Collects the worksheet inputs. Overnights stay `None` unless a
    /// numeric answer is present, so the configured defaults apply.
    pub fn child_support_input(
        &self,
        form: &FormData,
        incomes: &IncomeSummary,
    ) -> ChildSupportInput {
        ChildSupportInput {
            combined_net_income: incomes.combined_net_income,
            parent1_income_percentage: incomes.parent1_income_percentage,
            parent2_income_percentage: incomes.parent2_income_percentage,
            children: children_count(form),
            parent1_overnights: form.optional_number(paths::overnights(Parent::Parent1)),
            parent2_overnights: form.optional_number(paths::overnights(Parent::Parent2)),
            health_insurance_monthly: form.number(paths::HEALTH_INSURANCE_MONTHLY),
            childcare_monthly: form.number(paths::CHILDCARE_MONTHLY),
        }
    }
}

/// Number of children: the explicit count when answered, otherwise the
/// number of entries in the children repeater.
fn children_count(form: &FormData) -> u32 {
    if let Some(count) = form.optional_number(paths::CHILDREN_COUNT) {
        return count.max(Decimal::ZERO).trunc().to_u32().unwrap_or(u32::MAX);
    }
    form.get(paths::CHILDREN_DETAILS)
        .and_then(FormValue::as_list)
        .map(|entries| u32::try_from(entries.len()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn engine() -> FinancialDerivationEngine {
        FinancialDerivationEngine::default()
    }

    fn form(value: serde_json::Value) -> FormData {
        FormData::try_from(value).unwrap()
    }

    #[test]
    fn derive_net_incomes_and_percentages() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 5000 },
            "parent2_income": { "gross_monthly": 3000 }
        }));

        let derived = engine().derive(&answers);

        assert_eq!(
            derived.incomes,
            IncomeSummary {
                parent1_net_income: dec!(5000),
                parent2_net_income: dec!(3000),
                combined_net_income: dec!(8000),
                parent1_income_percentage: dec!(62.5),
                parent2_income_percentage: dec!(37.5),
            }
        );
    }

    #[test]
    fn derive_subtracts_deductions() {
        let answers = form(json!({
            "parent1_income": {
                "gross_monthly": "4,000",
                "federal_tax": 400,
                "state_tax": 100,
                "fica_tax": 306,
                "health_insurance_self": 194
            }
        }));

        let derived = engine().derive(&answers);

        assert_eq!(derived.incomes.parent1_net_income, dec!(3000));
        assert_eq!(derived.incomes.parent1_income_percentage, dec!(100));
    }

    #[test]
    fn derive_empty_form_is_all_zero() {
        let derived = engine().derive(&FormData::new());

        assert_eq!(derived, DerivedValues::default());
    }

    #[test]
    fn derive_bracket_lookup_for_two_children() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 1500 },
            "parent2_income": { "gross_monthly": 1000 },
            "children": { "count": "2" }
        }));

        let derived = engine().derive(&answers);
        let support = derived.child_support.unwrap();

        assert_eq!(derived.incomes.combined_net_income, dec!(2500));
        assert_eq!(support.basic_obligation, dec!(675));
        assert_eq!(support.parent1_share, dec!(405));
        assert_eq!(support.parent2_share, dec!(270));
    }

    #[test]
    fn derive_above_schedule_uses_percentage_fallback() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 12000 },
            "parent2_income": { "gross_monthly": 8000 },
            "children": { "count": 3 }
        }));

        let support = engine().derive(&answers).child_support.unwrap();

        assert_eq!(support.basic_obligation, dec!(6400));
        assert_eq!(support.parent1_share, dec!(3840));
        assert_eq!(support.parent2_share, dec!(2560));
    }

    #[test]
    fn derive_sole_custody_overnights() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 5000 },
            "parent2_income": { "gross_monthly": 3000 },
            "children": { "count": 1 },
            "parenting_time": { "parent1_overnights": 365, "parent2_overnights": 0 }
        }));

        let support = engine().derive(&answers).child_support.unwrap();

        assert_eq!(support.parent1_overnight_percentage, dec!(100));
        assert!(support.time_sharing_adjustment < Decimal::ZERO);
        assert_eq!(support.final_amount, dec!(324));
        assert_eq!(support.paying_parent, Some(Parent::Parent1));
    }

    #[test]
    fn derive_handles_income_near_the_decimal_limit() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": "1000000000000000000000000000" },
            "parent2_income": { "gross_monthly": "1" },
            "children": { "count": 1 }
        }));

        let derived = engine().derive(&answers);
        let support = derived.child_support.unwrap();
        let percentages =
            derived.incomes.parent1_income_percentage + derived.incomes.parent2_income_percentage;

        assert_eq!(
            derived.incomes.combined_net_income,
            dec!(1000000000000000000000000001)
        );
        assert!((percentages - dec!(100)).abs() < dec!(0.0000001));
        assert!(support.used_percentage_fallback);
        assert!(support.final_amount > Decimal::ZERO);
        assert!(support.final_amount <= derived.incomes.combined_net_income * dec!(0.4));
        assert_eq!(support.paying_parent, Some(Parent::Parent1));
    }

    #[test]
    fn derive_blank_overnights_use_defaults() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 5000 },
            "children": { "count": 1 },
            "parenting_time": { "parent1_overnights": "", "parent2_overnights": " " }
        }));
        let input = engine().child_support_input(&answers, &engine().income_summary(&answers));

        assert_eq!(input.parent1_overnights, None);
        assert_eq!(input.parent2_overnights, None);
    }

    #[test]
    fn derive_reads_shared_costs() {
        let answers = form(json!({
            "children": { "count": 1 },
            "child_support": { "health_insurance_monthly": 250, "childcare_monthly": "1,100" }
        }));
        let input = engine().child_support_input(&answers, &engine().income_summary(&answers));

        assert_eq!(input.health_insurance_monthly, dec!(250));
        assert_eq!(input.childcare_monthly, dec!(1100));
    }

    #[test]
    fn children_count_falls_back_to_repeater_length() {
        let answers = form(json!({
            "children": { "details": [ { "name": "Sam" }, { "name": "Alex" }, { "name": "Jo" } ] }
        }));

        assert_eq!(children_count(&answers), 3);
    }

    #[test]
    fn children_count_ignores_negative_and_fractional_counts() {
        assert_eq!(children_count(&form(json!({ "children": { "count": -2 } }))), 0);
        assert_eq!(children_count(&form(json!({ "children": { "count": 2.7 } }))), 2);
    }

    #[test]
    fn derived_values_serialize_flat() {
        let answers = form(json!({
            "parent1_income": { "gross_monthly": 5000 },
            "parent2_income": { "gross_monthly": 3000 },
            "children": { "count": 2 }
        }));

        let json = serde_json::to_value(engine().derive(&answers)).unwrap();

        for key in [
            "parent1_net_income",
            "combined_net_income",
            "parent2_income_percentage",
            "basicObligation",
            "finalAmount",
            "payingParent",
            "receivingParent",
            "timeSharingAdjustment",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["childcareShare"].get("parent2").is_some());
    }

    #[test]
    fn derived_values_without_children_omit_support_fields() {
        let json = serde_json::to_value(engine().derive(&FormData::new())).unwrap();

        assert!(json.get("combined_net_income").is_some());
        assert!(json.get("basicObligation").is_none());
    }
}
