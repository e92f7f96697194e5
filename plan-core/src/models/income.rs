use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Parent, paths};
use crate::form::FormData;

/// One parent's monthly income and the fixed set of deductions.
///
/// Employment metadata is carried for display only and never enters the
/// calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub gross_monthly: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub fica_tax: Decimal,
    pub union_dues: Decimal,
    pub mandatory_retirement: Decimal,
    pub health_insurance_self: Decimal,
    pub employer: Option<String>,
    pub employment_type: Option<String>,
}

impl IncomeRecord {
    /// Reads a parent's income answers. Missing or non-numeric amounts are zero.
    pub fn from_form(
        form: &FormData,
        parent: Parent,
    ) -> Self {
        let number = |field: &str| form.number(&paths::income_field(parent, field));
        let text = |field: &str| {
            form.get(&paths::income_field(parent, field))
                .and_then(|v| v.as_text())
                .map(str::to_string)
        };

        Self {
            gross_monthly: number(paths::GROSS_MONTHLY),
            federal_tax: number(paths::FEDERAL_TAX),
            state_tax: number(paths::STATE_TAX),
            fica_tax: number(paths::FICA_TAX),
            union_dues: number(paths::UNION_DUES),
            mandatory_retirement: number(paths::MANDATORY_RETIREMENT),
            health_insurance_self: number(paths::HEALTH_INSURANCE_SELF),
            employer: text(paths::EMPLOYER),
            employment_type: text(paths::EMPLOYMENT_TYPE),
        }
    }

    /// Each deduction keyed by its field name, in the order of
    /// [`paths::DEDUCTION_FIELDS`].
    pub fn deductions(&self) -> [(&'static str, Decimal); 6] {
        let [federal, state, fica, dues, retirement, health] = paths::DEDUCTION_FIELDS;
        [
            (federal, self.federal_tax),
            (state, self.state_tax),
            (fica, self.fica_tax),
            (dues, self.union_dues),
            (retirement, self.mandatory_retirement),
            (health, self.health_insurance_self),
        ]
    }

    /// Sum of the deductions, saturating instead of overflowing.
    pub fn total_deductions(&self) -> Decimal {
        self.deductions()
            .into_iter()
            .fold(Decimal::ZERO, |total, (field, amount)| {
                total.checked_add(amount).unwrap_or_else(|| {
                    warn!(field, %amount, "Deduction total overflowed, saturating");
                    total.saturating_add(amount)
                })
            })
    }

    /// Gross income minus deductions. Not floored: deductions larger than
    /// gross income give a negative net income.
    pub fn net_income(&self) -> Decimal {
        let deductions = self.total_deductions();
        self.gross_monthly.checked_sub(deductions).unwrap_or_else(|| {
            warn!(gross = %self.gross_monthly, %deductions, "Net income overflowed, saturating");
            self.gross_monthly.saturating_sub(deductions)
        })
    }
}
