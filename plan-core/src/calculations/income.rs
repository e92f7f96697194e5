use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::common::percentage_of;
use crate::models::{IncomeRecord, Parent};

/// Net incomes of both parents and each parent's share of the combined total.
///
/// Serialized field names are the ones the questionnaire binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub parent1_net_income: Decimal,
    pub parent2_net_income: Decimal,
    pub combined_net_income: Decimal,
    /// 0-100; zero for both parents when the combined income is not positive.
    pub parent1_income_percentage: Decimal,
    pub parent2_income_percentage: Decimal,
}

impl IncomeSummary {
    pub fn from_records(
        parent1: &IncomeRecord,
        parent2: &IncomeRecord,
    ) -> Self {
        let parent1_net_income = parent1.net_income();
        let parent2_net_income = parent2.net_income();
        let combined_net_income = parent1_net_income
            .checked_add(parent2_net_income)
            .unwrap_or_else(|| {
                warn!(%parent1_net_income, %parent2_net_income, "Combined income overflowed, saturating");
                parent1_net_income.saturating_add(parent2_net_income)
            });

        Self {
            parent1_net_income,
            parent2_net_income,
            combined_net_income,
            parent1_income_percentage: percentage_of(parent1_net_income, combined_net_income),
            parent2_income_percentage: percentage_of(parent2_net_income, combined_net_income),
        }
    }

    pub fn net_income(
        &self,
        parent: Parent,
    ) -> Decimal {
        match parent {
            Parent::Parent1 => self.parent1_net_income,
            Parent::Parent2 => self.parent2_net_income,
        }
    }

    pub fn income_percentage(
        &self,
        parent: Parent,
    ) -> Decimal {
        match parent {
            Parent::Parent1 => self.parent1_income_percentage,
            Parent::Parent2 => self.parent2_income_percentage,
        }
    }
}
