//! Form paths read by the calculation engine.
//!
//! The questionnaire definitions and the engine both address answers through
//! these constants so the two cannot drift apart.

use super::Parent;

pub const GROSS_MONTHLY: &str = "gross_monthly";
pub const FEDERAL_TAX: &str = "federal_tax";
pub const STATE_TAX: &str = "state_tax";
pub const FICA_TAX: &str = "fica_tax";
pub const UNION_DUES: &str = "union_dues";
pub const MANDATORY_RETIREMENT: &str = "mandatory_retirement";
pub const HEALTH_INSURANCE_SELF: &str = "health_insurance_self";
pub const EMPLOYER: &str = "employer";
pub const EMPLOYMENT_TYPE: &str = "employment_type";

/// Deduction fields subtracted from gross income, in worksheet order.
pub const DEDUCTION_FIELDS: [&str; 6] = [
    FEDERAL_TAX,
    STATE_TAX,
    FICA_TAX,
    UNION_DUES,
    MANDATORY_RETIREMENT,
    HEALTH_INSURANCE_SELF,
];

pub const CHILDREN_COUNT: &str = "children.count";
pub const CHILDREN_DETAILS: &str = "children.details";
pub const PARENT1_OVERNIGHTS: &str = "parenting_time.parent1_overnights";
pub const PARENT2_OVERNIGHTS: &str = "parenting_time.parent2_overnights";
pub const HEALTH_INSURANCE_MONTHLY: &str = "child_support.health_insurance_monthly";
pub const CHILDCARE_MONTHLY: &str = "child_support.childcare_monthly";

/// Root key of a parent's income answers, e.g. `parent1_income`.
pub fn income_root(parent: Parent) -> &'static str {
    match parent {
        Parent::Parent1 => "parent1_income",
        Parent::Parent2 => "parent2_income",
    }
}

/// Full path of an income field, e.g. `parent2_income.state_tax`.
pub fn income_field(
    parent: Parent,
    field: &str,
) -> String {
    format!("{}.{}", income_root(parent), field)
}

pub fn overnights(parent: Parent) -> &'static str {
    match parent {
        Parent::Parent1 => PARENT1_OVERNIGHTS,
        Parent::Parent2 => PARENT2_OVERNIGHTS,
    }
}
