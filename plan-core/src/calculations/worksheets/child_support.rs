//! Child support guideline worksheet.
//!
//! This module turns the parents' combined net income, the number of
//! children, the overnight split and the shared child costs into a monthly
//! support amount and decides who pays it.
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Basic obligation: schedule amount for the combined income and number of children |
//! | 1a   | Above the schedule ceiling: combined income × fallback percentage for the number of children |
//! | 2    | Each parent's share: basic obligation × income percentage |
//! | 3    | Health insurance and childcare split by the same percentages |
//! | 4    | Overnight shares (unset overnights default to 182 / 183) |
//! | 5    | Time-sharing adjustment: basic obligation × 5% × \|parent 1 share − 0.5\| |
//! | 6    | Signed amount: (share 1 − share 2) + cost differences ∓ time-sharing adjustment |
//! | 7    | Final amount: \|signed amount\| capped at combined income × 40% |
//!
//! A positive signed amount means parent 1 pays parent 2. Arithmetic
//! saturates at the `Decimal` limits, so unvalidated answers of any size
//! still produce a result.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use plan_core::calculations::{ChildSupportInput, ChildSupportWorksheet};
//! use plan_core::Parent;
//!
//! let worksheet = ChildSupportWorksheet::standard();
//! let result = worksheet.calculate(&ChildSupportInput {
//!     combined_net_income: dec!(2500),
//!     parent1_income_percentage: dec!(60),
//!     parent2_income_percentage: dec!(40),
//!     children: 2,
//!     parent1_overnights: Some(dec!(100)),
//!     parent2_overnights: Some(dec!(265)),
//!     health_insurance_monthly: dec!(0),
//!     childcare_monthly: dec!(0),
//! });
//!
//! assert_eq!(result.basic_obligation, dec!(675));
//! assert_eq!(result.parent1_share, dec!(405));
//! assert_eq!(result.paying_parent, Some(Parent::Parent1));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{percentage_of, pro_rata};
use crate::models::{BracketLookup, Parent, SCHEDULE_CHILD_COLUMNS, SupportSchedule};

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Errors that can occur when configuring the guideline worksheet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuidelineConfigError {
    /// Each fallback percentage must be between 0 and 1.
    #[error("fallback percentage for {children} children must be between 0 and 1, got {value}")]
    InvalidFallbackPercentage { children: usize, value: Decimal },

    /// The time-sharing threshold must be between 0 and 1.
    #[error("time-sharing threshold must be between 0 and 1, got {0}")]
    InvalidTimeSharingThreshold(Decimal),

    /// The time-sharing factor must be between 0 and 1.
    #[error("time-sharing factor must be between 0 and 1, got {0}")]
    InvalidTimeSharingFactor(Decimal),

    /// The support cap ratio must be between 0 and 1.
    #[error("maximum support ratio must be between 0 and 1, got {0}")]
    InvalidMaxSupportRatio(Decimal),

    /// Default overnights must be non-negative and add up to more than zero.
    #[error("default overnights must be non-negative with a positive total, got {parent1} and {parent2}")]
    InvalidDefaultOvernights { parent1: Decimal, parent2: Decimal },
}

/// Constants used by the guideline worksheet.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use plan_core::calculations::GuidelineConfig;
///
/// let config = GuidelineConfig::standard();
///
/// assert_eq!(config.fallback_percentages[2], dec!(0.32));
/// assert_eq!(config.max_support_ratio, dec!(0.4));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineConfig {
    /// Share of combined income owed above the schedule ceiling, for 1 to 5+ children.
    pub fallback_percentages: [Decimal; SCHEDULE_CHILD_COLUMNS],

    /// Minimum overnight share (0-1) either parent needs before the
    /// time-sharing adjustment applies.
    pub time_sharing_threshold: Decimal,

    /// Multiplier applied to the basic obligation for the time-sharing adjustment.
    pub time_sharing_factor: Decimal,

    /// The final amount never exceeds combined income × this ratio.
    pub max_support_ratio: Decimal,

    /// Overnights assumed for parent 1 when none are entered.
    pub default_parent1_overnights: Decimal,

    /// Overnights assumed for parent 2 when none are entered.
    pub default_parent2_overnights: Decimal,
}

impl GuidelineConfig {
    pub fn standard() -> Self {
        Self {
            fallback_percentages: [
                Decimal::new(18, 2),
                Decimal::new(27, 2),
                Decimal::new(32, 2),
                Decimal::new(35, 2),
                Decimal::new(37, 2),
            ],
            time_sharing_threshold: Decimal::new(2, 1),
            time_sharing_factor: Decimal::new(5, 2),
            max_support_ratio: Decimal::new(4, 1),
            default_parent1_overnights: Decimal::from(182),
            default_parent2_overnights: Decimal::from(183),
        }
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`GuidelineConfigError`] if:
    /// - any fallback percentage is not in [0, 1]
    /// - `time_sharing_threshold`, `time_sharing_factor` or `max_support_ratio` is not in [0, 1]
    /// - a default overnight count is negative, or both are zero
    pub fn validate(&self) -> Result<(), GuidelineConfigError> {
        for (index, value) in self.fallback_percentages.iter().enumerate() {
            if !is_ratio(*value) {
                return Err(GuidelineConfigError::InvalidFallbackPercentage {
                    children: index + 1,
                    value: *value,
                });
            }
        }
        if !is_ratio(self.time_sharing_threshold) {
            return Err(GuidelineConfigError::InvalidTimeSharingThreshold(
                self.time_sharing_threshold,
            ));
        }
        if !is_ratio(self.time_sharing_factor) {
            return Err(GuidelineConfigError::InvalidTimeSharingFactor(
                self.time_sharing_factor,
            ));
        }
        if !is_ratio(self.max_support_ratio) {
            return Err(GuidelineConfigError::InvalidMaxSupportRatio(
                self.max_support_ratio,
            ));
        }
        let (parent1, parent2) = (
            self.default_parent1_overnights,
            self.default_parent2_overnights,
        );
        if parent1 < Decimal::ZERO
            || parent2 < Decimal::ZERO
            || parent1.saturating_add(parent2) <= Decimal::ZERO
        {
            return Err(GuidelineConfigError::InvalidDefaultOvernights { parent1, parent2 });
        }
        Ok(())
    }
}

impl Default for GuidelineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_ratio(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// Inputs to the guideline worksheet, already reduced to numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSupportInput {
    pub combined_net_income: Decimal,
    /// 0-100.
    pub parent1_income_percentage: Decimal,
    /// 0-100.
    pub parent2_income_percentage: Decimal,
    pub children: u32,
    /// `None` when not entered; the configured default is used.
    pub parent1_overnights: Option<Decimal>,
    pub parent2_overnights: Option<Decimal>,
    pub health_insurance_monthly: Decimal,
    pub childcare_monthly: Decimal,
}

/// A monthly cost split between the parents by income percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostShare {
    pub parent1: Decimal,
    pub parent2: Decimal,
}

impl CostShare {
    fn split(
        amount: Decimal,
        parent1_percentage: Decimal,
        parent2_percentage: Decimal,
    ) -> Self {
        Self {
            parent1: pro_rata(amount, parent1_percentage),
            parent2: pro_rata(amount, parent2_percentage),
        }
    }

    /// Parent 1's portion minus parent 2's portion.
    pub fn difference(&self) -> Decimal {
        self.parent1.saturating_sub(self.parent2)
    }
}

/// Result of the guideline worksheet.
///
/// Serialized with the camelCase names the questionnaire binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSupportCalculation {
    /// Schedule amount, or the percentage fallback above the ceiling (step 1).
    pub basic_obligation: Decimal,

    /// Indicates the basic obligation came from the percentage fallback.
    pub used_percentage_fallback: bool,

    pub parent1_share: Decimal,
    pub parent2_share: Decimal,

    pub health_insurance_share: CostShare,
    pub childcare_share: CostShare,

    /// Signed amount added to parent 1's side of the calculation: negative
    /// when parent 1 has the majority of overnights.
    pub time_sharing_adjustment: Decimal,

    /// Monthly support after the cap; never negative.
    pub final_amount: Decimal,

    /// `None` when the final amount is zero.
    pub paying_parent: Option<Parent>,
    pub receiving_parent: Option<Parent>,

    /// 0-100.
    pub parent1_overnight_percentage: Decimal,
    pub parent2_overnight_percentage: Decimal,
}

/// Calculator for the child support guideline worksheet.
///
/// Construction validates the configuration; [`ChildSupportWorksheet::calculate`]
/// itself cannot fail and returns a best-effort result for any input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSupportWorksheet {
    config: GuidelineConfig,
    schedule: SupportSchedule,
}

impl ChildSupportWorksheet {
    /// Creates a worksheet with a custom configuration and schedule.
    ///
    /// # Errors
    ///
    /// Returns [`GuidelineConfigError`] if the configuration is invalid.
    pub fn new(
        config: GuidelineConfig,
        schedule: SupportSchedule,
    ) -> Result<Self, GuidelineConfigError> {
        config.validate()?;
        Ok(Self { config, schedule })
    }

    /// The standard configuration with the built-in schedule.
    pub fn standard() -> Self {
        Self {
            config: GuidelineConfig::standard(),
            schedule: SupportSchedule::standard(),
        }
    }

    pub fn config(&self) -> &GuidelineConfig {
        &self.config
    }

    pub fn schedule(&self) -> &SupportSchedule {
        &self.schedule
    }

    /// Calculates the complete worksheet.
    ///
    /// # Example: Above the schedule
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use plan_core::calculations::{ChildSupportInput, ChildSupportWorksheet};
    ///
    /// let worksheet = ChildSupportWorksheet::standard();
    /// let result = worksheet.calculate(&ChildSupportInput {
    ///     combined_net_income: dec!(20000),
    ///     parent1_income_percentage: dec!(50),
    ///     parent2_income_percentage: dec!(50),
    ///     children: 3,
    ///     ..Default::default()
    /// });
    ///
    /// // 20,000 × 32%
    /// assert_eq!(result.basic_obligation, dec!(6400));
    /// assert!(result.used_percentage_fallback);
    /// ```
    pub fn calculate(
        &self,
        input: &ChildSupportInput,
    ) -> ChildSupportCalculation {
        // Step 1: Basic obligation
        let (basic_obligation, used_percentage_fallback) =
            self.basic_obligation(input.combined_net_income, input.children);

        // Step 2: Pro-rata shares
        let parent1_share = pro_rata(basic_obligation, input.parent1_income_percentage);
        let parent2_share = pro_rata(basic_obligation, input.parent2_income_percentage);

        // Step 3: Shared costs
        let health_insurance_share = CostShare::split(
            input.health_insurance_monthly,
            input.parent1_income_percentage,
            input.parent2_income_percentage,
        );
        let childcare_share = CostShare::split(
            input.childcare_monthly,
            input.parent1_income_percentage,
            input.parent2_income_percentage,
        );

        // Step 4: Overnight shares
        let (parent1_overnight_share, parent2_overnight_share) = self.overnight_shares(
            input.parent1_overnights,
            input.parent2_overnights,
        );

        // Step 5: Time-sharing adjustment
        let time_sharing_adjustment = self.time_sharing_adjustment(
            basic_obligation,
            parent1_overnight_share,
            parent2_overnight_share,
        );

        // Step 6: Signed amount
        let signed_amount = parent1_share
            .saturating_sub(parent2_share)
            .saturating_add(health_insurance_share.difference())
            .saturating_add(childcare_share.difference())
            .saturating_add(time_sharing_adjustment);

        // Step 7: Cap and payer
        let final_amount = self.final_amount(signed_amount, input.combined_net_income);
        let paying_parent = self.paying_parent(signed_amount, final_amount);

        debug!(
            combined_net_income = %input.combined_net_income,
            children = input.children,
            basic_obligation = %basic_obligation,
            final_amount = %final_amount,
            paying_parent = ?paying_parent,
            "child support calculated"
        );

        ChildSupportCalculation {
            basic_obligation,
            used_percentage_fallback,
            parent1_share,
            parent2_share,
            health_insurance_share,
            childcare_share,
            time_sharing_adjustment,
            final_amount,
            paying_parent,
            receiving_parent: paying_parent.map(|p| p.other()),
            parent1_overnight_percentage: parent1_overnight_share * Decimal::ONE_HUNDRED,
            parent2_overnight_percentage: parent2_overnight_share * Decimal::ONE_HUNDRED,
        }
    }

    /// Looks up the basic obligation (step 1).
    ///
    /// Returns the obligation and whether the percentage fallback was used.
    fn basic_obligation(
        &self,
        combined_net_income: Decimal,
        children: u32,
    ) -> (Decimal, bool) {
        if children == 0 {
            return (Decimal::ZERO, false);
        }

        match self.schedule.lookup(combined_net_income) {
            BracketLookup::Below => (Decimal::ZERO, false),
            BracketLookup::Within(bracket) => {
                let amount = bracket
                    .amount_for(children)
                    .or_else(|| bracket.amount_for(SCHEDULE_CHILD_COLUMNS as u32));
                match amount {
                    Some(amount) => (amount, false),
                    None => {
                        warn!(
                            min_income = %bracket.min_income,
                            max_income = %bracket.max_income,
                            children,
                            "schedule bracket has no amount for this many children"
                        );
                        (Decimal::ZERO, false)
                    }
                }
            }
            BracketLookup::Above => {
                let column = usize::try_from(children)
                    .unwrap_or(SCHEDULE_CHILD_COLUMNS)
                    .min(SCHEDULE_CHILD_COLUMNS);
                let percentage = self.config.fallback_percentages[column - 1];
                (combined_net_income.saturating_mul(percentage), true)
            }
        }
    }

    /// Each parent's share of all overnights (step 4), as 0-1 ratios.
    ///
    /// Unset overnights fall back to the configured defaults; negative
    /// counts are treated as zero. Both shares are zero when the total is zero.
    fn overnight_shares(
        &self,
        parent1_overnights: Option<Decimal>,
        parent2_overnights: Option<Decimal>,
    ) -> (Decimal, Decimal) {
        let parent1 = parent1_overnights
            .unwrap_or(self.config.default_parent1_overnights)
            .max(Decimal::ZERO);
        let parent2 = parent2_overnights
            .unwrap_or(self.config.default_parent2_overnights)
            .max(Decimal::ZERO);
        let total = parent1.saturating_add(parent2);

        if total <= Decimal::ZERO {
            return (Decimal::ZERO, Decimal::ZERO);
        }
        (
            percentage_of(parent1, total) / Decimal::ONE_HUNDRED,
            percentage_of(parent2, total) / Decimal::ONE_HUNDRED,
        )
    }

    /// Signed time-sharing adjustment (step 5).
    fn time_sharing_adjustment(
        &self,
        basic_obligation: Decimal,
        parent1_share: Decimal,
        parent2_share: Decimal,
    ) -> Decimal {
        let threshold = self.config.time_sharing_threshold;
        if parent1_share < threshold && parent2_share < threshold {
            return Decimal::ZERO;
        }

        let magnitude = basic_obligation
            .saturating_mul(self.config.time_sharing_factor)
            .saturating_mul((parent1_share - HALF).abs());
        if parent1_share > HALF {
            -magnitude
        } else if parent2_share > HALF {
            magnitude
        } else {
            Decimal::ZERO
        }
    }

    /// Caps the magnitude of the signed amount (step 7).
    fn final_amount(
        &self,
        signed_amount: Decimal,
        combined_net_income: Decimal,
    ) -> Decimal {
        let cap = combined_net_income
            .saturating_mul(self.config.max_support_ratio)
            .max(Decimal::ZERO);
        signed_amount.abs().min(cap)
    }

    fn paying_parent(
        &self,
        signed_amount: Decimal,
        final_amount: Decimal,
    ) -> Option<Parent> {
        if final_amount.is_zero() {
            None
        } else if signed_amount > Decimal::ZERO {
            Some(Parent::Parent1)
        } else {
            Some(Parent::Parent2)
        }
    }
}

impl Default for ChildSupportWorksheet {
    fn default() -> Self {
        Self::standard()
    }
}
