use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of child-count columns in a schedule (1 through 5 children).
pub const SCHEDULE_CHILD_COLUMNS: usize = 5;

/// Errors raised when a support schedule is assembled from brackets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A schedule needs at least one bracket.
    #[error("support schedule has no brackets")]
    Empty,

    /// A bracket's minimum exceeds its maximum.
    #[error("bracket {min}-{max} has min_income greater than max_income")]
    InvertedBracket { min: Decimal, max: Decimal },

    /// Brackets must be sorted and must not overlap.
    #[error("bracket starting at {min} overlaps or precedes the bracket ending at {previous_max}")]
    Overlap { min: Decimal, previous_max: Decimal },

    /// Obligation amounts cannot be negative.
    #[error("bracket {min}-{max} has a negative obligation for {children} children")]
    NegativeAmount {
        min: Decimal,
        max: Decimal,
        children: usize,
    },
}

/// One row of the guideline schedule: a combined monthly net income range
/// (inclusive at both ends) and the flat obligation per number of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportBracket {
    pub min_income: Decimal,
    pub max_income: Decimal,
    /// Obligation for 1..=5 children; `None` where the schedule has no entry.
    pub amounts: [Option<Decimal>; SCHEDULE_CHILD_COLUMNS],
}

impl SupportBracket {
    /// The schedule amount for `children`, if the bracket lists one.
    pub fn amount_for(
        &self,
        children: u32,
    ) -> Option<Decimal> {
        let index = usize::try_from(children).ok()?.checked_sub(1)?;
        self.amounts.get(index).copied().flatten()
    }

    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        self.min_income <= income && income <= self.max_income
    }
}

/// Where a combined income falls relative to a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketLookup<'a> {
    /// Below the first bracket's minimum (only reachable with negative income
    /// in the standard schedule).
    Below,
    Within(&'a SupportBracket),
    /// Above every bracket's maximum; the percentage fallback applies.
    Above,
}

/// An ordered, non-overlapping guideline schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSchedule {
    brackets: Vec<SupportBracket>,
}

/// Built-in simplified schedule: (min, max, [1..=5 children]).
const STANDARD_SCHEDULE: [(i64, i64, [i64; SCHEDULE_CHILD_COLUMNS]); 19] = [
    (0, 1000, [180, 270, 320, 350, 370]),
    (1001, 1500, [270, 405, 480, 525, 555]),
    (1501, 2000, [360, 540, 640, 700, 740]),
    (2001, 2500, [450, 675, 800, 875, 925]),
    (2501, 3000, [540, 810, 960, 1050, 1110]),
    (3001, 3500, [630, 945, 1120, 1225, 1295]),
    (3501, 4000, [720, 1080, 1280, 1400, 1480]),
    (4001, 4500, [810, 1215, 1440, 1575, 1665]),
    (4501, 5000, [900, 1350, 1600, 1750, 1850]),
    (5001, 5500, [990, 1485, 1760, 1925, 2035]),
    (5501, 6000, [1080, 1620, 1920, 2100, 2220]),
    (6001, 6500, [1170, 1755, 2080, 2275, 2405]),
    (6501, 7000, [1260, 1890, 2240, 2450, 2590]),
    (7001, 7500, [1350, 2025, 2400, 2625, 2775]),
    (7501, 8000, [1440, 2160, 2560, 2800, 2960]),
    (8001, 8500, [1530, 2295, 2720, 2975, 3145]),
    (8501, 9000, [1620, 2430, 2880, 3150, 3330]),
    (9001, 9500, [1710, 2565, 3040, 3325, 3515]),
    (9501, 10000, [1800, 2700, 3200, 3500, 3700]),
];

impl SupportSchedule {
    /// Builds a schedule, checking ordering, ranges and amounts.
    pub fn new(brackets: Vec<SupportBracket>) -> Result<Self, ScheduleError> {
        if brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let mut previous_max: Option<Decimal> = None;
        for bracket in &brackets {
            if bracket.min_income > bracket.max_income {
                return Err(ScheduleError::InvertedBracket {
                    min: bracket.min_income,
                    max: bracket.max_income,
                });
            }
            if let Some(previous_max) = previous_max {
                if bracket.min_income <= previous_max {
                    return Err(ScheduleError::Overlap {
                        min: bracket.min_income,
                        previous_max,
                    });
                }
            }
            if let Some(index) = bracket
                .amounts
                .iter()
                .position(|a| a.is_some_and(|a| a < Decimal::ZERO))
            {
                return Err(ScheduleError::NegativeAmount {
                    min: bracket.min_income,
                    max: bracket.max_income,
                    children: index + 1,
                });
            }
            previous_max = Some(bracket.max_income);
        }

        Ok(Self { brackets })
    }

    /// The built-in schedule: $500 brackets up to $10,000 combined net income.
    pub fn standard() -> Self {
        let brackets = STANDARD_SCHEDULE
            .iter()
            .map(|&(min, max, amounts)| SupportBracket {
                min_income: Decimal::from(min),
                max_income: Decimal::from(max),
                amounts: amounts.map(|a| Some(Decimal::from(a))),
            })
            .collect();
        Self { brackets }
    }

    pub fn brackets(&self) -> &[SupportBracket] {
        &self.brackets
    }

    /// Highest income covered by the table.
    pub fn ceiling(&self) -> Decimal {
        self.brackets
            .last()
            .map(|b| b.max_income)
            .unwrap_or(Decimal::ZERO)
    }

    /// Finds the bracket for `income`.
    ///
    /// Brackets match inclusively. An income that falls in the gap between
    /// two integer brackets (e.g. `1000.50`) resolves to the next bracket up.
    pub fn lookup(
        &self,
        income: Decimal,
    ) -> BracketLookup<'_> {
        match self.brackets.first() {
            Some(first) if income >= first.min_income => {}
            _ => return BracketLookup::Below,
        }
        match self.brackets.iter().find(|b| income <= b.max_income) {
            Some(bracket) => BracketLookup::Within(bracket),
            None => BracketLookup::Above,
        }
    }
}

impl Default for SupportSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
