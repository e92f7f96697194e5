use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two parties to the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parent {
    Parent1,
    Parent2,
}

impl Parent {
    pub const BOTH: [Parent; 2] = [Parent::Parent1, Parent::Parent2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent1 => "parent1",
            Self::Parent2 => "parent2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parent1" => Some(Self::Parent1),
            "parent2" => Some(Self::Parent2),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Parent1 => Self::Parent2,
            Self::Parent2 => Self::Parent1,
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
