//! Path-addressed questionnaire answers.
//!
//! Answers live in a nested tree of [`FormValue`]s. Paths such as
//! `parent1_income.gross_monthly` address leaves; lookups never fail and
//! writes are copy-on-write, so every subtree not on the written path keeps
//! its identity (see [`FormData::set`]).

mod data;
mod path;
mod value;

pub use data::FormData;
pub use path::{FieldPath, FormError};
pub use value::{FormMap, FormValue, coerce_decimal};
