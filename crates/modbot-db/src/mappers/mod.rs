//! Model to entity mappers
//!
//! - `From<Model> for Entity` where every column maps infallibly
//! - `TryFrom<Model>` where a text column carries an enum that may be corrupt

mod action;
mod ledger;
mod rank;
mod report;

pub use action::action_from_model;
pub use report::{appeal_from_model, report_from_model};
