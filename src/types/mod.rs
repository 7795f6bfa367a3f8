//! Core data model: actions, authorizations, transactions

mod action;
mod transaction;

pub use action::{Action, ActionData, Authorization};
pub use transaction::{EncodedAction, PackedTransaction, Transaction};
