//! Expense ledger rules that do not touch storage.
//!
//! Filter resolution, dashboard aggregation, speech parsing, and recurring
//! copy planning are pure functions over a caller-supplied "today", so the
//! service layer stays thin and the rules stay testable.

pub mod dashboard;
pub mod filter;
pub mod recurring;
pub mod speech;
