// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over one snapshot of expense records.
//!
//! Everything in here is pure: records and the current date go in, views come
//! out. Nothing is written back to the store.

pub mod aggregate;
pub mod budget;
pub mod export;
pub mod filter;

pub use aggregate::{aggregate, Aggregates, MonthBucket};
pub use budget::{evaluate_budget, BudgetStatus, Severity, Tier};
pub use export::{to_delimited_text, to_report, ExpenseReport};
pub use filter::{filter, FilterCriteria, Period};
