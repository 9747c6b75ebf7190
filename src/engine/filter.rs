// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::ExpenseRecord;

pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl Period {
    /// Unknown values mean no filtering on this axis.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "today" => Period::Today,
            "week" => Period::Week,
            "month" => Period::Month,
            _ => Period::All,
        }
    }

    fn admits(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::All => true,
            Period::Today => date == today,
            // Lower bound only: future-dated records inside the window pass.
            Period::Week => date >= today - Duration::days(7),
            Period::Month => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::All => "all",
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    /// `None` means every category.
    pub category: Option<String>,
    pub period: Period,
}

impl FilterCriteria {
    pub fn new(category: Option<&str>, period: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL)
            .map(str::to_string);
        Self {
            category,
            period: period.map(Period::parse_lenient).unwrap_or_default(),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.period == Period::All
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL)
    }
}

/// Keeps the input order; the input is left untouched.
pub fn filter(
    records: &[ExpenseRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| match &criteria.category {
            Some(c) => &r.category == c,
            None => true,
        })
        .filter(|r| criteria.period.admits(r.date, today))
        .cloned()
        .collect()
}
