// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::ExpenseRecord;

/// Number of buckets in the trailing-month series.
pub const SERIES_MONTHS: i32 = 6;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub label: String, // "Mon YYYY"
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub lifetime_total: Decimal,
    pub monthly_total: Decimal,
    pub category_count: usize,
    /// Descending by amount; equal sums keep first-encountered order.
    pub by_category: Vec<(String, Decimal)>,
    /// Oldest month first, current month last.
    pub monthly_series: Vec<MonthBucket>,
}

/// (year, month) shifted back by `back` months.
fn months_before(year: i32, month: u32, back: i32) -> (i32, u32) {
    let idx = year * 12 + (month as i32 - 1) - back;
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}

pub fn trailing_months(today: NaiveDate) -> Vec<MonthBucket> {
    (0..SERIES_MONTHS)
        .rev()
        .map(|back| {
            let (year, month) = months_before(today.year(), today.month(), back);
            MonthBucket {
                year,
                month,
                label: format!("{} {}", MONTH_ABBR[(month - 1) as usize], year),
                total: Decimal::ZERO,
            }
        })
        .collect()
}

pub fn group_by_category(records: &[ExpenseRecord]) -> Vec<(String, Decimal)> {
    let mut order: Vec<(String, Decimal)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in records {
        match index.get(r.category.as_str()) {
            Some(&i) => order[i].1 = order[i].1.saturating_add(r.amount),
            None => {
                index.insert(r.category.as_str(), order.len());
                order.push((r.category.clone(), r.amount));
            }
        }
    }
    // sort_by is stable, so ties stay in insertion order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Sums saturate at `Decimal::MAX` instead of overflowing.
pub fn aggregate(records: &[ExpenseRecord], today: NaiveDate) -> Aggregates {
    let mut lifetime_total = Decimal::ZERO;
    let mut monthly_total = Decimal::ZERO;
    let mut monthly_series = trailing_months(today);

    for r in records {
        lifetime_total = lifetime_total.saturating_add(r.amount);
        let key = (r.date.year(), r.date.month());
        if key == (today.year(), today.month()) {
            monthly_total = monthly_total.saturating_add(r.amount);
        }
        if let Some(bucket) = monthly_series
            .iter_mut()
            .find(|b| (b.year, b.month) == key)
        {
            bucket.total = bucket.total.saturating_add(r.amount);
        }
    }

    let by_category = group_by_category(records);
    Aggregates {
        lifetime_total,
        monthly_total,
        category_count: by_category.len(),
        by_category,
        monthly_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rec(cat: &str, amt: i64, date: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("{cat}-{amt}-{date}"),
            amount: Decimal::from(amt),
            category: cat.to_string(),
            description: String::new(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_input_yields_zeroes_and_six_buckets() {
        let a = aggregate(&[], day("2025-08-15"));
        assert_eq!(a.lifetime_total, Decimal::ZERO);
        assert_eq!(a.monthly_total, Decimal::ZERO);
        assert_eq!(a.category_count, 0);
        assert!(a.by_category.is_empty());
        assert_eq!(a.monthly_series.len(), 6);
        assert!(a.monthly_series.iter().all(|b| b.total.is_zero()));
    }

    #[test]
    fn groups_and_orders_categories() {
        let rs = vec![
            rec("Food", 20, "2025-08-01"),
            rec("Food", 30, "2025-08-02"),
            rec("Travel", 10, "2025-08-03"),
        ];
        let a = aggregate(&rs, day("2025-08-15"));
        assert_eq!(
            a.by_category,
            vec![
                ("Food".to_string(), Decimal::from(50)),
                ("Travel".to_string(), Decimal::from(10))
            ]
        );
        assert_eq!(a.category_count, 2);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let rs = vec![
            rec("Bills", 10, "2025-08-01"),
            rec("Travel", 25, "2025-08-01"),
            rec("Food", 10, "2025-08-01"),
        ];
        let cats: Vec<String> = group_by_category(&rs).into_iter().map(|c| c.0).collect();
        assert_eq!(cats, vec!["Travel", "Bills", "Food"]);
    }

    #[test]
    fn categories_are_case_sensitive() {
        let rs = vec![rec("food", 1, "2025-08-01"), rec("Food", 1, "2025-08-01")];
        assert_eq!(aggregate(&rs, day("2025-08-15")).category_count, 2);
    }

    #[test]
    fn series_spans_year_boundary() {
        let buckets = trailing_months(day("2025-02-10"));
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Sep 2024", "Oct 2024", "Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"]
        );
    }

    #[test]
    fn series_ignores_out_of_window_records() {
        let rs = vec![
            rec("Food", 5, "2025-02-01"),
            rec("Food", 7, "2024-09-30"),
            rec("Food", 100, "2024-08-31"),
            rec("Food", 1000, "2025-03-01"),
        ];
        let a = aggregate(&rs, day("2025-02-10"));
        let in_window: Decimal = a.monthly_series.iter().map(|b| b.total).sum();
        assert_eq!(in_window, Decimal::from(12));
        assert_eq!(a.monthly_series[0].total, Decimal::from(7));
        assert_eq!(a.monthly_series[5].total, Decimal::from(5));
        assert_eq!(a.monthly_total, Decimal::from(5));
        assert_eq!(a.lifetime_total, Decimal::from(1112));
    }

    #[test]
    fn category_sums_conserve_total() {
        let rs: Vec<ExpenseRecord> = (1..=40)
            .map(|i| {
                let cat = ["Food", "Bills", "Travel", "Fun", "Health"][i as usize % 5];
                rec(cat, i * 3, &format!("2025-0{}-1{}", 1 + i % 8, i % 10))
            })
            .collect();
        let a = aggregate(&rs, day("2025-06-20"));
        let by_cat: Decimal = a.by_category.iter().map(|c| c.1).sum();
        assert_eq!(by_cat, a.lifetime_total);
    }
}
