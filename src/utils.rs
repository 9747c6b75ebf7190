// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::Currency;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Calendar date on the local clock; no timezone normalization beyond that.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn fmt_money(d: &Decimal, ccy: Currency) -> String {
    if d.is_sign_negative() && !d.is_zero() {
        format!("-{}{:.2}", ccy.symbol(), d.abs())
    } else {
        format!("{}{:.2}", ccy.symbol(), d)
    }
}

/// "Mar 4, 2025"
pub fn fmt_display_date(d: &NaiveDate) -> String {
    d.format("%b %-d, %Y").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Horizontal text bar scaled against `max`.
pub fn bar(value: &Decimal, max: &Decimal, width: usize) -> String {
    if max.is_zero() || value.is_sign_negative() {
        return String::new();
    }
    let ratio = value
        .checked_div(*max)
        .unwrap_or(Decimal::ONE)
        .min(Decimal::ONE);
    let cells = (ratio * Decimal::from(width as u64))
        .round()
        .to_usize()
        .unwrap_or(0);
    "█".repeat(cells)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
