// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use super::{budgets::print_status, criteria_from, AppContext};
use crate::engine::{Aggregates, BudgetStatus};
use crate::models::Currency;
use crate::session::Command;
use crate::utils::{bar, fmt_money, maybe_print_json, pretty_table};

const BAR_WIDTH: usize = 30;

#[derive(Serialize)]
struct SummaryOut<'a> {
    currency: Currency,
    shown: usize,
    aggregates: &'a Aggregates,
    budget: &'a BudgetStatus,
}

pub async fn handle(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let dash = ctx.dashboard().await?;
    dash.dispatch(Command::SetFilter(criteria_from(sub))).await?;
    let ccy = dash.session()?.currency();
    let Some(snap) = dash.snapshot()? else {
        return Ok(());
    };
    let agg = &snap.aggregates;

    let out = SummaryOut {
        currency: ccy,
        shown: snap.filtered.len(),
        aggregates: agg,
        budget: &snap.budget,
    };
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }

    println!(
        "{}",
        pretty_table(
            &["Total Expenses", "This Month", "Categories"],
            vec![vec![
                fmt_money(&agg.lifetime_total, ccy),
                fmt_money(&agg.monthly_total, ccy),
                agg.category_count.to_string(),
            ]],
        )
    );
    print_status(&snap.budget, ccy);

    if snap.records.is_empty() {
        println!("No expenses yet. Add your first expense!");
        return Ok(());
    }

    println!("\nBy category");
    let max = agg
        .by_category
        .first()
        .map(|(_, amt)| *amt)
        .unwrap_or_default();
    let rows = agg
        .by_category
        .iter()
        .map(|(cat, amt)| vec![cat.clone(), fmt_money(amt, ccy), bar(amt, &max, BAR_WIDTH)])
        .collect();
    println!("{}", pretty_table(&["Category", "Total", ""], rows));

    println!("\nLast {} months", agg.monthly_series.len());
    let max = agg
        .monthly_series
        .iter()
        .map(|b| b.total)
        .max()
        .unwrap_or_default();
    let rows = agg
        .monthly_series
        .iter()
        .map(|b| vec![b.label.clone(), fmt_money(&b.total, ccy), bar(&b.total, &max, BAR_WIDTH)])
        .collect();
    println!("{}", pretty_table(&["Month", "Total", ""], rows));

    println!("Showing {} of {} expenses", snap.filtered.len(), snap.records.len());
    Ok(())
}
