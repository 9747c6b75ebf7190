// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use super::{criteria_from, print_notice, prompt_line, AppContext};
use crate::models::{Currency, ExpenseRecord};
use crate::session::{Command, Dashboard, Notice};
use crate::utils::{fmt_display_date, fmt_money, maybe_print_json, pretty_table, today};
use crate::validation::{EditForm, ExpenseForm};

pub async fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub).await?,
        Some(("list", sub)) => list(ctx, sub).await?,
        Some(("edit", sub)) => edit(ctx, sub).await?,
        Some(("rm", sub)) => remove(ctx, sub).await?,
        _ => {}
    }
    Ok(())
}

pub fn expense_form_from(sub: &clap::ArgMatches, today: NaiveDate) -> ExpenseForm {
    let get = |id: &str| sub.get_one::<String>(id).cloned().unwrap_or_default();
    ExpenseForm {
        amount: get("amount"),
        category: get("category"),
        description: get("description"),
        date: sub
            .get_one::<String>("date")
            .cloned()
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
    }
}

pub fn edit_form_from(sub: &clap::ArgMatches) -> EditForm {
    let get = |id: &str| sub.get_one::<String>(id).cloned();
    EditForm {
        amount: get("amount"),
        category: get("category"),
        description: get("description"),
        date: get("date"),
    }
}

async fn add(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    // Validate before touching the store.
    let draft = expense_form_from(sub, today()).validate()?;
    let dash = Dashboard::restore(&ctx.auth, ctx.store()).await?;
    let notice = dash.dispatch(Command::AddRecord(draft)).await?;
    print_notice(&notice);
    Ok(())
}

async fn edit(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
    let patch = edit_form_from(sub).validate()?;
    let dash = Dashboard::restore(&ctx.auth, ctx.store()).await?;
    let notice = dash.dispatch(Command::EditRecord { id, patch }).await?;
    print_notice(&notice);
    Ok(())
}

async fn remove(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
    if !sub.get_flag("yes") {
        let answer = prompt_line("Are you sure? [y/N] ")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            print_notice(&Notice::info("Nothing deleted"));
            return Ok(());
        }
    }
    let dash = Dashboard::restore(&ctx.auth, ctx.store()).await?;
    let notice = dash.dispatch(Command::DeleteRecord { id }).await?;
    print_notice(&notice);
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

pub fn to_rows(records: &[ExpenseRecord], ccy: Currency) -> Vec<ExpenseRow> {
    records
        .iter()
        .map(|r| ExpenseRow {
            id: r.id.clone(),
            date: r.date.to_string(),
            category: r.category.clone(),
            description: r.description.clone(),
            amount: fmt_money(&r.amount, ccy),
        })
        .collect()
}

/// Filtered view of the signed-in user's expenses, newest first.
pub async fn query_rows(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let dash = ctx.dashboard().await?;
    dash.dispatch(Command::SetFilter(criteria_from(sub))).await?;
    let ccy = dash.session()?.currency();
    let mut data = match dash.snapshot()? {
        Some(s) => to_rows(&s.filtered, ccy),
        None => Vec::new(),
    };
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

async fn list(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ctx, sub).await?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No expenses yet. Add your first expense!");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            let date = NaiveDate::parse_from_str(&r.date, "%Y-%m-%d")
                .map(|d| fmt_display_date(&d))
                .unwrap_or_else(|_| r.date.clone());
            vec![
                r.id.clone(),
                date,
                r.category.clone(),
                r.description.clone(),
                r.amount.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Date", "Category", "Description", "Amount"], rows)
    );
    Ok(())
}
