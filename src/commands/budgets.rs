// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{print_notice, AppContext};
use crate::engine::BudgetStatus;
use crate::session::{Command, Dashboard, Notice};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::validation::validate_budget;

pub async fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(ctx, sub).await?,
        Some(("status", sub)) => status(ctx, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn set(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let amount = validate_budget(sub.get_one::<String>("amount").map_or("", String::as_str))?;
    let dash = Dashboard::restore(&ctx.auth, ctx.store()).await?;
    let notice = dash.dispatch(Command::SetBudget(amount)).await?;
    print_notice(&notice);
    Ok(())
}

async fn status(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let dash = ctx.dashboard().await?;
    let ccy = dash.session()?.currency();
    let Some(snap) = dash.snapshot()? else {
        return Ok(());
    };
    if maybe_print_json(json_flag, jsonl_flag, &snap.budget)? {
        return Ok(());
    }
    print_status(&snap.budget, ccy);
    Ok(())
}

pub fn print_status(status: &BudgetStatus, ccy: crate::models::Currency) {
    match status {
        BudgetStatus::Unconfigured => {
            println!("No monthly budget set. Use `budget set <amount>` to add one.");
        }
        BudgetStatus::Configured {
            budget,
            spent,
            remaining,
            percent_used,
            ..
        } => {
            println!(
                "{}",
                pretty_table(
                    &["Budget", "Spent", "Remaining", "Used"],
                    vec![vec![
                        fmt_money(budget, ccy),
                        fmt_money(spent, ccy),
                        fmt_money(remaining, ccy),
                        format!("{:.1}%", percent_used),
                    ]],
                )
            );
            if let Some(notice) = Notice::from_budget(status, ccy) {
                print_notice(&notice);
            }
        }
    }
}
