// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{print_notice, AppContext};
use crate::errors::{Field, TrackerError};
use crate::models::Currency;
use crate::session::{Command, Dashboard};
use crate::utils::pretty_table;

pub async fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let raw = sub.get_one::<String>("currency").map_or("", String::as_str);
            let ccy: Currency = raw
                .parse()
                .map_err(|e: String| TrackerError::validation(Field::Currency, e))?;
            let dash = Dashboard::restore(&ctx.auth, ctx.store()).await?;
            let notice = dash.dispatch(Command::SetCurrency(ccy)).await?;
            print_notice(&notice);
        }
        Some(("list", _)) => {
            let rows = Currency::ALL
                .iter()
                .map(|c| vec![c.code().to_string(), c.symbol().to_string()])
                .collect();
            println!("{}", pretty_table(&["Code", "Symbol"], rows));
        }
        _ => {}
    }
    Ok(())
}
