// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{criteria_from, print_notice, AppContext};
use crate::engine::export::{render_text, report_file_name};
use crate::session::{Command, Notice};

pub async fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let path = match m.subcommand() {
        Some(("csv", sub)) => export_csv(ctx, sub).await?,
        Some(("report", sub)) => export_report(ctx, sub).await?,
        _ => return Ok(()),
    };
    print_notice(&Notice::success(format!(
        "Exported expenses to {}",
        path.display()
    )));
    Ok(())
}

fn out_dir(sub: &clap::ArgMatches) -> &Path {
    sub.get_one::<String>("out")
        .map(|s| Path::new(s.as_str()))
        .unwrap_or_else(|| Path::new("."))
}

/// Writes the filtered view as delimited text and returns the file written.
pub async fn export_csv(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let dash = ctx.dashboard().await?;
    dash.dispatch(Command::SetFilter(criteria_from(sub))).await?;
    let (name, text) = dash.export_csv().await?;
    let path = out_dir(sub).join(name);
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub async fn export_report(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let dash = ctx.dashboard().await?;
    dash.dispatch(Command::SetFilter(criteria_from(sub))).await?;
    let report = dash.export_report().await?;
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "text".to_string());
    let (ext, body) = match fmt.as_str() {
        "json" => ("json", serde_json::to_string_pretty(&report)?),
        _ => ("txt", render_text(&report, ctx.cfg.rows_per_page)),
    };
    let path = out_dir(sub).join(report_file_name(report.title.generated_on, ext));
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
